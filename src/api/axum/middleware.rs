//! Session resolution for Axum routes.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use chrono::Utc;

use super::error::AppError;
use super::routes::AppState;
use crate::identity::{Session, SessionRepository, User, UserRepository};
use crate::orgs::{
    InvitationMailer, InvitationRepository, MemberRepository, OrganizationRepository,
};
use crate::AuthError;

/// Cookie carrying the session token when no bearer header is present.
pub const SESSION_COOKIE: &str = "atrium.session_token";

/// Extracts a bearer token from the `Authorization` header.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::to_owned)
}

/// Extracts the session token from the `Cookie` header.
pub fn extract_session_cookie(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE).then(|| value.to_owned())
    })
}

/// The resolved session and its user.
///
/// Extraction fails with 401 when no unexpired session can be resolved from
/// the bearer header or session cookie, and 403 when the user is banned.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub session: Session,
    pub user: User,
}

#[async_trait]
impl<O, M, I, U, S, X> FromRequestParts<AppState<O, M, I, U, S, X>> for AuthSession
where
    O: OrganizationRepository + Clone + Send + Sync + 'static,
    M: MemberRepository + Clone + Send + Sync + 'static,
    I: InvitationRepository + Clone + Send + Sync + 'static,
    U: UserRepository + Clone + Send + Sync + 'static,
    S: SessionRepository + Clone + Send + Sync + 'static,
    X: InvitationMailer + Clone + Send + Sync + 'static,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<O, M, I, U, S, X>,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(&parts.headers)
            .or_else(|| extract_session_cookie(&parts.headers))
            .ok_or(AppError(AuthError::NotAuthenticated))?;

        let session = state
            .sessions
            .find_by_token(&token)
            .await
            .map_err(AppError)?
            .ok_or(AppError(AuthError::NotAuthenticated))?;

        let now = Utc::now();
        if session.is_expired(now) {
            return Err(AppError(AuthError::NotAuthenticated));
        }

        let user = state
            .users
            .find_by_id(&session.user_id)
            .await
            .map_err(AppError)?
            .ok_or(AppError(AuthError::NotAuthenticated))?;

        if user.is_banned(now) {
            return Err(AppError(AuthError::Forbidden));
        }

        Ok(AuthSession { session, user })
    }
}
