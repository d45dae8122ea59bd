//! Postgres implementation of [`SessionRepository`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::identity::{Session, SessionRepository};
use crate::AuthError;

const SESSION_COLUMNS: &str = "id, expires_at, token, created_at, updated_at, ip_address, \
     user_agent, user_id, active_organization_id, impersonated_by";

/// Postgres-backed session repository.
///
/// Sessions are created and revoked by the identity provider; this
/// repository reads them and writes only the active-organization field.
#[derive(Clone)]
pub struct PgSessionRepository {
    pool: PgPool,
}

impl PgSessionRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct SessionRecord {
    id: String,
    expires_at: DateTime<Utc>,
    token: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    ip_address: Option<String>,
    user_agent: Option<String>,
    user_id: String,
    active_organization_id: Option<String>,
    impersonated_by: Option<String>,
}

impl From<SessionRecord> for Session {
    fn from(row: SessionRecord) -> Self {
        Session {
            id: row.id,
            expires_at: row.expires_at,
            token: row.token,
            created_at: row.created_at,
            updated_at: row.updated_at,
            ip_address: row.ip_address,
            user_agent: row.user_agent,
            user_id: row.user_id,
            active_organization_id: row.active_organization_id,
            impersonated_by: row.impersonated_by,
        }
    }
}

#[async_trait]
impl SessionRepository for PgSessionRepository {
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, err))]
    async fn find_by_token(&self, token: &str) -> Result<Option<Session>, AuthError> {
        let row: Option<SessionRecord> =
            sqlx::query_as(&format!("SELECT {SESSION_COLUMNS} FROM session WHERE token = $1"))
                .bind(token)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    log::error!(target: "atrium_orgs", "msg=\"database error\", operation=\"find_session_by_token\", error=\"{e}\"");
                    AuthError::DatabaseError(e.to_string())
                })?;

        Ok(row.map(Into::into))
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn set_active_organization(
        &self,
        session_id: &str,
        organization_id: Option<&str>,
    ) -> Result<Session, AuthError> {
        let row: SessionRecord = sqlx::query_as(&format!(
            r"
            UPDATE session SET active_organization_id = $2, updated_at = now()
            WHERE id = $1
            RETURNING {SESSION_COLUMNS}
            ",
        ))
        .bind(session_id)
        .bind(organization_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => AuthError::NotFound,
            _ => {
                log::error!(target: "atrium_orgs", "msg=\"database error\", operation=\"set_active_organization\", error=\"{e}\"");
                AuthError::DatabaseError(e.to_string())
            }
        })?;

        Ok(row.into())
    }
}
