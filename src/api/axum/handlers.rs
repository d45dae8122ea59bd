//! HTTP handlers for Axum organization endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect};
use axum::Json;

use super::error::AppError;
use super::middleware::AuthSession;
use super::routes::AppState;
use crate::api::{
    CreateOrganizationRequest, DashboardResponse, ErrorResponse, FullOrganizationResponse,
    InvitationResponse, InviteMemberRequest, MessageResponse, OrganizationResponse,
    OrganizationWithMembersResponse, SessionResponse, SetActiveOrganizationRequest,
    UpdateOrganizationRequest,
};
use crate::identity::{SessionRepository, UserRepository};
use crate::orgs::{
    CreateOrganization, InvitationMailer, InvitationRepository, MemberRepository,
    OrganizationRepository, UpdateOrganization,
};

/// Create an organization; the caller becomes its owner.
///
/// POST /organizations
pub async fn create_organization<O, M, I, U, S, X>(
    State(state): State<AppState<O, M, I, U, S, X>>,
    auth: AuthSession,
    Json(body): Json<CreateOrganizationRequest>,
) -> impl IntoResponse
where
    O: OrganizationRepository + Clone + Send + Sync + 'static,
    M: MemberRepository + Clone + Send + Sync + 'static,
    I: InvitationRepository + Clone + Send + Sync + 'static,
    U: UserRepository + Clone + Send + Sync + 'static,
    S: SessionRepository + Clone + Send + Sync + 'static,
    X: InvitationMailer + Clone + Send + Sync + 'static,
{
    let data = CreateOrganization {
        name: body.name,
        slug: body.slug,
        logo: body.logo,
        metadata: body.metadata,
    };

    match state.service.create_organization(&auth.user.id, data).await {
        Ok(org) => (StatusCode::CREATED, Json(OrganizationResponse::from(org))).into_response(),
        Err(err) => AppError(err).into_response(),
    }
}

/// List the caller's organizations.
///
/// GET /organizations
pub async fn list_organizations<O, M, I, U, S, X>(
    State(state): State<AppState<O, M, I, U, S, X>>,
    auth: AuthSession,
) -> impl IntoResponse
where
    O: OrganizationRepository + Clone + Send + Sync + 'static,
    M: MemberRepository + Clone + Send + Sync + 'static,
    I: InvitationRepository + Clone + Send + Sync + 'static,
    U: UserRepository + Clone + Send + Sync + 'static,
    S: SessionRepository + Clone + Send + Sync + 'static,
    X: InvitationMailer + Clone + Send + Sync + 'static,
{
    match state
        .service
        .list_organizations_for_user(&auth.user.id)
        .await
    {
        Ok(orgs) => {
            let responses: Vec<_> = orgs.into_iter().map(OrganizationResponse::from).collect();
            Json(responses).into_response()
        }
        Err(err) => AppError(err).into_response(),
    }
}

/// The session's active organization with members and all invitations.
/// Responds with `null` when no active organization is set.
///
/// GET /organizations/active
pub async fn get_full_organization<O, M, I, U, S, X>(
    State(state): State<AppState<O, M, I, U, S, X>>,
    auth: AuthSession,
) -> impl IntoResponse
where
    O: OrganizationRepository + Clone + Send + Sync + 'static,
    M: MemberRepository + Clone + Send + Sync + 'static,
    I: InvitationRepository + Clone + Send + Sync + 'static,
    U: UserRepository + Clone + Send + Sync + 'static,
    S: SessionRepository + Clone + Send + Sync + 'static,
    X: InvitationMailer + Clone + Send + Sync + 'static,
{
    match state.service.get_full_organization(&auth.session).await {
        Ok(org) => Json(org.map(FullOrganizationResponse::from)).into_response(),
        Err(err) => AppError(err).into_response(),
    }
}

/// Organization by slug, with members and their user identities.
///
/// GET /organizations/slug/:slug
pub async fn get_organization_by_slug<O, M, I, U, S, X>(
    State(state): State<AppState<O, M, I, U, S, X>>,
    _auth: AuthSession,
    Path(slug): Path<String>,
) -> impl IntoResponse
where
    O: OrganizationRepository + Clone + Send + Sync + 'static,
    M: MemberRepository + Clone + Send + Sync + 'static,
    I: InvitationRepository + Clone + Send + Sync + 'static,
    U: UserRepository + Clone + Send + Sync + 'static,
    S: SessionRepository + Clone + Send + Sync + 'static,
    X: InvitationMailer + Clone + Send + Sync + 'static,
{
    match state.service.get_organization_by_slug(&slug).await {
        Ok(Some(org)) => Json(OrganizationWithMembersResponse::from(org)).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "organization not found".to_owned(),
            }),
        )
            .into_response(),
        Err(err) => AppError(err).into_response(),
    }
}

/// Update an organization.
///
/// PUT /organizations/:id
pub async fn update_organization<O, M, I, U, S, X>(
    State(state): State<AppState<O, M, I, U, S, X>>,
    auth: AuthSession,
    Path(organization_id): Path<String>,
    Json(body): Json<UpdateOrganizationRequest>,
) -> impl IntoResponse
where
    O: OrganizationRepository + Clone + Send + Sync + 'static,
    M: MemberRepository + Clone + Send + Sync + 'static,
    I: InvitationRepository + Clone + Send + Sync + 'static,
    U: UserRepository + Clone + Send + Sync + 'static,
    S: SessionRepository + Clone + Send + Sync + 'static,
    X: InvitationMailer + Clone + Send + Sync + 'static,
{
    let changes = UpdateOrganization {
        name: body.name,
        slug: body.slug,
        logo: body.logo,
        metadata: body.metadata,
    };

    match state
        .service
        .update_organization(&auth.user.id, &organization_id, changes)
        .await
    {
        Ok(org) => Json(OrganizationResponse::from(org)).into_response(),
        Err(err) => AppError(err).into_response(),
    }
}

/// Delete an organization. Members and invitations cascade.
///
/// DELETE /organizations/:id
pub async fn delete_organization<O, M, I, U, S, X>(
    State(state): State<AppState<O, M, I, U, S, X>>,
    auth: AuthSession,
    Path(organization_id): Path<String>,
) -> impl IntoResponse
where
    O: OrganizationRepository + Clone + Send + Sync + 'static,
    M: MemberRepository + Clone + Send + Sync + 'static,
    I: InvitationRepository + Clone + Send + Sync + 'static,
    U: UserRepository + Clone + Send + Sync + 'static,
    S: SessionRepository + Clone + Send + Sync + 'static,
    X: InvitationMailer + Clone + Send + Sync + 'static,
{
    match state
        .service
        .delete_organization(&auth.user.id, &organization_id)
        .await
    {
        Ok(()) => Json(MessageResponse {
            message: "organization deleted successfully".to_owned(),
        })
        .into_response(),
        Err(err) => AppError(err).into_response(),
    }
}

/// Remove a member, or leave the organization.
///
/// DELETE /organizations/:id/members/:user_id
pub async fn remove_member<O, M, I, U, S, X>(
    State(state): State<AppState<O, M, I, U, S, X>>,
    auth: AuthSession,
    Path((organization_id, user_id)): Path<(String, String)>,
) -> impl IntoResponse
where
    O: OrganizationRepository + Clone + Send + Sync + 'static,
    M: MemberRepository + Clone + Send + Sync + 'static,
    I: InvitationRepository + Clone + Send + Sync + 'static,
    U: UserRepository + Clone + Send + Sync + 'static,
    S: SessionRepository + Clone + Send + Sync + 'static,
    X: InvitationMailer + Clone + Send + Sync + 'static,
{
    match state
        .service
        .remove_member(&auth.user.id, &organization_id, &user_id)
        .await
    {
        Ok(()) => Json(MessageResponse {
            message: "member removed successfully".to_owned(),
        })
        .into_response(),
        Err(err) => AppError(err).into_response(),
    }
}

/// Invite a member by email.
///
/// POST /organizations/:id/invitations
pub async fn create_invitation<O, M, I, U, S, X>(
    State(state): State<AppState<O, M, I, U, S, X>>,
    auth: AuthSession,
    Path(organization_id): Path<String>,
    Json(body): Json<InviteMemberRequest>,
) -> impl IntoResponse
where
    O: OrganizationRepository + Clone + Send + Sync + 'static,
    M: MemberRepository + Clone + Send + Sync + 'static,
    I: InvitationRepository + Clone + Send + Sync + 'static,
    U: UserRepository + Clone + Send + Sync + 'static,
    S: SessionRepository + Clone + Send + Sync + 'static,
    X: InvitationMailer + Clone + Send + Sync + 'static,
{
    match state
        .service
        .invite_member(&auth.user.id, &organization_id, &body.email, &body.role)
        .await
    {
        Ok(invitation) => (
            StatusCode::CREATED,
            Json(InvitationResponse::from(invitation)),
        )
            .into_response(),
        Err(err) => AppError(err).into_response(),
    }
}

/// Cancel a pending invitation.
///
/// DELETE /organizations/:id/invitations/:invitation_id
pub async fn cancel_invitation<O, M, I, U, S, X>(
    State(state): State<AppState<O, M, I, U, S, X>>,
    auth: AuthSession,
    Path((_organization_id, invitation_id)): Path<(String, String)>,
) -> impl IntoResponse
where
    O: OrganizationRepository + Clone + Send + Sync + 'static,
    M: MemberRepository + Clone + Send + Sync + 'static,
    I: InvitationRepository + Clone + Send + Sync + 'static,
    U: UserRepository + Clone + Send + Sync + 'static,
    S: SessionRepository + Clone + Send + Sync + 'static,
    X: InvitationMailer + Clone + Send + Sync + 'static,
{
    match state
        .service
        .cancel_invitation(&auth.user.id, &invitation_id)
        .await
    {
        Ok(invitation) => Json(InvitationResponse::from(invitation)).into_response(),
        Err(err) => AppError(err).into_response(),
    }
}

/// Accept an invitation and bounce to the dashboard.
///
/// GET /accept-invitation/:invitation_id
///
/// Always redirects to `/dashboard`, whether or not acceptance succeeded;
/// failures are logged, never surfaced to the caller.
pub async fn accept_invitation<O, M, I, U, S, X>(
    State(state): State<AppState<O, M, I, U, S, X>>,
    auth: Option<AuthSession>,
    Path(invitation_id): Path<String>,
) -> Redirect
where
    O: OrganizationRepository + Clone + Send + Sync + 'static,
    M: MemberRepository + Clone + Send + Sync + 'static,
    I: InvitationRepository + Clone + Send + Sync + 'static,
    U: UserRepository + Clone + Send + Sync + 'static,
    S: SessionRepository + Clone + Send + Sync + 'static,
    X: InvitationMailer + Clone + Send + Sync + 'static,
{
    match auth {
        Some(auth) => {
            if let Err(e) = state
                .service
                .accept_invitation(&invitation_id, &auth.user.id)
                .await
            {
                log::error!(
                    target: "atrium_orgs",
                    "msg=\"failed to accept invitation\", invitation_id={invitation_id}, user_id={}, error=\"{e}\"",
                    auth.user.id
                );
            }
        }
        None => {
            log::error!(
                target: "atrium_orgs",
                "msg=\"accept-invitation without a session\", invitation_id={invitation_id}"
            );
        }
    }

    Redirect::to("/dashboard")
}

/// Decline an invitation addressed to the caller.
///
/// POST /invitations/:invitation_id/reject
pub async fn reject_invitation<O, M, I, U, S, X>(
    State(state): State<AppState<O, M, I, U, S, X>>,
    auth: AuthSession,
    Path(invitation_id): Path<String>,
) -> impl IntoResponse
where
    O: OrganizationRepository + Clone + Send + Sync + 'static,
    M: MemberRepository + Clone + Send + Sync + 'static,
    I: InvitationRepository + Clone + Send + Sync + 'static,
    U: UserRepository + Clone + Send + Sync + 'static,
    S: SessionRepository + Clone + Send + Sync + 'static,
    X: InvitationMailer + Clone + Send + Sync + 'static,
{
    match state
        .service
        .reject_invitation(&invitation_id, &auth.user.id)
        .await
    {
        Ok(invitation) => Json(InvitationResponse::from(invitation)).into_response(),
        Err(err) => AppError(err).into_response(),
    }
}

/// Point the session at an organization, or clear the selection.
///
/// PUT /session/active-organization
pub async fn set_active_organization<O, M, I, U, S, X>(
    State(state): State<AppState<O, M, I, U, S, X>>,
    auth: AuthSession,
    Json(body): Json<SetActiveOrganizationRequest>,
) -> impl IntoResponse
where
    O: OrganizationRepository + Clone + Send + Sync + 'static,
    M: MemberRepository + Clone + Send + Sync + 'static,
    I: InvitationRepository + Clone + Send + Sync + 'static,
    U: UserRepository + Clone + Send + Sync + 'static,
    S: SessionRepository + Clone + Send + Sync + 'static,
    X: InvitationMailer + Clone + Send + Sync + 'static,
{
    match state
        .service
        .set_active_organization(&auth.session, body.organization_id.as_deref())
        .await
    {
        Ok(session) => Json(SessionResponse::new(&session, auth.user)).into_response(),
        Err(err) => AppError(err).into_response(),
    }
}

/// Aggregate dashboard read.
///
/// GET /session/dashboard
///
/// Never fails: a missing session or a failed organization load degrades to
/// `null` fields so the page still renders.
pub async fn dashboard<O, M, I, U, S, X>(
    State(state): State<AppState<O, M, I, U, S, X>>,
    auth: Option<AuthSession>,
) -> Json<DashboardResponse>
where
    O: OrganizationRepository + Clone + Send + Sync + 'static,
    M: MemberRepository + Clone + Send + Sync + 'static,
    I: InvitationRepository + Clone + Send + Sync + 'static,
    U: UserRepository + Clone + Send + Sync + 'static,
    S: SessionRepository + Clone + Send + Sync + 'static,
    X: InvitationMailer + Clone + Send + Sync + 'static,
{
    let Some(auth) = auth else {
        return Json(DashboardResponse {
            session: None,
            organization: None,
        });
    };

    let organization = match state.service.get_full_organization(&auth.session).await {
        Ok(org) => org.map(FullOrganizationResponse::from),
        Err(e) => {
            log::error!(
                target: "atrium_orgs",
                "msg=\"dashboard organization load failed\", user_id={}, error=\"{e}\"",
                auth.user.id
            );
            None
        }
    };

    Json(DashboardResponse {
        session: Some(SessionResponse::new(&auth.session, auth.user)),
        organization,
    })
}
