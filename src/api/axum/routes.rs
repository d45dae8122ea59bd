//! Route configuration for Axum organization endpoints.

use axum::routing::{delete, get, post, put};
use axum::Router;

use super::handlers;
use crate::identity::{SessionRepository, UserRepository};
use crate::orgs::{
    InvitationMailer, InvitationRepository, MemberRepository, OrganizationRepository,
    OrganizationService,
};

/// Application state for organization routes.
///
/// Holds the domain service plus the user/session repositories the
/// authentication extractor reads directly.
#[derive(Clone)]
pub struct AppState<O, M, I, U, S, X> {
    pub service: OrganizationService<O, M, I, U, S, X>,
    pub users: U,
    pub sessions: S,
}

impl<O, M, I, U, S, X> AppState<O, M, I, U, S, X> {
    pub fn new(service: OrganizationService<O, M, I, U, S, X>, users: U, sessions: S) -> Self {
        Self {
            service,
            users,
            sessions,
        }
    }
}

/// Creates the organization routes.
///
/// All routes require authentication via bearer token or session cookie.
///
/// # Routes
///
/// ## Organizations
/// - `POST /` - Create an organization (creator becomes owner)
/// - `GET /` - List the caller's organizations
/// - `GET /active` - Full active organization with members and invitations
/// - `GET /slug/:slug` - Organization by slug with members
/// - `PUT /:id` - Update an organization
/// - `DELETE /:id` - Delete an organization
///
/// ## Members
/// - `DELETE /:id/members/:user_id` - Remove a member (or leave)
///
/// ## Invitations
/// - `POST /:id/invitations` - Invite a member by email
/// - `DELETE /:id/invitations/:invitation_id` - Cancel an invitation
pub fn organization_routes<O, M, I, U, S, X>() -> Router<AppState<O, M, I, U, S, X>>
where
    O: OrganizationRepository + Clone + Send + Sync + 'static,
    M: MemberRepository + Clone + Send + Sync + 'static,
    I: InvitationRepository + Clone + Send + Sync + 'static,
    U: UserRepository + Clone + Send + Sync + 'static,
    S: SessionRepository + Clone + Send + Sync + 'static,
    X: InvitationMailer + Clone + Send + Sync + 'static,
{
    Router::new()
        .route(
            "/",
            post(handlers::create_organization::<O, M, I, U, S, X>),
        )
        .route("/", get(handlers::list_organizations::<O, M, I, U, S, X>))
        .route(
            "/active",
            get(handlers::get_full_organization::<O, M, I, U, S, X>),
        )
        .route(
            "/slug/:slug",
            get(handlers::get_organization_by_slug::<O, M, I, U, S, X>),
        )
        .route(
            "/:id",
            put(handlers::update_organization::<O, M, I, U, S, X>),
        )
        .route(
            "/:id",
            delete(handlers::delete_organization::<O, M, I, U, S, X>),
        )
        .route(
            "/:id/members/:user_id",
            delete(handlers::remove_member::<O, M, I, U, S, X>),
        )
        .route(
            "/:id/invitations",
            post(handlers::create_invitation::<O, M, I, U, S, X>),
        )
        .route(
            "/:id/invitations/:invitation_id",
            delete(handlers::cancel_invitation::<O, M, I, U, S, X>),
        )
}

/// Creates the invitee-facing invitation routes.
///
/// # Routes
/// - `GET /accept-invitation/:invitation_id` - Accept and redirect to the
///   dashboard (failures are logged, never surfaced)
/// - `POST /invitations/:invitation_id/reject` - Decline an invitation
pub fn invitation_routes<O, M, I, U, S, X>() -> Router<AppState<O, M, I, U, S, X>>
where
    O: OrganizationRepository + Clone + Send + Sync + 'static,
    M: MemberRepository + Clone + Send + Sync + 'static,
    I: InvitationRepository + Clone + Send + Sync + 'static,
    U: UserRepository + Clone + Send + Sync + 'static,
    S: SessionRepository + Clone + Send + Sync + 'static,
    X: InvitationMailer + Clone + Send + Sync + 'static,
{
    Router::new()
        .route(
            "/accept-invitation/:invitation_id",
            get(handlers::accept_invitation::<O, M, I, U, S, X>),
        )
        .route(
            "/invitations/:invitation_id/reject",
            post(handlers::reject_invitation::<O, M, I, U, S, X>),
        )
}

/// Creates the session-scoped routes.
///
/// # Routes
/// - `PUT /active-organization` - Point the session at an organization
/// - `GET /dashboard` - Aggregate dashboard read (degrades to nulls)
pub fn session_routes<O, M, I, U, S, X>() -> Router<AppState<O, M, I, U, S, X>>
where
    O: OrganizationRepository + Clone + Send + Sync + 'static,
    M: MemberRepository + Clone + Send + Sync + 'static,
    I: InvitationRepository + Clone + Send + Sync + 'static,
    U: UserRepository + Clone + Send + Sync + 'static,
    S: SessionRepository + Clone + Send + Sync + 'static,
    X: InvitationMailer + Clone + Send + Sync + 'static,
{
    Router::new()
        .route(
            "/active-organization",
            put(handlers::set_active_organization::<O, M, I, U, S, X>),
        )
        .route("/dashboard", get(handlers::dashboard::<O, M, I, U, S, X>))
}
