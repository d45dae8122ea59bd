use async_trait::async_trait;

use super::types::{Session, User};
use crate::AuthError;

/// Read-only access to user records.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AuthError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError>;
}

/// Access to session records.
///
/// Sessions are issued and revoked by the identity provider; the only write
/// exposed here is the active-organization field the organization layer owns.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn find_by_token(&self, token: &str) -> Result<Option<Session>, AuthError>;

    /// Sets or clears the organization the session operates against.
    async fn set_active_organization(
        &self,
        session_id: &str,
        organization_id: Option<&str>,
    ) -> Result<Session, AuthError>;
}
