use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::access::Role;
use super::types::{Invitation, InvitationStatus, Member, MemberWithUser, Organization};
use crate::AuthError;

#[derive(Debug, Clone)]
pub struct CreateOrganization {
    pub name: String,
    pub slug: Option<String>,
    pub logo: Option<String>,
    pub metadata: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreateMember {
    pub organization_id: String,
    pub user_id: String,
    pub role: Role,
}

#[derive(Debug, Clone)]
pub struct CreateInvitation {
    pub organization_id: String,
    pub email: String,
    pub role: Role,
    pub inviter_id: String,
    pub expires_at: DateTime<Utc>,
}

/// Fields of an organization that can change after creation.
#[derive(Debug, Clone, Default)]
pub struct UpdateOrganization {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub logo: Option<String>,
    pub metadata: Option<String>,
}

#[async_trait]
pub trait OrganizationRepository: Send + Sync {
    /// Creates an organization. A slug collision surfaces as
    /// [`AuthError::AlreadyExists`].
    async fn create(&self, data: CreateOrganization) -> Result<Organization, AuthError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Organization>, AuthError>;
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Organization>, AuthError>;
    async fn find_by_ids(&self, ids: &[String]) -> Result<Vec<Organization>, AuthError>;
    async fn update(&self, id: &str, changes: UpdateOrganization)
        -> Result<Organization, AuthError>;
    /// Deletes the organization. Member and invitation rows cascade.
    async fn delete(&self, id: &str) -> Result<(), AuthError>;
}

#[async_trait]
pub trait MemberRepository: Send + Sync {
    /// Creates a member row. A duplicate (organization, user) pair surfaces
    /// as [`AuthError::AlreadyExists`]; callers decide whether that is an
    /// error or an idempotent success.
    async fn create(&self, data: CreateMember) -> Result<Member, AuthError>;
    async fn find_by_org_and_user(
        &self,
        organization_id: &str,
        user_id: &str,
    ) -> Result<Option<Member>, AuthError>;
    async fn find_by_user(&self, user_id: &str) -> Result<Vec<Member>, AuthError>;
    async fn find_by_organization(&self, organization_id: &str)
        -> Result<Vec<Member>, AuthError>;
    /// Member rows with each user's identity attached.
    async fn find_by_organization_with_users(
        &self,
        organization_id: &str,
    ) -> Result<Vec<MemberWithUser>, AuthError>;
    async fn update_role(&self, id: &str, role: Role) -> Result<Member, AuthError>;
    async fn delete_by_org_and_user(
        &self,
        organization_id: &str,
        user_id: &str,
    ) -> Result<(), AuthError>;
}

#[async_trait]
pub trait InvitationRepository: Send + Sync {
    async fn create(&self, data: CreateInvitation) -> Result<Invitation, AuthError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Invitation>, AuthError>;
    /// All invitations for an organization, regardless of status.
    async fn find_by_organization(
        &self,
        organization_id: &str,
    ) -> Result<Vec<Invitation>, AuthError>;
    async fn find_pending_by_email(&self, email: &str) -> Result<Vec<Invitation>, AuthError>;
    async fn update_status(
        &self,
        id: &str,
        status: InvitationStatus,
    ) -> Result<Invitation, AuthError>;
    async fn delete(&self, id: &str) -> Result<(), AuthError>;
    /// Marks pending invitations past their expiry as `expired`.
    /// Returns the number of rows swept.
    async fn sweep_expired(&self, now: DateTime<Utc>) -> Result<u64, AuthError>;
}
