#![allow(clippy::significant_drop_tightening)]

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::mailer::{InvitationEmail, InvitationMailer};
use super::repository::{
    CreateInvitation, CreateMember, CreateOrganization, InvitationRepository, MemberRepository,
    OrganizationRepository, UpdateOrganization,
};
use super::types::{Invitation, InvitationStatus, Member, MemberWithUser, Organization};
use crate::identity::{MockUserRepository, UserRepository};
use crate::orgs::access::Role;
use crate::{ids, AuthError};

/// In-memory organization repository for tests.
#[derive(Clone)]
pub struct MockOrganizationRepository {
    orgs: Arc<RwLock<HashMap<String, Organization>>>,
}

impl MockOrganizationRepository {
    pub fn new() -> Self {
        Self {
            orgs: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for MockOrganizationRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OrganizationRepository for MockOrganizationRepository {
    async fn create(&self, data: CreateOrganization) -> Result<Organization, AuthError> {
        let mut orgs = self
            .orgs
            .write()
            .map_err(|_| AuthError::Internal("lock poisoned".into()))?;

        if let Some(slug) = &data.slug {
            if orgs.values().any(|o| o.slug.as_deref() == Some(slug)) {
                return Err(AuthError::AlreadyExists);
            }
        }

        let organization = Organization {
            id: ids::generate_id(),
            name: data.name,
            slug: data.slug,
            logo: data.logo,
            created_at: Utc::now(),
            metadata: data.metadata,
        };
        orgs.insert(organization.id.clone(), organization.clone());

        Ok(organization)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Organization>, AuthError> {
        let orgs = self
            .orgs
            .read()
            .map_err(|_| AuthError::Internal("lock poisoned".into()))?;
        Ok(orgs.get(id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Organization>, AuthError> {
        let orgs = self
            .orgs
            .read()
            .map_err(|_| AuthError::Internal("lock poisoned".into()))?;
        Ok(orgs
            .values()
            .find(|o| o.slug.as_deref() == Some(slug))
            .cloned())
    }

    async fn find_by_ids(&self, ids: &[String]) -> Result<Vec<Organization>, AuthError> {
        let orgs = self
            .orgs
            .read()
            .map_err(|_| AuthError::Internal("lock poisoned".into()))?;
        Ok(ids.iter().filter_map(|id| orgs.get(id).cloned()).collect())
    }

    async fn update(
        &self,
        id: &str,
        changes: UpdateOrganization,
    ) -> Result<Organization, AuthError> {
        let mut orgs = self
            .orgs
            .write()
            .map_err(|_| AuthError::Internal("lock poisoned".into()))?;

        if let Some(slug) = &changes.slug {
            if orgs
                .values()
                .any(|o| o.id != id && o.slug.as_deref() == Some(slug))
            {
                return Err(AuthError::AlreadyExists);
            }
        }

        let organization = orgs.get_mut(id).ok_or(AuthError::NotFound)?;
        if let Some(name) = changes.name {
            organization.name = name;
        }
        if let Some(slug) = changes.slug {
            organization.slug = Some(slug);
        }
        if let Some(logo) = changes.logo {
            organization.logo = Some(logo);
        }
        if let Some(metadata) = changes.metadata {
            organization.metadata = Some(metadata);
        }

        Ok(organization.clone())
    }

    async fn delete(&self, id: &str) -> Result<(), AuthError> {
        let mut orgs = self
            .orgs
            .write()
            .map_err(|_| AuthError::Internal("lock poisoned".into()))?;
        orgs.remove(id);
        Ok(())
    }
}

/// In-memory member repository for tests.
///
/// Holds a handle to the user repository so the with-users read can attach
/// identities, the way the Postgres implementation joins on the user table.
/// Enforces the unique (organization, user) pair.
#[derive(Clone)]
pub struct MockMemberRepository {
    members: Arc<RwLock<HashMap<String, Member>>>,
    users: MockUserRepository,
}

impl MockMemberRepository {
    pub fn new(users: MockUserRepository) -> Self {
        Self {
            members: Arc::new(RwLock::new(HashMap::new())),
            users,
        }
    }
}

#[async_trait]
impl MemberRepository for MockMemberRepository {
    async fn create(&self, data: CreateMember) -> Result<Member, AuthError> {
        let mut members = self
            .members
            .write()
            .map_err(|_| AuthError::Internal("lock poisoned".into()))?;

        if members
            .values()
            .any(|m| m.organization_id == data.organization_id && m.user_id == data.user_id)
        {
            return Err(AuthError::AlreadyExists);
        }

        let member = Member {
            id: ids::generate_id(),
            organization_id: data.organization_id,
            user_id: data.user_id,
            role: data.role,
            created_at: Utc::now(),
        };
        members.insert(member.id.clone(), member.clone());

        Ok(member)
    }

    async fn find_by_org_and_user(
        &self,
        organization_id: &str,
        user_id: &str,
    ) -> Result<Option<Member>, AuthError> {
        let members = self
            .members
            .read()
            .map_err(|_| AuthError::Internal("lock poisoned".into()))?;
        Ok(members
            .values()
            .find(|m| m.organization_id == organization_id && m.user_id == user_id)
            .cloned())
    }

    async fn find_by_user(&self, user_id: &str) -> Result<Vec<Member>, AuthError> {
        let members = self
            .members
            .read()
            .map_err(|_| AuthError::Internal("lock poisoned".into()))?;
        Ok(members
            .values()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn find_by_organization(
        &self,
        organization_id: &str,
    ) -> Result<Vec<Member>, AuthError> {
        let members = self
            .members
            .read()
            .map_err(|_| AuthError::Internal("lock poisoned".into()))?;
        Ok(members
            .values()
            .filter(|m| m.organization_id == organization_id)
            .cloned()
            .collect())
    }

    async fn find_by_organization_with_users(
        &self,
        organization_id: &str,
    ) -> Result<Vec<MemberWithUser>, AuthError> {
        let rows = self.find_by_organization(organization_id).await?;

        let mut out = Vec::with_capacity(rows.len());
        for member in rows {
            let user = self
                .users
                .find_by_id(&member.user_id)
                .await?
                .ok_or(AuthError::NotFound)?;
            out.push(MemberWithUser { member, user });
        }
        Ok(out)
    }

    async fn update_role(&self, id: &str, role: Role) -> Result<Member, AuthError> {
        let mut members = self
            .members
            .write()
            .map_err(|_| AuthError::Internal("lock poisoned".into()))?;

        let member = members.get_mut(id).ok_or(AuthError::NotFound)?;
        member.role = role;

        Ok(member.clone())
    }

    async fn delete_by_org_and_user(
        &self,
        organization_id: &str,
        user_id: &str,
    ) -> Result<(), AuthError> {
        let mut members = self
            .members
            .write()
            .map_err(|_| AuthError::Internal("lock poisoned".into()))?;
        members.retain(|_, m| !(m.organization_id == organization_id && m.user_id == user_id));
        Ok(())
    }
}

/// In-memory invitation repository for tests.
#[derive(Clone)]
pub struct MockInvitationRepository {
    invitations: Arc<RwLock<HashMap<String, Invitation>>>,
}

impl MockInvitationRepository {
    pub fn new() -> Self {
        Self {
            invitations: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for MockInvitationRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InvitationRepository for MockInvitationRepository {
    async fn create(&self, data: CreateInvitation) -> Result<Invitation, AuthError> {
        let invitation = Invitation {
            id: ids::generate_id(),
            organization_id: data.organization_id,
            email: data.email,
            role: data.role,
            status: InvitationStatus::Pending,
            expires_at: data.expires_at,
            inviter_id: data.inviter_id,
        };

        let mut invitations = self
            .invitations
            .write()
            .map_err(|_| AuthError::Internal("lock poisoned".into()))?;
        invitations.insert(invitation.id.clone(), invitation.clone());

        Ok(invitation)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Invitation>, AuthError> {
        let invitations = self
            .invitations
            .read()
            .map_err(|_| AuthError::Internal("lock poisoned".into()))?;
        Ok(invitations.get(id).cloned())
    }

    async fn find_by_organization(
        &self,
        organization_id: &str,
    ) -> Result<Vec<Invitation>, AuthError> {
        let invitations = self
            .invitations
            .read()
            .map_err(|_| AuthError::Internal("lock poisoned".into()))?;
        Ok(invitations
            .values()
            .filter(|i| i.organization_id == organization_id)
            .cloned()
            .collect())
    }

    async fn find_pending_by_email(&self, email: &str) -> Result<Vec<Invitation>, AuthError> {
        let invitations = self
            .invitations
            .read()
            .map_err(|_| AuthError::Internal("lock poisoned".into()))?;
        let now = Utc::now();
        Ok(invitations
            .values()
            .filter(|i| i.email == email && i.is_actionable(now))
            .cloned()
            .collect())
    }

    async fn update_status(
        &self,
        id: &str,
        status: InvitationStatus,
    ) -> Result<Invitation, AuthError> {
        let mut invitations = self
            .invitations
            .write()
            .map_err(|_| AuthError::Internal("lock poisoned".into()))?;

        let invitation = invitations.get_mut(id).ok_or(AuthError::NotFound)?;
        invitation.status = status;

        Ok(invitation.clone())
    }

    async fn delete(&self, id: &str) -> Result<(), AuthError> {
        let mut invitations = self
            .invitations
            .write()
            .map_err(|_| AuthError::Internal("lock poisoned".into()))?;
        invitations.remove(id);
        Ok(())
    }

    async fn sweep_expired(&self, now: DateTime<Utc>) -> Result<u64, AuthError> {
        let mut invitations = self
            .invitations
            .write()
            .map_err(|_| AuthError::Internal("lock poisoned".into()))?;

        let mut swept = 0;
        for invitation in invitations.values_mut() {
            if invitation.status == InvitationStatus::Pending && invitation.expires_at <= now {
                invitation.status = InvitationStatus::Expired;
                swept += 1;
            }
        }
        Ok(swept)
    }
}

/// Mailer that records what would have been sent.
#[derive(Clone, Default)]
pub struct RecordingMailer {
    sent: Arc<RwLock<Vec<(String, String)>>>,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// (recipient, link) pairs recorded so far.
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.read().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl InvitationMailer for RecordingMailer {
    async fn send_invitation(&self, mail: InvitationEmail<'_>) -> Result<(), AuthError> {
        let mut sent = self
            .sent
            .write()
            .map_err(|_| AuthError::Internal("lock poisoned".into()))?;
        sent.push((mail.email.to_owned(), mail.invite_link.to_owned()));
        Ok(())
    }
}
