//! The organization domain service.
//!
//! Resolves and mutates organization, membership and invitation state on
//! behalf of an authenticated user. Every mutating operation checks the
//! caller's capability itself; route handlers do not need to (and cannot
//! forget to) pre-check roles.

use chrono::Utc;

use super::access::{evaluate, Action, Resource, Role};
use super::mailer::{InvitationEmail, InvitationMailer};
use super::repository::{
    CreateInvitation, CreateMember, CreateOrganization, InvitationRepository, MemberRepository,
    OrganizationRepository, UpdateOrganization,
};
use super::types::{
    FullOrganization, Invitation, InvitationStatus, Member, Organization, OrganizationWithMembers,
};
use crate::config::AtriumConfig;
use crate::identity::{Session, SessionRepository, UserRepository};
use crate::AuthError;

/// The organization domain service.
///
/// Generic over the repository implementations so the same service runs
/// against Postgres in production and the in-memory mocks in tests.
#[derive(Clone)]
pub struct OrganizationService<O, M, I, U, S, X> {
    orgs: O,
    members: M,
    invitations: I,
    users: U,
    sessions: S,
    mailer: X,
    config: AtriumConfig,
}

impl<O, M, I, U, S, X> OrganizationService<O, M, I, U, S, X>
where
    O: OrganizationRepository,
    M: MemberRepository,
    I: InvitationRepository,
    U: UserRepository,
    S: SessionRepository,
    X: InvitationMailer,
{
    pub fn new(
        orgs: O,
        members: M,
        invitations: I,
        users: U,
        sessions: S,
        mailer: X,
        config: AtriumConfig,
    ) -> Self {
        Self {
            orgs,
            members,
            invitations,
            users,
            sessions,
            mailer,
            config,
        }
    }

    pub fn config(&self) -> &AtriumConfig {
        &self.config
    }

    /// All organizations the user belongs to, order unspecified.
    ///
    /// Two-phase read: member rows first, then organizations by id set. A
    /// membership added or removed between the phases may be missed; that
    /// staleness window is accepted.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "list_organizations", skip(self), err)
    )]
    pub async fn list_organizations_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<Organization>, AuthError> {
        let memberships = self.members.find_by_user(user_id).await?;
        if memberships.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<String> = memberships
            .into_iter()
            .map(|m| m.organization_id)
            .collect();
        self.orgs.find_by_ids(&ids).await
    }

    /// The organization of the first membership found for the user.
    ///
    /// Which membership is "first" is up to the persistence layer; callers
    /// must not assume any ordering beyond "a membership that exists".
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "get_active_organization", skip(self), err)
    )]
    pub async fn get_active_organization(
        &self,
        user_id: &str,
    ) -> Result<Option<Organization>, AuthError> {
        let memberships = self.members.find_by_user(user_id).await?;
        let Some(membership) = memberships.into_iter().next() else {
            return Ok(None);
        };

        self.orgs.find_by_id(&membership.organization_id).await
    }

    /// The active-organization id to stamp onto a freshly created session.
    ///
    /// Session creation is the identity provider's job; it calls this hook
    /// to pick *some* existing membership when none is set.
    pub async fn active_organization_for_new_session(
        &self,
        user_id: &str,
    ) -> Result<Option<String>, AuthError> {
        let memberships = self.members.find_by_user(user_id).await?;
        Ok(memberships.into_iter().next().map(|m| m.organization_id))
    }

    /// An organization by slug, with members and their user identities.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "get_organization_by_slug", skip(self), err)
    )]
    pub async fn get_organization_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<OrganizationWithMembers>, AuthError> {
        let Some(organization) = self.orgs.find_by_slug(slug).await? else {
            return Ok(None);
        };

        let members = self
            .members
            .find_by_organization_with_users(&organization.id)
            .await?;

        Ok(Some(OrganizationWithMembers {
            organization,
            members,
        }))
    }

    /// The session's active organization with members and all invitations.
    ///
    /// Returns `Ok(None)` when the session has no active organization or
    /// the organization no longer exists.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "get_full_organization", skip_all, err)
    )]
    pub async fn get_full_organization(
        &self,
        session: &Session,
    ) -> Result<Option<FullOrganization>, AuthError> {
        let Some(org_id) = session.active_organization_id.as_deref() else {
            return Ok(None);
        };

        let Some(organization) = self.orgs.find_by_id(org_id).await? else {
            return Ok(None);
        };

        let members = self
            .members
            .find_by_organization_with_users(&organization.id)
            .await?;
        let invitations = self
            .invitations
            .find_by_organization(&organization.id)
            .await?;

        Ok(Some(FullOrganization {
            organization,
            members,
            invitations,
        }))
    }

    /// Creates an organization; the creator becomes its `owner` member.
    ///
    /// A slug collision or any storage rejection surfaces as
    /// [`AuthError::CreationFailed`] with the cause attached.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "create_organization", skip(self, data), err)
    )]
    pub async fn create_organization(
        &self,
        user_id: &str,
        data: CreateOrganization,
    ) -> Result<Organization, AuthError> {
        let organization = self.orgs.create(data).await.map_err(|e| match e {
            AuthError::AlreadyExists => {
                AuthError::CreationFailed("slug already in use".to_owned())
            }
            other => AuthError::CreationFailed(other.to_string()),
        })?;

        let membership = CreateMember {
            organization_id: organization.id.clone(),
            user_id: user_id.to_owned(),
            role: Role::Owner,
        };
        if let Err(e) = self.members.create(membership).await {
            // No cross-entity transaction here; roll back the organization
            // so a half-created tenant does not linger.
            if let Err(cleanup) = self.orgs.delete(&organization.id).await {
                log::error!(
                    target: "atrium_orgs",
                    "msg=\"failed to roll back organization after owner membership failure\", organization_id={}, error=\"{cleanup}\"",
                    organization.id
                );
            }
            return Err(AuthError::CreationFailed(e.to_string()));
        }

        log::info!(
            target: "atrium_orgs",
            "msg=\"organization created\", organization_id={}, owner_id={user_id}",
            organization.id
        );

        Ok(organization)
    }

    /// Updates name/slug/logo/metadata; requires `organization.update`.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "update_organization", skip(self, changes), err)
    )]
    pub async fn update_organization(
        &self,
        actor_id: &str,
        organization_id: &str,
        changes: UpdateOrganization,
    ) -> Result<Organization, AuthError> {
        self.require_capability(actor_id, organization_id, Resource::Organization, Action::Update)
            .await?;

        self.orgs.update(organization_id, changes).await
    }

    /// Deletes the organization; requires `organization.delete` (owner only).
    /// Member and invitation rows cascade.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "delete_organization", skip(self), err)
    )]
    pub async fn delete_organization(
        &self,
        actor_id: &str,
        organization_id: &str,
    ) -> Result<(), AuthError> {
        self.require_capability(actor_id, organization_id, Resource::Organization, Action::Delete)
            .await?;

        self.orgs.delete(organization_id).await?;

        log::info!(
            target: "atrium_orgs",
            "msg=\"organization deleted\", organization_id={organization_id}, actor_id={actor_id}"
        );

        Ok(())
    }

    /// The caller's role in the organization, or `None` without membership.
    pub async fn get_user_role(
        &self,
        user_id: &str,
        organization_id: &str,
    ) -> Result<Option<Role>, AuthError> {
        let membership = self
            .members
            .find_by_org_and_user(organization_id, user_id)
            .await?;
        Ok(membership.map(|m| m.role))
    }

    /// Whether the user may invite members into the organization.
    ///
    /// `false` (not an error) when the user has no membership.
    pub async fn can_invite_members(
        &self,
        user_id: &str,
        organization_id: &str,
    ) -> Result<bool, AuthError> {
        let role = self.get_user_role(user_id, organization_id).await?;
        Ok(role.is_some_and(|r| {
            evaluate(r, Resource::Organization, Action::InviteMember)
        }))
    }

    /// Invites `email` into the organization with the proposed role.
    ///
    /// Requires `organization.invite_member`. The mailer is fired with the
    /// accept link; delivery failure is logged, never propagated.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "invite_member", skip(self, email), err)
    )]
    pub async fn invite_member(
        &self,
        inviter_id: &str,
        organization_id: &str,
        email: &str,
        role: &str,
    ) -> Result<Invitation, AuthError> {
        let role = Role::parse(role).ok_or_else(|| AuthError::InvalidRole(role.to_owned()))?;

        let organization = self
            .orgs
            .find_by_id(organization_id)
            .await?
            .ok_or(AuthError::NotFound)?;

        self.require_capability(
            inviter_id,
            organization_id,
            Resource::Organization,
            Action::InviteMember,
        )
        .await?;

        let inviter = self
            .users
            .find_by_id(inviter_id)
            .await?
            .ok_or(AuthError::NotFound)?;

        let data = CreateInvitation {
            organization_id: organization_id.to_owned(),
            email: email.to_owned(),
            role,
            inviter_id: inviter_id.to_owned(),
            expires_at: Utc::now() + self.config.invitations.expiry,
        };
        let invitation = self.invitations.create(data).await?;

        let link = self.config.invitation_link(&invitation.id);
        let mail = InvitationEmail {
            email: &invitation.email,
            organization_name: &organization.name,
            inviter_name: &inviter.name,
            inviter_email: &inviter.email,
            invite_link: &link,
        };
        if let Err(e) = self.mailer.send_invitation(mail).await {
            log::error!(
                target: "atrium_orgs",
                "msg=\"failed to send invitation email\", invitation_id={}, error=\"{e}\"",
                invitation.id
            );
        }

        log::info!(
            target: "atrium_orgs",
            "msg=\"invitation created\", organization_id={organization_id}, invitation_id={}, email=\"{}\"",
            invitation.id,
            invitation.email
        );

        Ok(invitation)
    }

    /// Accepts an invitation on behalf of the user.
    ///
    /// The invitation must be `pending`, unexpired, and addressed to the
    /// user's email. A duplicate-membership race resolves idempotently:
    /// the surviving member row is returned.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "accept_invitation", skip(self), err)
    )]
    pub async fn accept_invitation(
        &self,
        invitation_id: &str,
        user_id: &str,
    ) -> Result<Member, AuthError> {
        let invitation = self.actionable_invitation(invitation_id, user_id).await?;

        let data = CreateMember {
            organization_id: invitation.organization_id.clone(),
            user_id: user_id.to_owned(),
            role: invitation.role,
        };
        let member = match self.members.create(data).await {
            Ok(member) => member,
            // Lost a concurrent race on the unique (organization, user)
            // index: the user is a member already, which is what acceptance
            // was after in the first place.
            Err(AuthError::AlreadyExists) => self
                .members
                .find_by_org_and_user(&invitation.organization_id, user_id)
                .await?
                .ok_or(AuthError::AlreadyExists)?,
            Err(e) => return Err(e),
        };

        if let Err(e) = self
            .invitations
            .update_status(invitation_id, InvitationStatus::Accepted)
            .await
        {
            log::error!(
                target: "atrium_orgs",
                "msg=\"failed to mark invitation as accepted\", invitation_id={invitation_id}, error=\"{e}\""
            );
        }

        log::info!(
            target: "atrium_orgs",
            "msg=\"invitation accepted\", organization_id={}, user_id={user_id}, member_id={}",
            member.organization_id,
            member.id
        );

        Ok(member)
    }

    /// Declines a pending invitation addressed to the user.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "reject_invitation", skip(self), err)
    )]
    pub async fn reject_invitation(
        &self,
        invitation_id: &str,
        user_id: &str,
    ) -> Result<Invitation, AuthError> {
        self.actionable_invitation(invitation_id, user_id).await?;

        let invitation = self
            .invitations
            .update_status(invitation_id, InvitationStatus::Rejected)
            .await?;

        log::info!(
            target: "atrium_orgs",
            "msg=\"invitation rejected\", organization_id={}, invitation_id={invitation_id}",
            invitation.organization_id
        );

        Ok(invitation)
    }

    /// Withdraws a pending invitation; requires `organization.invite_member`.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "cancel_invitation", skip(self), err)
    )]
    pub async fn cancel_invitation(
        &self,
        actor_id: &str,
        invitation_id: &str,
    ) -> Result<Invitation, AuthError> {
        let invitation = self
            .invitations
            .find_by_id(invitation_id)
            .await?
            .ok_or(AuthError::NotFound)?;

        self.require_capability(
            actor_id,
            &invitation.organization_id,
            Resource::Organization,
            Action::InviteMember,
        )
        .await?;

        if invitation.status != InvitationStatus::Pending {
            return Err(AuthError::InvitationNotPending);
        }

        self.invitations
            .update_status(invitation_id, InvitationStatus::Canceled)
            .await
    }

    /// Removes a member; requires `organization.remove_member` unless the
    /// user is removing themselves. Owners cannot be removed.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "remove_member", skip(self), err)
    )]
    pub async fn remove_member(
        &self,
        actor_id: &str,
        organization_id: &str,
        target_user_id: &str,
    ) -> Result<(), AuthError> {
        let target = self
            .members
            .find_by_org_and_user(organization_id, target_user_id)
            .await?
            .ok_or(AuthError::NotFound)?;

        if target.role == Role::Owner {
            return Err(AuthError::Forbidden);
        }

        if actor_id != target_user_id {
            self.require_capability(
                actor_id,
                organization_id,
                Resource::Organization,
                Action::RemoveMember,
            )
            .await?;
        }

        self.members
            .delete_by_org_and_user(organization_id, target_user_id)
            .await?;

        log::info!(
            target: "atrium_orgs",
            "msg=\"member removed\", organization_id={organization_id}, user_id={target_user_id}, actor_id={actor_id}"
        );

        Ok(())
    }

    /// Points the session at an organization (or clears the selection).
    ///
    /// The session user must be a member of the target organization.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "set_active_organization", skip(self, session), err)
    )]
    pub async fn set_active_organization(
        &self,
        session: &Session,
        organization_id: Option<&str>,
    ) -> Result<Session, AuthError> {
        if let Some(org_id) = organization_id {
            self.members
                .find_by_org_and_user(org_id, &session.user_id)
                .await?
                .ok_or(AuthError::Forbidden)?;
        }

        self.sessions
            .set_active_organization(&session.id, organization_id)
            .await
    }

    /// Loads an invitation and verifies it can be acted on by `user_id`:
    /// addressed to their email, still `pending`, not past expiry. An
    /// expired-but-pending row is marked `expired` on the way out.
    async fn actionable_invitation(
        &self,
        invitation_id: &str,
        user_id: &str,
    ) -> Result<Invitation, AuthError> {
        let invitation = self
            .invitations
            .find_by_id(invitation_id)
            .await?
            .ok_or(AuthError::NotFound)?;

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::NotFound)?;

        if invitation.email != user.email {
            return Err(AuthError::EmailMismatch);
        }

        if invitation.status != InvitationStatus::Pending {
            return Err(AuthError::InvitationNotPending);
        }

        if invitation.is_expired(Utc::now()) {
            if let Err(e) = self
                .invitations
                .update_status(invitation_id, InvitationStatus::Expired)
                .await
            {
                log::error!(
                    target: "atrium_orgs",
                    "msg=\"failed to mark invitation as expired\", invitation_id={invitation_id}, error=\"{e}\""
                );
            }
            return Err(AuthError::InvitationExpired);
        }

        Ok(invitation)
    }

    /// Resolves the actor's role and checks the capability, mapping a
    /// missing membership or a denied grant to `Forbidden`.
    async fn require_capability(
        &self,
        user_id: &str,
        organization_id: &str,
        resource: Resource,
        action: Action,
    ) -> Result<Role, AuthError> {
        let role = self
            .get_user_role(user_id, organization_id)
            .await?
            .ok_or(AuthError::Forbidden)?;

        if !evaluate(role, resource, action) {
            return Err(AuthError::Forbidden);
        }

        Ok(role)
    }
}

#[cfg(all(test, feature = "mocks"))]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::identity::{GlobalRole, MockSessionRepository, MockUserRepository, User};
    use crate::orgs::mocks::{
        MockInvitationRepository, MockMemberRepository, MockOrganizationRepository,
        RecordingMailer,
    };

    type TestService = OrganizationService<
        MockOrganizationRepository,
        MockMemberRepository,
        MockInvitationRepository,
        MockUserRepository,
        MockSessionRepository,
        RecordingMailer,
    >;

    struct Fixture {
        service: TestService,
        users: MockUserRepository,
        members: MockMemberRepository,
        invitations: MockInvitationRepository,
        mailer: RecordingMailer,
    }

    fn fixture() -> Fixture {
        let users = MockUserRepository::new();
        let sessions = MockSessionRepository::new();
        let orgs = MockOrganizationRepository::new();
        let members = MockMemberRepository::new(users.clone());
        let invitations = MockInvitationRepository::new();
        let mailer = RecordingMailer::new();

        let service = OrganizationService::new(
            orgs,
            members.clone(),
            invitations.clone(),
            users.clone(),
            sessions,
            mailer.clone(),
            AtriumConfig::new("https://app.example.com"),
        );

        Fixture {
            service,
            users,
            members,
            invitations,
            mailer,
        }
    }

    fn seed_user(users: &MockUserRepository, id: &str, email: &str) {
        users.push(User {
            id: id.to_owned(),
            name: format!("User {id}"),
            email: email.to_owned(),
            email_verified: true,
            image: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            role: GlobalRole::User,
            two_factor_enabled: false,
            banned: false,
            ban_reason: None,
            ban_expires: None,
        });
    }

    fn new_org(name: &str, slug: &str) -> CreateOrganization {
        CreateOrganization {
            name: name.to_owned(),
            slug: Some(slug.to_owned()),
            logo: None,
            metadata: None,
        }
    }

    #[tokio::test]
    async fn test_create_organization_makes_creator_owner() {
        let f = fixture();
        seed_user(&f.users, "u1", "owner@example.com");

        let org = f
            .service
            .create_organization("u1", new_org("Acme", "acme"))
            .await
            .unwrap();

        let role = f.service.get_user_role("u1", &org.id).await.unwrap();
        assert_eq!(role, Some(Role::Owner));
        assert!(f.service.can_invite_members("u1", &org.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_create_organization_slug_collision() {
        let f = fixture();
        seed_user(&f.users, "u1", "owner@example.com");

        f.service
            .create_organization("u1", new_org("Acme", "acme"))
            .await
            .unwrap();

        let result = f
            .service
            .create_organization("u1", new_org("Acme Two", "acme"))
            .await;
        assert!(matches!(result, Err(AuthError::CreationFailed(_))));
    }

    #[tokio::test]
    async fn test_no_membership_means_no_role_and_no_invite() {
        let f = fixture();
        seed_user(&f.users, "u1", "owner@example.com");
        seed_user(&f.users, "u2", "other@example.com");

        let org = f
            .service
            .create_organization("u1", new_org("Acme", "acme"))
            .await
            .unwrap();

        assert_eq!(f.service.get_user_role("u2", &org.id).await.unwrap(), None);
        assert!(!f.service.can_invite_members("u2", &org.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_invite_requires_capability() {
        let f = fixture();
        seed_user(&f.users, "u1", "owner@example.com");
        seed_user(&f.users, "u2", "member@example.com");

        let org = f
            .service
            .create_organization("u1", new_org("Acme", "acme"))
            .await
            .unwrap();
        f.members
            .create(CreateMember {
                organization_id: org.id.clone(),
                user_id: "u2".to_owned(),
                role: Role::Member,
            })
            .await
            .unwrap();

        let result = f
            .service
            .invite_member("u2", &org.id, "new@example.com", "member")
            .await;
        assert_eq!(result.unwrap_err(), AuthError::Forbidden);

        // owner succeeds and the mailer fires with the accept link
        let invitation = f
            .service
            .invite_member("u1", &org.id, "new@example.com", "member")
            .await
            .unwrap();
        let sent = f.mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "new@example.com");
        assert!(sent[0].1.ends_with(&format!("/accept-invitation/{}", invitation.id)));
    }

    #[tokio::test]
    async fn test_invite_rejects_unknown_role() {
        let f = fixture();
        seed_user(&f.users, "u1", "owner@example.com");

        let org = f
            .service
            .create_organization("u1", new_org("Acme", "acme"))
            .await
            .unwrap();

        let result = f
            .service
            .invite_member("u1", &org.id, "new@example.com", "superuser")
            .await;
        assert!(matches!(result, Err(AuthError::InvalidRole(_))));
    }

    #[tokio::test]
    async fn test_accept_expired_invitation_marks_it_expired() {
        let f = fixture();
        seed_user(&f.users, "u1", "owner@example.com");
        seed_user(&f.users, "u2", "invitee@example.com");

        let org = f
            .service
            .create_organization("u1", new_org("Acme", "acme"))
            .await
            .unwrap();

        let invitation = f
            .invitations
            .create(CreateInvitation {
                organization_id: org.id.clone(),
                email: "invitee@example.com".to_owned(),
                role: Role::Member,
                inviter_id: "u1".to_owned(),
                expires_at: Utc::now() - Duration::hours(1),
            })
            .await
            .unwrap();
        assert_eq!(invitation.status, InvitationStatus::Pending);

        let result = f.service.accept_invitation(&invitation.id, "u2").await;
        assert_eq!(result.unwrap_err(), AuthError::InvitationExpired);

        let stored = f
            .invitations
            .find_by_id(&invitation.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, InvitationStatus::Expired);
    }

    #[tokio::test]
    async fn test_accept_is_idempotent_for_existing_member() {
        let f = fixture();
        seed_user(&f.users, "u1", "owner@example.com");
        seed_user(&f.users, "u2", "invitee@example.com");

        let org = f
            .service
            .create_organization("u1", new_org("Acme", "acme"))
            .await
            .unwrap();

        let existing = f
            .members
            .create(CreateMember {
                organization_id: org.id.clone(),
                user_id: "u2".to_owned(),
                role: Role::Admin,
            })
            .await
            .unwrap();

        let invitation = f
            .service
            .invite_member("u1", &org.id, "invitee@example.com", "member")
            .await
            .unwrap();

        // acceptance races a membership that already exists; the surviving
        // row comes back and no duplicate is created
        let member = f
            .service
            .accept_invitation(&invitation.id, "u2")
            .await
            .unwrap();
        assert_eq!(member.id, existing.id);
        assert_eq!(member.role, Role::Admin);

        let rows = f.members.find_by_organization(&org.id).await.unwrap();
        assert_eq!(rows.len(), 2, "owner + invitee, no duplicate");
    }

    #[tokio::test]
    async fn test_remove_member_rules() {
        let f = fixture();
        seed_user(&f.users, "u1", "owner@example.com");
        seed_user(&f.users, "u2", "member@example.com");
        seed_user(&f.users, "u3", "bystander@example.com");

        let org = f
            .service
            .create_organization("u1", new_org("Acme", "acme"))
            .await
            .unwrap();
        for (user_id, role) in [("u2", Role::Member), ("u3", Role::Member)] {
            f.members
                .create(CreateMember {
                    organization_id: org.id.clone(),
                    user_id: user_id.to_owned(),
                    role,
                })
                .await
                .unwrap();
        }

        // plain member cannot remove someone else
        let err = f
            .service
            .remove_member("u2", &org.id, "u3")
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::Forbidden);

        // the owner cannot be removed, even by themselves
        let err = f
            .service
            .remove_member("u1", &org.id, "u1")
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::Forbidden);

        // self-removal is allowed
        f.service.remove_member("u3", &org.id, "u3").await.unwrap();
        assert_eq!(f.service.get_user_role("u3", &org.id).await.unwrap(), None);

        // owner removes a member
        f.service.remove_member("u1", &org.id, "u2").await.unwrap();
        assert_eq!(f.service.get_user_role("u2", &org.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_list_organizations_matches_memberships() {
        let f = fixture();
        seed_user(&f.users, "u1", "owner@example.com");

        let a = f
            .service
            .create_organization("u1", new_org("Acme", "acme"))
            .await
            .unwrap();
        let b = f
            .service
            .create_organization("u1", new_org("Globex", "globex"))
            .await
            .unwrap();

        let mut listed: Vec<String> = f
            .service
            .list_organizations_for_user("u1")
            .await
            .unwrap()
            .into_iter()
            .map(|o| o.id)
            .collect();
        listed.sort();
        let mut expected = vec![a.id, b.id];
        expected.sort();
        assert_eq!(listed, expected);

        assert!(f
            .service
            .list_organizations_for_user("nobody")
            .await
            .unwrap()
            .is_empty());
    }
}
