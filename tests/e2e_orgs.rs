//! End-to-end tests for the organization layer.
//!
//! These tests demonstrate full workflows using mock repositories.
//! Run with: `cargo test --features mocks --test e2e_orgs`

#![cfg(feature = "mocks")]
#![allow(clippy::unwrap_used, clippy::expect_used)]

use chrono::{Duration, Utc};

use atrium::config::AtriumConfig;
use atrium::identity::{
    GlobalRole, MockSessionRepository, MockUserRepository, Session, SessionRepository, User,
};
use atrium::orgs::{
    evaluate, Action, CreateInvitation, CreateMember, CreateOrganization, InvitationRepository,
    InvitationStatus, MemberRepository, MockInvitationRepository, MockMemberRepository,
    MockOrganizationRepository, OrganizationService, RecordingMailer, Resource, Role,
};
use atrium::AuthError;

type Service = OrganizationService<
    MockOrganizationRepository,
    MockMemberRepository,
    MockInvitationRepository,
    MockUserRepository,
    MockSessionRepository,
    RecordingMailer,
>;

struct World {
    service: Service,
    users: MockUserRepository,
    sessions: MockSessionRepository,
    members: MockMemberRepository,
    invitations: MockInvitationRepository,
    mailer: RecordingMailer,
}

fn world() -> World {
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
        sessions.clone(),
        mailer.clone(),
        AtriumConfig::new("https://app.example.com"),
    );

    World {
        service,
        users,
        sessions,
        members,
        invitations,
        mailer,
    }
}

fn user(id: &str, email: &str) -> User {
    User {
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
    }
}

fn session(id: &str, user_id: &str, active_organization_id: Option<&str>) -> Session {
    let now = Utc::now();
    Session {
        id: id.to_owned(),
        expires_at: now + Duration::days(7),
        token: format!("token-{id}"),
        created_at: now,
        updated_at: now,
        ip_address: None,
        user_agent: None,
        user_id: user_id.to_owned(),
        active_organization_id: active_organization_id.map(str::to_owned),
        impersonated_by: None,
    }
}

fn org_input(name: &str, slug: &str) -> CreateOrganization {
    CreateOrganization {
        name: name.to_owned(),
        slug: Some(slug.to_owned()),
        logo: None,
        metadata: None,
    }
}

#[tokio::test]
async fn test_full_invitation_workflow() {
    let w = world();
    w.users.push(user("u1", "owner@example.com"));
    w.users.push(user("u2", "invitee@example.com"));

    // owner creates an organization
    let org = w
        .service
        .create_organization("u1", org_input("Acme", "acme"))
        .await
        .unwrap();
    assert_eq!(
        w.service.get_user_role("u1", &org.id).await.unwrap(),
        Some(Role::Owner)
    );

    // owner invites by email; the mailer carries the accept link
    let invitation = w
        .service
        .invite_member("u1", &org.id, "invitee@example.com", "admin")
        .await
        .unwrap();
    assert_eq!(invitation.status, InvitationStatus::Pending);
    let sent = w.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(
        sent[0].1,
        format!("https://app.example.com/accept-invitation/{}", invitation.id)
    );

    // invitee accepts and lands in the organization with the proposed role
    let member = w
        .service
        .accept_invitation(&invitation.id, "u2")
        .await
        .unwrap();
    assert_eq!(member.organization_id, org.id);
    assert_eq!(member.role, Role::Admin);

    let stored = w
        .invitations
        .find_by_id(&invitation.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, InvitationStatus::Accepted);

    // and can now invite others, being an admin
    assert!(w.service.can_invite_members("u2", &org.id).await.unwrap());
}

#[tokio::test]
async fn test_accept_requires_matching_email() {
    let w = world();
    w.users.push(user("u1", "owner@example.com"));
    w.users.push(user("u3", "someone-else@example.com"));

    let org = w
        .service
        .create_organization("u1", org_input("Acme", "acme"))
        .await
        .unwrap();
    let invitation = w
        .service
        .invite_member("u1", &org.id, "invitee@example.com", "member")
        .await
        .unwrap();

    let err = w
        .service
        .accept_invitation(&invitation.id, "u3")
        .await
        .unwrap_err();
    assert_eq!(err, AuthError::EmailMismatch);
}

#[tokio::test]
async fn test_accept_twice_is_rejected_as_not_pending() {
    let w = world();
    w.users.push(user("u1", "owner@example.com"));
    w.users.push(user("u2", "invitee@example.com"));

    let org = w
        .service
        .create_organization("u1", org_input("Acme", "acme"))
        .await
        .unwrap();
    let invitation = w
        .service
        .invite_member("u1", &org.id, "invitee@example.com", "member")
        .await
        .unwrap();

    w.service
        .accept_invitation(&invitation.id, "u2")
        .await
        .unwrap();
    let err = w
        .service
        .accept_invitation(&invitation.id, "u2")
        .await
        .unwrap_err();
    assert_eq!(err, AuthError::InvitationNotPending);
}

#[tokio::test]
async fn test_expired_pending_invitation_is_non_actionable() {
    let w = world();
    w.users.push(user("u1", "owner@example.com"));
    w.users.push(user("u2", "a@b.com"));

    let org = w
        .service
        .create_organization("u1", org_input("Acme", "acme"))
        .await
        .unwrap();

    // pending in storage, but past expiry: must not be honored
    let invitation = w
        .invitations
        .create(CreateInvitation {
            organization_id: org.id.clone(),
            email: "a@b.com".to_owned(),
            role: Role::Member,
            inviter_id: "u1".to_owned(),
            expires_at: Utc::now() - Duration::minutes(5),
        })
        .await
        .unwrap();
    assert_eq!(invitation.status, InvitationStatus::Pending);

    let err = w
        .service
        .accept_invitation(&invitation.id, "u2")
        .await
        .unwrap_err();
    assert_eq!(err, AuthError::InvitationExpired);

    let err = w
        .service
        .reject_invitation(&invitation.id, "u2")
        .await
        .unwrap_err();
    assert_eq!(err, AuthError::InvitationExpired);
}

#[tokio::test]
async fn test_reject_and_cancel_lifecycle() {
    let w = world();
    w.users.push(user("u1", "owner@example.com"));
    w.users.push(user("u2", "invitee@example.com"));

    let org = w
        .service
        .create_organization("u1", org_input("Acme", "acme"))
        .await
        .unwrap();

    // invitee declines
    let invitation = w
        .service
        .invite_member("u1", &org.id, "invitee@example.com", "member")
        .await
        .unwrap();
    let rejected = w
        .service
        .reject_invitation(&invitation.id, "u2")
        .await
        .unwrap();
    assert_eq!(rejected.status, InvitationStatus::Rejected);

    // inviter withdraws a fresh one
    let invitation = w
        .service
        .invite_member("u1", &org.id, "invitee@example.com", "member")
        .await
        .unwrap();
    let canceled = w
        .service
        .cancel_invitation("u1", &invitation.id)
        .await
        .unwrap();
    assert_eq!(canceled.status, InvitationStatus::Canceled);

    // a canceled invitation cannot be accepted
    let err = w
        .service
        .accept_invitation(&invitation.id, "u2")
        .await
        .unwrap_err();
    assert_eq!(err, AuthError::InvitationNotPending);
}

#[tokio::test]
async fn test_duplicate_membership_is_idempotent() {
    let w = world();
    w.users.push(user("u1", "owner@example.com"));
    w.users.push(user("u2", "invitee@example.com"));

    let org = w
        .service
        .create_organization("u1", org_input("Acme", "acme"))
        .await
        .unwrap();

    let first = w
        .members
        .create(CreateMember {
            organization_id: org.id.clone(),
            user_id: "u2".to_owned(),
            role: Role::Member,
        })
        .await
        .unwrap();

    // the repository surfaces the constraint violation...
    let err = w
        .members
        .create(CreateMember {
            organization_id: org.id.clone(),
            user_id: "u2".to_owned(),
            role: Role::Member,
        })
        .await
        .unwrap_err();
    assert_eq!(err, AuthError::AlreadyExists);

    // ...and acceptance converts it into the surviving row
    let invitation = w
        .service
        .invite_member("u1", &org.id, "invitee@example.com", "admin")
        .await
        .unwrap();
    let member = w
        .service
        .accept_invitation(&invitation.id, "u2")
        .await
        .unwrap();
    assert_eq!(member.id, first.id);

    assert_eq!(w.members.find_by_organization(&org.id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_active_organization_resolution() {
    let w = world();
    w.users.push(user("u1", "owner@example.com"));
    w.users.push(user("u9", "loner@example.com"));

    // no memberships: nothing to activate
    assert!(w
        .service
        .get_active_organization("u9")
        .await
        .unwrap()
        .is_none());
    assert!(w
        .service
        .active_organization_for_new_session("u9")
        .await
        .unwrap()
        .is_none());

    let a = w
        .service
        .create_organization("u1", org_input("Acme", "acme"))
        .await
        .unwrap();
    let b = w
        .service
        .create_organization("u1", org_input("Globex", "globex"))
        .await
        .unwrap();

    // some existing membership is picked; no ordering is promised
    let active = w
        .service
        .get_active_organization("u1")
        .await
        .unwrap()
        .unwrap();
    assert!(active.id == a.id || active.id == b.id);

    let hook = w
        .service
        .active_organization_for_new_session("u1")
        .await
        .unwrap()
        .unwrap();
    assert!(hook == a.id || hook == b.id);
}

#[tokio::test]
async fn test_full_organization_for_session() {
    let w = world();
    w.users.push(user("u1", "owner@example.com"));

    let org = w
        .service
        .create_organization("u1", org_input("Acme", "acme"))
        .await
        .unwrap();
    w.service
        .invite_member("u1", &org.id, "new@example.com", "member")
        .await
        .unwrap();

    // no active organization on the session: null, not an error
    let bare = session("s1", "u1", None);
    assert!(w.service.get_full_organization(&bare).await.unwrap().is_none());

    // with an active organization: members carry users, invitations of
    // every status come along
    let active = session("s2", "u1", Some(&org.id));
    let full = w
        .service
        .get_full_organization(&active)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(full.organization.id, org.id);
    assert_eq!(full.members.len(), 1);
    assert_eq!(full.members[0].user.email, "owner@example.com");
    assert_eq!(full.invitations.len(), 1);

    // a dangling active id degrades to none as well
    let dangling = session("s3", "u1", Some("gone"));
    assert!(w
        .service
        .get_full_organization(&dangling)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_get_organization_by_slug() {
    let w = world();
    w.users.push(user("u1", "owner@example.com"));

    let org = w
        .service
        .create_organization("u1", org_input("Acme", "acme"))
        .await
        .unwrap();

    let found = w
        .service
        .get_organization_by_slug("acme")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.organization.id, org.id);
    assert_eq!(found.members.len(), 1);
    assert_eq!(found.members[0].member.role, Role::Owner);

    assert!(w
        .service
        .get_organization_by_slug("missing")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_set_active_organization_requires_membership() {
    let w = world();
    w.users.push(user("u1", "owner@example.com"));
    w.users.push(user("u2", "other@example.com"));

    let org = w
        .service
        .create_organization("u1", org_input("Acme", "acme"))
        .await
        .unwrap();

    let s = session("s1", "u2", None);
    w.sessions.push(s.clone());

    let err = w
        .service
        .set_active_organization(&s, Some(&org.id))
        .await
        .unwrap_err();
    assert_eq!(err, AuthError::Forbidden);

    // members can select, and clear, their active organization
    w.members
        .create(CreateMember {
            organization_id: org.id.clone(),
            user_id: "u2".to_owned(),
            role: Role::Member,
        })
        .await
        .unwrap();

    let updated = w
        .service
        .set_active_organization(&s, Some(&org.id))
        .await
        .unwrap();
    assert_eq!(updated.active_organization_id.as_deref(), Some(org.id.as_str()));

    let cleared = w.service.set_active_organization(&s, None).await.unwrap();
    assert!(cleared.active_organization_id.is_none());

    let stored = w
        .sessions
        .find_by_token(&s.token)
        .await
        .unwrap()
        .unwrap();
    assert!(stored.active_organization_id.is_none());
}

#[tokio::test]
async fn test_update_and_delete_capabilities() {
    let w = world();
    w.users.push(user("u1", "owner@example.com"));
    w.users.push(user("u2", "admin@example.com"));

    let org = w
        .service
        .create_organization("u1", org_input("Acme", "acme"))
        .await
        .unwrap();
    w.members
        .create(CreateMember {
            organization_id: org.id.clone(),
            user_id: "u2".to_owned(),
            role: Role::Admin,
        })
        .await
        .unwrap();

    // admins can update...
    let updated = w
        .service
        .update_organization(
            "u2",
            &org.id,
            atrium::orgs::UpdateOrganization {
                name: Some("Acme Corp".to_owned()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Acme Corp");

    // ...but only owners can delete
    let err = w
        .service
        .delete_organization("u2", &org.id)
        .await
        .unwrap_err();
    assert_eq!(err, AuthError::Forbidden);

    w.service.delete_organization("u1", &org.id).await.unwrap();
    assert!(w
        .service
        .get_organization_by_slug("acme")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_sweep_marks_expired_invitations() {
    let w = world();
    w.users.push(user("u1", "owner@example.com"));

    let org = w
        .service
        .create_organization("u1", org_input("Acme", "acme"))
        .await
        .unwrap();

    let stale = w
        .invitations
        .create(CreateInvitation {
            organization_id: org.id.clone(),
            email: "stale@example.com".to_owned(),
            role: Role::Member,
            inviter_id: "u1".to_owned(),
            expires_at: Utc::now() - Duration::hours(1),
        })
        .await
        .unwrap();
    let fresh = w
        .service
        .invite_member("u1", &org.id, "fresh@example.com", "member")
        .await
        .unwrap();

    let swept = w.invitations.sweep_expired(Utc::now()).await.unwrap();
    assert_eq!(swept, 1);

    let stale = w.invitations.find_by_id(&stale.id).await.unwrap().unwrap();
    assert_eq!(stale.status, InvitationStatus::Expired);
    let fresh = w.invitations.find_by_id(&fresh.id).await.unwrap().unwrap();
    assert_eq!(fresh.status, InvitationStatus::Pending);
}

#[test]
fn test_capability_matrix_spot_checks() {
    // member cannot touch organization settings; admin and owner can
    assert!(!evaluate(Role::Member, Resource::Organization, Action::Update));
    assert!(evaluate(Role::Admin, Resource::Organization, Action::Update));
    assert!(evaluate(Role::Owner, Resource::Organization, Action::Update));

    // only owners create and delete organizations
    assert!(!evaluate(Role::Admin, Resource::Organization, Action::Create));
    assert!(!evaluate(Role::Admin, Resource::Organization, Action::Delete));
    assert!(evaluate(Role::Owner, Resource::Organization, Action::Create));
    assert!(evaluate(Role::Owner, Resource::Organization, Action::Delete));
}
