mod access;
mod mailer;
mod repository;
mod service;
mod types;

pub use access::{evaluate, Action, PermissionSet, PermissionSetBuilder, Resource, Role};
pub use mailer::{InvitationEmail, InvitationMailer, LogMailer};
pub use repository::{
    CreateInvitation, CreateMember, CreateOrganization, InvitationRepository, MemberRepository,
    OrganizationRepository, UpdateOrganization,
};
pub use service::OrganizationService;
pub use types::{
    FullOrganization, Invitation, InvitationStatus, Member, MemberWithUser, Organization,
    OrganizationWithMembers,
};

#[cfg(feature = "mocks")]
mod mocks;

#[cfg(feature = "mocks")]
pub use mocks::{
    MockInvitationRepository, MockMemberRepository, MockOrganizationRepository, RecordingMailer,
};
