use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::{Session, User};
use crate::orgs::{
    FullOrganization, Invitation, InvitationStatus, Member, MemberWithUser, Organization,
    OrganizationWithMembers, Role,
};

// Request DTOs

#[derive(Debug, Deserialize)]
pub struct CreateOrganizationRequest {
    pub name: String,
    pub slug: Option<String>,
    pub logo: Option<String>,
    pub metadata: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateOrganizationRequest {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub logo: Option<String>,
    pub metadata: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct InviteMemberRequest {
    pub email: String,
    /// Proposed role; validated against the closed role set.
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct SetActiveOrganizationRequest {
    /// `None` clears the selection.
    pub organization_id: Option<String>,
}

// Response DTOs

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub image: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OrganizationResponse {
    pub id: String,
    pub name: String,
    pub slug: Option<String>,
    pub logo: Option<String>,
    pub created_at: DateTime<Utc>,
    pub metadata: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MemberResponse {
    pub id: String,
    pub organization_id: String,
    pub user_id: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct MemberWithUserResponse {
    #[serde(flatten)]
    pub member: MemberResponse,
    pub user: UserResponse,
}

#[derive(Debug, Serialize)]
pub struct InvitationResponse {
    pub id: String,
    pub organization_id: String,
    pub email: String,
    pub role: Role,
    pub status: InvitationStatus,
    pub expires_at: DateTime<Utc>,
    pub inviter_id: String,
}

#[derive(Debug, Serialize)]
pub struct OrganizationWithMembersResponse {
    #[serde(flatten)]
    pub organization: OrganizationResponse,
    pub members: Vec<MemberWithUserResponse>,
}

#[derive(Debug, Serialize)]
pub struct FullOrganizationResponse {
    #[serde(flatten)]
    pub organization: OrganizationResponse,
    pub members: Vec<MemberWithUserResponse>,
    pub invitations: Vec<InvitationResponse>,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: UserResponse,
    pub active_organization_id: Option<String>,
    pub expires_at: DateTime<Utc>,
}

/// Aggregate dashboard read. Each part degrades to `null` on failure
/// instead of failing the whole request.
#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub session: Option<SessionResponse>,
    pub organization: Option<FullOrganizationResponse>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id,
            name: user.name,
            email: user.email,
            image: user.image,
        }
    }
}

impl From<Organization> for OrganizationResponse {
    fn from(org: Organization) -> Self {
        OrganizationResponse {
            id: org.id,
            name: org.name,
            slug: org.slug,
            logo: org.logo,
            created_at: org.created_at,
            metadata: org.metadata,
        }
    }
}

impl From<Member> for MemberResponse {
    fn from(member: Member) -> Self {
        MemberResponse {
            id: member.id,
            organization_id: member.organization_id,
            user_id: member.user_id,
            role: member.role,
            created_at: member.created_at,
        }
    }
}

impl From<MemberWithUser> for MemberWithUserResponse {
    fn from(row: MemberWithUser) -> Self {
        MemberWithUserResponse {
            member: row.member.into(),
            user: row.user.into(),
        }
    }
}

impl From<Invitation> for InvitationResponse {
    fn from(invitation: Invitation) -> Self {
        InvitationResponse {
            id: invitation.id,
            organization_id: invitation.organization_id,
            email: invitation.email,
            role: invitation.role,
            status: invitation.status,
            expires_at: invitation.expires_at,
            inviter_id: invitation.inviter_id,
        }
    }
}

impl From<OrganizationWithMembers> for OrganizationWithMembersResponse {
    fn from(org: OrganizationWithMembers) -> Self {
        OrganizationWithMembersResponse {
            organization: org.organization.into(),
            members: org.members.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<FullOrganization> for FullOrganizationResponse {
    fn from(org: FullOrganization) -> Self {
        FullOrganizationResponse {
            organization: org.organization.into(),
            members: org.members.into_iter().map(Into::into).collect(),
            invitations: org.invitations.into_iter().map(Into::into).collect(),
        }
    }
}

impl SessionResponse {
    pub fn new(session: &Session, user: User) -> Self {
        SessionResponse {
            user: user.into(),
            active_organization_id: session.active_organization_id.clone(),
            expires_at: session.expires_at,
        }
    }
}

impl From<crate::AuthError> for ErrorResponse {
    fn from(err: crate::AuthError) -> Self {
        ErrorResponse {
            error: err.to_string(),
        }
    }
}
