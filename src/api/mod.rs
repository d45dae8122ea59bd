//! HTTP adapter for the organization layer.

pub mod axum;
mod types;

pub use types::{
    CreateOrganizationRequest, DashboardResponse, ErrorResponse, FullOrganizationResponse,
    InvitationResponse, InviteMemberRequest, MemberResponse, MemberWithUserResponse,
    MessageResponse, OrganizationResponse, OrganizationWithMembersResponse, SessionResponse,
    SetActiveOrganizationRequest, UpdateOrganizationRequest, UserResponse,
};
