//! Core types for organization management.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::access::Role;
use crate::identity::User;

/// A tenant: an isolated group of users sharing resources.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organization {
    /// Unique identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// URL-friendly unique identifier, if one was chosen.
    pub slug: Option<String>,
    /// Logo URL.
    pub logo: Option<String>,
    /// When the organization was created.
    pub created_at: DateTime<Utc>,
    /// Opaque metadata blob. Not interpreted by this crate.
    pub metadata: Option<String>,
}

/// The join record granting one user a role within one organization.
///
/// At most one member row exists per (organization, user) pair; the
/// persistence layer enforces this with a unique index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    /// Unique identifier.
    pub id: String,
    /// The organization this membership belongs to.
    pub organization_id: String,
    /// The user who is a member.
    pub user_id: String,
    /// Role within the organization.
    pub role: Role,
    /// When the user joined.
    pub created_at: DateTime<Utc>,
}

/// A member row with the user's identity attached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberWithUser {
    #[serde(flatten)]
    pub member: Member,
    pub user: User,
}

/// Lifecycle state of an invitation.
///
/// `Pending` is the only non-terminal state. Expired-but-unswept rows may
/// still read `Pending` from storage; [`Invitation::is_actionable`] is the
/// authoritative check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Rejected,
    Canceled,
    Expired,
}

impl InvitationStatus {
    /// String form used in storage.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Canceled => "canceled",
            Self::Expired => "expired",
        }
    }

    /// Parses the storage string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "accepted" => Some(Self::Accepted),
            "rejected" => Some(Self::Rejected),
            "canceled" => Some(Self::Canceled),
            "expired" => Some(Self::Expired),
            _ => None,
        }
    }
}

impl Default for InvitationStatus {
    fn default() -> Self {
        Self::Pending
    }
}

/// A time-limited, email-addressed offer to join an organization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invitation {
    /// Unique identifier. Doubles as the accept-link parameter.
    pub id: String,
    /// The organization being invited to.
    pub organization_id: String,
    /// Email of the invitee.
    pub email: String,
    /// Role to assign on acceptance.
    pub role: Role,
    /// Lifecycle state.
    pub status: InvitationStatus,
    /// When the invitation stops being actionable.
    pub expires_at: DateTime<Utc>,
    /// The member who sent the invitation.
    pub inviter_id: String,
}

impl Invitation {
    /// Whether the expiry has passed.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Whether the invitation can still be accepted or rejected.
    ///
    /// `status == Pending` alone is not proof of validity; the expiry is
    /// authoritative even when the row has not been swept yet.
    pub fn is_actionable(&self, now: DateTime<Utc>) -> bool {
        self.status == InvitationStatus::Pending && !self.is_expired(now)
    }
}

/// An organization with its members (each with embedded user identity).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizationWithMembers {
    #[serde(flatten)]
    pub organization: Organization,
    pub members: Vec<MemberWithUser>,
}

/// An organization with members and all invitations, regardless of status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullOrganization {
    #[serde(flatten)]
    pub organization: Organization,
    pub members: Vec<MemberWithUser>,
    pub invitations: Vec<Invitation>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn pending_invitation(expires_at: DateTime<Utc>) -> Invitation {
        Invitation {
            id: "inv1".to_owned(),
            organization_id: "org1".to_owned(),
            email: "a@b.com".to_owned(),
            role: Role::Member,
            status: InvitationStatus::Pending,
            expires_at,
            inviter_id: "u1".to_owned(),
        }
    }

    #[test]
    fn test_status_roundtrip() {
        for status in [
            InvitationStatus::Pending,
            InvitationStatus::Accepted,
            InvitationStatus::Rejected,
            InvitationStatus::Canceled,
            InvitationStatus::Expired,
        ] {
            assert_eq!(InvitationStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(InvitationStatus::parse("declined"), None);
    }

    #[test]
    fn test_pending_but_past_expiry_is_not_actionable() {
        let now = Utc::now();
        let invitation = pending_invitation(now - Duration::hours(1));

        assert_eq!(invitation.status, InvitationStatus::Pending);
        assert!(!invitation.is_actionable(now));
    }

    #[test]
    fn test_pending_and_unexpired_is_actionable() {
        let now = Utc::now();
        let invitation = pending_invitation(now + Duration::hours(1));
        assert!(invitation.is_actionable(now));
    }

    #[test]
    fn test_terminal_states_are_not_actionable() {
        let now = Utc::now();
        let mut invitation = pending_invitation(now + Duration::hours(1));

        for status in [
            InvitationStatus::Accepted,
            InvitationStatus::Rejected,
            InvitationStatus::Canceled,
            InvitationStatus::Expired,
        ] {
            invitation.status = status;
            assert!(!invitation.is_actionable(now));
        }
    }
}
