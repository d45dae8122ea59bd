//! User and session records owned by the identity provider.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Instance-wide role of a user, distinct from any per-organization role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GlobalRole {
    Admin,
    User,
}

impl GlobalRole {
    /// String form used in storage.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
        }
    }

    /// Parses the storage string form.
    ///
    /// Returns `None` for anything outside the closed set.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Self::Admin),
            "user" => Some(Self::User),
            _ => None,
        }
    }
}

impl Default for GlobalRole {
    fn default() -> Self {
        Self::User
    }
}

/// An identity record. Owned by the identity provider; read-only here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Unique email address.
    pub email: String,
    /// Whether the email has been verified.
    pub email_verified: bool,
    /// Avatar URL.
    pub image: Option<String>,
    /// When the user signed up.
    pub created_at: DateTime<Utc>,
    /// When the record was last updated.
    pub updated_at: DateTime<Utc>,
    /// Instance-wide role.
    pub role: GlobalRole,
    /// Whether two-factor authentication is enabled.
    pub two_factor_enabled: bool,
    /// Whether the user is banned.
    pub banned: bool,
    /// Reason for the ban, if any.
    pub ban_reason: Option<String>,
    /// When the ban lifts; `None` means indefinite.
    pub ban_expires: Option<DateTime<Utc>>,
}

impl User {
    /// Whether a ban is currently in force.
    pub fn is_banned(&self, now: DateTime<Utc>) -> bool {
        self.banned && self.ban_expires.map_or(true, |until| now < until)
    }
}

/// A session record. Owned by the identity provider; this crate reads it
/// and may update `active_organization_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Unique identifier.
    pub id: String,
    /// When the session expires.
    pub expires_at: DateTime<Utc>,
    /// Opaque unique session token presented by the client.
    #[serde(skip_serializing)]
    pub token: String,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
    /// When the session was last updated.
    pub updated_at: DateTime<Utc>,
    /// Client IP address at creation.
    pub ip_address: Option<String>,
    /// Client user agent at creation.
    pub user_agent: Option<String>,
    /// The user this session belongs to.
    pub user_id: String,
    /// The organization the session currently operates against.
    pub active_organization_id: Option<String>,
    /// Set when an instance admin is impersonating this user.
    pub impersonated_by: Option<String>,
}

impl Session {
    /// Whether the session has expired.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
