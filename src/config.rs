//! Configuration for the organization layer.
//!
//! All settings live in an explicitly constructed [`AtriumConfig`] that is
//! handed to the service at startup. There is no process-wide singleton.
//!
//! # Example
//!
//! ```rust
//! use atrium::config::{AtriumConfig, InvitationConfig};
//! use chrono::Duration;
//!
//! // Use defaults
//! let config = AtriumConfig::new("https://app.example.com");
//!
//! // Or customize
//! let config = AtriumConfig {
//!     invitations: InvitationConfig {
//!         expiry: Duration::days(7),
//!     },
//!     ..AtriumConfig::new("https://app.example.com")
//! };
//! ```

use chrono::Duration;

/// Main configuration for the organization layer.
#[derive(Debug, Clone)]
pub struct AtriumConfig {
    /// Base URL of the application, used to build invitation links.
    ///
    /// Treated as an opaque input; typically sourced from deployment
    /// configuration alongside the database connection string.
    pub base_url: String,

    /// Invitation lifecycle settings.
    pub invitations: InvitationConfig,
}

impl AtriumConfig {
    /// Creates a configuration with default invitation settings.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            invitations: InvitationConfig::default(),
        }
    }

    /// Builds the link an invitee follows to accept an invitation.
    pub fn invitation_link(&self, invitation_id: &str) -> String {
        format!(
            "{}/accept-invitation/{invitation_id}",
            self.base_url.trim_end_matches('/')
        )
    }
}

/// Configuration for organization invitations.
#[derive(Debug, Clone)]
pub struct InvitationConfig {
    /// How long an invitation remains actionable after creation.
    ///
    /// Default: 48 hours
    pub expiry: Duration,
}

impl Default for InvitationConfig {
    fn default() -> Self {
        Self {
            expiry: Duration::hours(48),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_expiry() {
        let config = AtriumConfig::new("https://app.example.com");
        assert_eq!(config.invitations.expiry, Duration::hours(48));
    }

    #[test]
    fn test_invitation_link_trims_trailing_slash() {
        let config = AtriumConfig::new("https://app.example.com/");
        assert_eq!(
            config.invitation_link("inv123"),
            "https://app.example.com/accept-invitation/inv123"
        );
    }
}
