//! Invitation email delivery.
//!
//! Email transport lives outside this crate; the service only calls the
//! [`InvitationMailer`] callback with the assembled invitation details.

use async_trait::async_trait;

use crate::AuthError;

/// Details handed to the mailer when an invitation is created.
#[derive(Debug, Clone)]
pub struct InvitationEmail<'a> {
    /// Address of the invitee.
    pub email: &'a str,
    /// Name of the organization the invitee would join.
    pub organization_name: &'a str,
    /// Display name of the member who sent the invitation.
    pub inviter_name: &'a str,
    /// Email of the member who sent the invitation.
    pub inviter_email: &'a str,
    /// Link the invitee follows to accept.
    pub invite_link: &'a str,
}

/// Callback used to deliver invitation emails.
#[async_trait]
pub trait InvitationMailer: Send + Sync {
    async fn send_invitation(&self, mail: InvitationEmail<'_>) -> Result<(), AuthError>;
}

/// Mailer that logs the invitation link instead of sending anything.
///
/// Useful in development and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailer;

#[async_trait]
impl InvitationMailer for LogMailer {
    async fn send_invitation(&self, mail: InvitationEmail<'_>) -> Result<(), AuthError> {
        log::info!(
            target: "atrium_orgs",
            "msg=\"invitation email\", to=\"{}\", organization=\"{}\", link=\"{}\"",
            mail.email,
            mail.organization_name,
            mail.invite_link
        );
        Ok(())
    }
}
