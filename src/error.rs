use std::fmt;

/// Errors produced by the organization layer.
///
/// Read operations report a missing row as `Ok(None)` and reserve
/// `DatabaseError` for transient storage failures, so callers can tell the
/// two apart instead of collapsing both into an empty result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No resolvable session for an operation that requires one.
    NotAuthenticated,
    /// The requested organization, member or invitation does not exist.
    NotFound,
    /// The caller's role lacks the required capability.
    Forbidden,
    /// A uniqueness constraint was violated (e.g. duplicate membership).
    AlreadyExists,
    /// A role string outside the closed role set.
    InvalidRole(String),
    /// The invitation's expiry has passed.
    InvitationExpired,
    /// The invitation is no longer `pending`.
    InvitationNotPending,
    /// The invitation is addressed to a different email.
    EmailMismatch,
    /// Organization creation was rejected, with the underlying cause.
    CreationFailed(String),
    /// Transient storage failure, with the driver message.
    DatabaseError(String),
    /// Invariant violation inside the process (lock poisoning and the like).
    Internal(String),
}

impl std::error::Error for AuthError {}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::NotAuthenticated => write!(f, "Not authenticated"),
            AuthError::NotFound => write!(f, "Not found"),
            AuthError::Forbidden => write!(f, "Forbidden"),
            AuthError::AlreadyExists => write!(f, "Already exists"),
            AuthError::InvalidRole(role) => write!(f, "Invalid role: {role}"),
            AuthError::InvitationExpired => write!(f, "Invitation has expired"),
            AuthError::InvitationNotPending => write!(f, "Invitation is no longer pending"),
            AuthError::EmailMismatch => {
                write!(f, "Invitation is addressed to a different email")
            }
            AuthError::CreationFailed(cause) => write!(f, "Creation failed: {cause}"),
            AuthError::DatabaseError(msg) => write!(f, "Database error: {msg}"),
            AuthError::Internal(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_cause() {
        let err = AuthError::CreationFailed("slug taken".to_owned());
        assert_eq!(err.to_string(), "Creation failed: slug taken");

        let err = AuthError::InvalidRole("superuser".to_owned());
        assert_eq!(err.to_string(), "Invalid role: superuser");
    }
}
