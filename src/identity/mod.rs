//! The narrow surface of the external identity provider.
//!
//! Credential verification, session issuance, OAuth, 2FA and passkey
//! ceremonies all happen outside this crate. What remains here is what the
//! organization layer actually consumes: user and session records, read
//! through repository traits, plus the one session field this crate is
//! allowed to write (`active_organization_id`).

mod repository;
mod types;

pub use repository::{SessionRepository, UserRepository};
pub use types::{GlobalRole, Session, User};

#[cfg(feature = "mocks")]
mod mocks;

#[cfg(feature = "mocks")]
pub use mocks::{MockSessionRepository, MockUserRepository};
