//! Postgres database backend implementations.
//!
//! This module provides Postgres-backed implementations for all repository
//! traits. Enable the `postgres` feature to use these implementations.

pub mod migrations;
mod orgs;
mod session;
mod user;

pub use orgs::{PgInvitationRepository, PgMemberRepository, PgOrganizationRepository};
pub use session::PgSessionRepository;
use sqlx::PgPool;
pub use user::PgUserRepository;

/// Creates all Postgres repository instances from a connection pool.
pub fn create_repositories(
    pool: PgPool,
) -> (
    PgOrganizationRepository,
    PgMemberRepository,
    PgInvitationRepository,
    PgUserRepository,
    PgSessionRepository,
) {
    (
        PgOrganizationRepository::new(pool.clone()),
        PgMemberRepository::new(pool.clone()),
        PgInvitationRepository::new(pool.clone()),
        PgUserRepository::new(pool.clone()),
        PgSessionRepository::new(pool),
    )
}

/// Whether the driver error is a unique-constraint violation.
pub(crate) fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}
