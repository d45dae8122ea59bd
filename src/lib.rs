//! Multi-tenant organization, membership and invitation layer.
//!
//! `atrium` manages the tenancy side of a web application that delegates
//! authentication itself (passwords, sessions, OAuth, 2FA, passkeys) to an
//! external identity provider: organizations, per-organization member
//! roles, role-based access control, and the invitation lifecycle.
//!
//! The core is [`orgs::OrganizationService`], generic over repository
//! traits. Postgres implementations live behind the `postgres` feature, an
//! axum route layer behind the `axum` feature, and in-memory mocks behind
//! the `mocks` feature.
//!
//! # Example
//!
//! ```rust,ignore
//! use atrium::config::AtriumConfig;
//! use atrium::orgs::{CreateOrganization, LogMailer, OrganizationService};
//! use atrium::postgres;
//!
//! let pool = sqlx::PgPool::connect(&database_url).await?;
//! postgres::migrations::run(&pool).await?;
//!
//! let (orgs, members, invitations, users, sessions) =
//!     postgres::create_repositories(pool);
//! let service = OrganizationService::new(
//!     orgs,
//!     members,
//!     invitations,
//!     users,
//!     sessions,
//!     LogMailer,
//!     AtriumConfig::new("https://app.example.com"),
//! );
//!
//! let org = service
//!     .create_organization(&user_id, CreateOrganization {
//!         name: "Acme".into(),
//!         slug: Some("acme".into()),
//!         logo: None,
//!         metadata: None,
//!     })
//!     .await?;
//! ```

pub mod config;
mod error;
pub mod identity;
pub mod ids;
pub mod orgs;

pub use error::AuthError;

#[cfg(feature = "postgres")]
pub mod postgres;

#[cfg(feature = "axum")]
pub mod api;
