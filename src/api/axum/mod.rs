//! Axum adapter: routes, handlers, session extraction and error mapping.

mod error;
pub mod handlers;
mod middleware;
mod routes;

pub use error::AppError;
pub use middleware::{
    extract_bearer_token, extract_session_cookie, AuthSession, SESSION_COOKIE,
};
pub use routes::{invitation_routes, organization_routes, session_routes, AppState};
