//! Postgres implementation of [`UserRepository`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::identity::{GlobalRole, User, UserRepository};
use crate::AuthError;

const USER_COLUMNS: &str = "id, name, email, email_verified, image, created_at, updated_at, \
     role, two_factor_enabled, banned, ban_reason, ban_expires";

/// Postgres-backed, read-only user repository.
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct UserRecord {
    id: String,
    name: String,
    email: String,
    email_verified: bool,
    image: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    role: String,
    two_factor_enabled: bool,
    banned: bool,
    ban_reason: Option<String>,
    ban_expires: Option<DateTime<Utc>>,
}

impl TryFrom<UserRecord> for User {
    type Error = AuthError;

    fn try_from(row: UserRecord) -> Result<Self, Self::Error> {
        let role =
            GlobalRole::parse(&row.role).ok_or_else(|| AuthError::InvalidRole(row.role.clone()))?;
        Ok(User {
            id: row.id,
            name: row.name,
            email: row.email,
            email_verified: row.email_verified,
            image: row.image,
            created_at: row.created_at,
            updated_at: row.updated_at,
            role,
            two_factor_enabled: row.two_factor_enabled,
            banned: row.banned,
            ban_reason: row.ban_reason,
            ban_expires: row.ban_expires,
        })
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AuthError> {
        let row: Option<UserRecord> =
            sqlx::query_as(&format!(r#"SELECT {USER_COLUMNS} FROM "user" WHERE id = $1"#))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    log::error!(target: "atrium_orgs", "msg=\"database error\", operation=\"find_user_by_id\", error=\"{e}\"");
                    AuthError::DatabaseError(e.to_string())
                })?;

        row.map(User::try_from).transpose()
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, email), err))]
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        let row: Option<UserRecord> =
            sqlx::query_as(&format!(r#"SELECT {USER_COLUMNS} FROM "user" WHERE email = $1"#))
                .bind(email)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    log::error!(target: "atrium_orgs", "msg=\"database error\", operation=\"find_user_by_email\", error=\"{e}\"");
                    AuthError::DatabaseError(e.to_string())
                })?;

        row.map(User::try_from).transpose()
    }
}
