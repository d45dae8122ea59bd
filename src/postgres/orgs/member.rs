//! Postgres implementation of [`MemberRepository`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::identity::{GlobalRole, User};
use crate::orgs::{CreateMember, Member, MemberRepository, MemberWithUser, Role};
use crate::postgres::is_unique_violation;
use crate::{ids, AuthError};

const MEMBER_COLUMNS: &str = "id, organization_id, user_id, role, created_at";

/// Postgres-backed member repository.
#[derive(Clone)]
pub struct PgMemberRepository {
    pool: PgPool,
}

impl PgMemberRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct MemberRecord {
    id: String,
    organization_id: String,
    user_id: String,
    role: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<MemberRecord> for Member {
    type Error = AuthError;

    fn try_from(row: MemberRecord) -> Result<Self, Self::Error> {
        let role = Role::parse(&row.role).ok_or_else(|| AuthError::InvalidRole(row.role.clone()))?;
        Ok(Member {
            id: row.id,
            organization_id: row.organization_id,
            user_id: row.user_id,
            role,
            created_at: row.created_at,
        })
    }
}

/// Member row joined with its user's identity columns.
#[derive(FromRow)]
struct MemberWithUserRecord {
    id: String,
    organization_id: String,
    user_id: String,
    role: String,
    created_at: DateTime<Utc>,
    user_name: String,
    user_email: String,
    user_email_verified: bool,
    user_image: Option<String>,
    user_created_at: DateTime<Utc>,
    user_updated_at: DateTime<Utc>,
    user_role: String,
    user_two_factor_enabled: bool,
    user_banned: bool,
    user_ban_reason: Option<String>,
    user_ban_expires: Option<DateTime<Utc>>,
}

impl TryFrom<MemberWithUserRecord> for MemberWithUser {
    type Error = AuthError;

    fn try_from(row: MemberWithUserRecord) -> Result<Self, Self::Error> {
        let role = Role::parse(&row.role).ok_or_else(|| AuthError::InvalidRole(row.role.clone()))?;
        let user_role = GlobalRole::parse(&row.user_role)
            .ok_or_else(|| AuthError::InvalidRole(row.user_role.clone()))?;

        let user = User {
            id: row.user_id.clone(),
            name: row.user_name,
            email: row.user_email,
            email_verified: row.user_email_verified,
            image: row.user_image,
            created_at: row.user_created_at,
            updated_at: row.user_updated_at,
            role: user_role,
            two_factor_enabled: row.user_two_factor_enabled,
            banned: row.user_banned,
            ban_reason: row.user_ban_reason,
            ban_expires: row.user_ban_expires,
        };

        Ok(MemberWithUser {
            member: Member {
                id: row.id,
                organization_id: row.organization_id,
                user_id: row.user_id,
                role,
                created_at: row.created_at,
            },
            user,
        })
    }
}

#[async_trait]
impl MemberRepository for PgMemberRepository {
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, data), err))]
    async fn create(&self, data: CreateMember) -> Result<Member, AuthError> {
        let row: MemberRecord = sqlx::query_as(&format!(
            r"
            INSERT INTO member (id, organization_id, user_id, role, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {MEMBER_COLUMNS}
            ",
        ))
        .bind(ids::generate_id())
        .bind(&data.organization_id)
        .bind(&data.user_id)
        .bind(data.role.as_str())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                return AuthError::AlreadyExists;
            }
            log::error!(target: "atrium_orgs", "msg=\"database error\", operation=\"create_member\", error=\"{e}\"");
            AuthError::DatabaseError(e.to_string())
        })?;

        row.try_into()
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn find_by_org_and_user(
        &self,
        organization_id: &str,
        user_id: &str,
    ) -> Result<Option<Member>, AuthError> {
        let row: Option<MemberRecord> = sqlx::query_as(&format!(
            "SELECT {MEMBER_COLUMNS} FROM member WHERE organization_id = $1 AND user_id = $2",
        ))
        .bind(organization_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            log::error!(target: "atrium_orgs", "msg=\"database error\", operation=\"find_member_by_org_and_user\", error=\"{e}\"");
            AuthError::DatabaseError(e.to_string())
        })?;

        row.map(Member::try_from).transpose()
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn find_by_user(&self, user_id: &str) -> Result<Vec<Member>, AuthError> {
        let rows: Vec<MemberRecord> =
            sqlx::query_as(&format!("SELECT {MEMBER_COLUMNS} FROM member WHERE user_id = $1"))
                .bind(user_id)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| {
                    log::error!(target: "atrium_orgs", "msg=\"database error\", operation=\"find_members_by_user\", error=\"{e}\"");
                    AuthError::DatabaseError(e.to_string())
                })?;

        rows.into_iter().map(Member::try_from).collect()
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn find_by_organization(
        &self,
        organization_id: &str,
    ) -> Result<Vec<Member>, AuthError> {
        let rows: Vec<MemberRecord> = sqlx::query_as(&format!(
            "SELECT {MEMBER_COLUMNS} FROM member WHERE organization_id = $1",
        ))
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            log::error!(target: "atrium_orgs", "msg=\"database error\", operation=\"find_members_by_organization\", error=\"{e}\"");
            AuthError::DatabaseError(e.to_string())
        })?;

        rows.into_iter().map(Member::try_from).collect()
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn find_by_organization_with_users(
        &self,
        organization_id: &str,
    ) -> Result<Vec<MemberWithUser>, AuthError> {
        let rows: Vec<MemberWithUserRecord> = sqlx::query_as(
            r#"
            SELECT m.id, m.organization_id, m.user_id, m.role, m.created_at,
                   u.name AS user_name,
                   u.email AS user_email,
                   u.email_verified AS user_email_verified,
                   u.image AS user_image,
                   u.created_at AS user_created_at,
                   u.updated_at AS user_updated_at,
                   u.role AS user_role,
                   u.two_factor_enabled AS user_two_factor_enabled,
                   u.banned AS user_banned,
                   u.ban_reason AS user_ban_reason,
                   u.ban_expires AS user_ban_expires
            FROM member m
            JOIN "user" u ON u.id = m.user_id
            WHERE m.organization_id = $1
            "#,
        )
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            log::error!(target: "atrium_orgs", "msg=\"database error\", operation=\"find_members_with_users\", error=\"{e}\"");
            AuthError::DatabaseError(e.to_string())
        })?;

        rows.into_iter().map(MemberWithUser::try_from).collect()
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn update_role(&self, id: &str, role: Role) -> Result<Member, AuthError> {
        let row: MemberRecord = sqlx::query_as(&format!(
            r"
            UPDATE member SET role = $2
            WHERE id = $1
            RETURNING {MEMBER_COLUMNS}
            ",
        ))
        .bind(id)
        .bind(role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => AuthError::NotFound,
            _ => {
                log::error!(target: "atrium_orgs", "msg=\"database error\", operation=\"update_member_role\", error=\"{e}\"");
                AuthError::DatabaseError(e.to_string())
            }
        })?;

        row.try_into()
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn delete_by_org_and_user(
        &self,
        organization_id: &str,
        user_id: &str,
    ) -> Result<(), AuthError> {
        sqlx::query("DELETE FROM member WHERE organization_id = $1 AND user_id = $2")
            .bind(organization_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                log::error!(target: "atrium_orgs", "msg=\"database error\", operation=\"delete_member\", error=\"{e}\"");
                AuthError::DatabaseError(e.to_string())
            })?;

        Ok(())
    }
}
