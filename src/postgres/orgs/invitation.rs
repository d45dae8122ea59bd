//! Postgres implementation of [`InvitationRepository`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::orgs::{
    CreateInvitation, Invitation, InvitationRepository, InvitationStatus, Role,
};
use crate::{ids, AuthError};

const INVITATION_COLUMNS: &str = "id, organization_id, email, role, status, expires_at, inviter_id";

/// Postgres-backed invitation repository.
#[derive(Clone)]
pub struct PgInvitationRepository {
    pool: PgPool,
}

impl PgInvitationRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct InvitationRecord {
    id: String,
    organization_id: String,
    email: String,
    // nullable in storage; a missing role means the schema default
    role: Option<String>,
    status: String,
    expires_at: DateTime<Utc>,
    inviter_id: String,
}

impl TryFrom<InvitationRecord> for Invitation {
    type Error = AuthError;

    fn try_from(row: InvitationRecord) -> Result<Self, Self::Error> {
        let role = match row.role {
            Some(raw) => Role::parse(&raw).ok_or(AuthError::InvalidRole(raw))?,
            None => Role::default(),
        };
        let status = InvitationStatus::parse(&row.status)
            .ok_or_else(|| AuthError::Internal(format!("unknown invitation status: {}", row.status)))?;

        Ok(Invitation {
            id: row.id,
            organization_id: row.organization_id,
            email: row.email,
            role,
            status,
            expires_at: row.expires_at,
            inviter_id: row.inviter_id,
        })
    }
}

#[async_trait]
impl InvitationRepository for PgInvitationRepository {
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, data), err))]
    async fn create(&self, data: CreateInvitation) -> Result<Invitation, AuthError> {
        let row: InvitationRecord = sqlx::query_as(&format!(
            r"
            INSERT INTO invitation (id, organization_id, email, role, status, expires_at, inviter_id)
            VALUES ($1, $2, $3, $4, 'pending', $5, $6)
            RETURNING {INVITATION_COLUMNS}
            ",
        ))
        .bind(ids::generate_id())
        .bind(&data.organization_id)
        .bind(&data.email)
        .bind(data.role.as_str())
        .bind(data.expires_at)
        .bind(&data.inviter_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            log::error!(target: "atrium_orgs", "msg=\"database error\", operation=\"create_invitation\", error=\"{e}\"");
            AuthError::DatabaseError(e.to_string())
        })?;

        row.try_into()
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn find_by_id(&self, id: &str) -> Result<Option<Invitation>, AuthError> {
        let row: Option<InvitationRecord> =
            sqlx::query_as(&format!("SELECT {INVITATION_COLUMNS} FROM invitation WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    log::error!(target: "atrium_orgs", "msg=\"database error\", operation=\"find_invitation_by_id\", error=\"{e}\"");
                    AuthError::DatabaseError(e.to_string())
                })?;

        row.map(Invitation::try_from).transpose()
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn find_by_organization(
        &self,
        organization_id: &str,
    ) -> Result<Vec<Invitation>, AuthError> {
        let rows: Vec<InvitationRecord> = sqlx::query_as(&format!(
            "SELECT {INVITATION_COLUMNS} FROM invitation WHERE organization_id = $1",
        ))
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            log::error!(target: "atrium_orgs", "msg=\"database error\", operation=\"find_invitations_by_organization\", error=\"{e}\"");
            AuthError::DatabaseError(e.to_string())
        })?;

        rows.into_iter().map(Invitation::try_from).collect()
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, email), err))]
    async fn find_pending_by_email(&self, email: &str) -> Result<Vec<Invitation>, AuthError> {
        let rows: Vec<InvitationRecord> = sqlx::query_as(&format!(
            "SELECT {INVITATION_COLUMNS} FROM invitation \
             WHERE email = $1 AND status = 'pending' AND expires_at > $2",
        ))
        .bind(email)
        .bind(Utc::now())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            log::error!(target: "atrium_orgs", "msg=\"database error\", operation=\"find_pending_invitations_by_email\", error=\"{e}\"");
            AuthError::DatabaseError(e.to_string())
        })?;

        rows.into_iter().map(Invitation::try_from).collect()
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn update_status(
        &self,
        id: &str,
        status: InvitationStatus,
    ) -> Result<Invitation, AuthError> {
        let row: InvitationRecord = sqlx::query_as(&format!(
            r"
            UPDATE invitation SET status = $2
            WHERE id = $1
            RETURNING {INVITATION_COLUMNS}
            ",
        ))
        .bind(id)
        .bind(status.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => AuthError::NotFound,
            _ => {
                log::error!(target: "atrium_orgs", "msg=\"database error\", operation=\"update_invitation_status\", error=\"{e}\"");
                AuthError::DatabaseError(e.to_string())
            }
        })?;

        row.try_into()
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn delete(&self, id: &str) -> Result<(), AuthError> {
        sqlx::query("DELETE FROM invitation WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                log::error!(target: "atrium_orgs", "msg=\"database error\", operation=\"delete_invitation\", error=\"{e}\"");
                AuthError::DatabaseError(e.to_string())
            })?;

        Ok(())
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn sweep_expired(&self, now: DateTime<Utc>) -> Result<u64, AuthError> {
        let result =
            sqlx::query("UPDATE invitation SET status = 'expired' WHERE status = 'pending' AND expires_at <= $1")
                .bind(now)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    log::error!(target: "atrium_orgs", "msg=\"database error\", operation=\"sweep_expired_invitations\", error=\"{e}\"");
                    AuthError::DatabaseError(e.to_string())
                })?;

        Ok(result.rows_affected())
    }
}
