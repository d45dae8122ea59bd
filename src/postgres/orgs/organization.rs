//! Postgres implementation of [`OrganizationRepository`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::orgs::{CreateOrganization, Organization, OrganizationRepository, UpdateOrganization};
use crate::postgres::is_unique_violation;
use crate::{ids, AuthError};

const ORG_COLUMNS: &str = "id, name, slug, logo, created_at, metadata";

/// Postgres-backed organization repository.
#[derive(Clone)]
pub struct PgOrganizationRepository {
    pool: PgPool,
}

impl PgOrganizationRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct OrganizationRecord {
    id: String,
    name: String,
    slug: Option<String>,
    logo: Option<String>,
    created_at: DateTime<Utc>,
    metadata: Option<String>,
}

impl From<OrganizationRecord> for Organization {
    fn from(row: OrganizationRecord) -> Self {
        Organization {
            id: row.id,
            name: row.name,
            slug: row.slug,
            logo: row.logo,
            created_at: row.created_at,
            metadata: row.metadata,
        }
    }
}

#[async_trait]
impl OrganizationRepository for PgOrganizationRepository {
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, data), err))]
    async fn create(&self, data: CreateOrganization) -> Result<Organization, AuthError> {
        let row: OrganizationRecord = sqlx::query_as(&format!(
            r"
            INSERT INTO organization (id, name, slug, logo, created_at, metadata)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {ORG_COLUMNS}
            ",
        ))
        .bind(ids::generate_id())
        .bind(&data.name)
        .bind(&data.slug)
        .bind(&data.logo)
        .bind(Utc::now())
        .bind(&data.metadata)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                return AuthError::AlreadyExists;
            }
            log::error!(target: "atrium_orgs", "msg=\"database error\", operation=\"create_organization\", error=\"{e}\"");
            AuthError::DatabaseError(e.to_string())
        })?;

        Ok(row.into())
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn find_by_id(&self, id: &str) -> Result<Option<Organization>, AuthError> {
        let row: Option<OrganizationRecord> =
            sqlx::query_as(&format!("SELECT {ORG_COLUMNS} FROM organization WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    log::error!(target: "atrium_orgs", "msg=\"database error\", operation=\"find_organization_by_id\", error=\"{e}\"");
                    AuthError::DatabaseError(e.to_string())
                })?;

        Ok(row.map(Into::into))
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Organization>, AuthError> {
        let row: Option<OrganizationRecord> =
            sqlx::query_as(&format!("SELECT {ORG_COLUMNS} FROM organization WHERE slug = $1"))
                .bind(slug)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    log::error!(target: "atrium_orgs", "msg=\"database error\", operation=\"find_organization_by_slug\", error=\"{e}\"");
                    AuthError::DatabaseError(e.to_string())
                })?;

        Ok(row.map(Into::into))
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, err))]
    async fn find_by_ids(&self, ids: &[String]) -> Result<Vec<Organization>, AuthError> {
        let rows: Vec<OrganizationRecord> =
            sqlx::query_as(&format!("SELECT {ORG_COLUMNS} FROM organization WHERE id = ANY($1)"))
                .bind(ids)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| {
                    log::error!(target: "atrium_orgs", "msg=\"database error\", operation=\"find_organizations_by_ids\", error=\"{e}\"");
                    AuthError::DatabaseError(e.to_string())
                })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, changes), err))]
    async fn update(
        &self,
        id: &str,
        changes: UpdateOrganization,
    ) -> Result<Organization, AuthError> {
        let row: OrganizationRecord = sqlx::query_as(&format!(
            r"
            UPDATE organization
            SET name = COALESCE($2, name),
                slug = COALESCE($3, slug),
                logo = COALESCE($4, logo),
                metadata = COALESCE($5, metadata)
            WHERE id = $1
            RETURNING {ORG_COLUMNS}
            ",
        ))
        .bind(id)
        .bind(&changes.name)
        .bind(&changes.slug)
        .bind(&changes.logo)
        .bind(&changes.metadata)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => AuthError::NotFound,
            _ if is_unique_violation(&e) => AuthError::AlreadyExists,
            _ => {
                log::error!(target: "atrium_orgs", "msg=\"database error\", operation=\"update_organization\", error=\"{e}\"");
                AuthError::DatabaseError(e.to_string())
            }
        })?;

        Ok(row.into())
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn delete(&self, id: &str) -> Result<(), AuthError> {
        // member and invitation rows cascade via foreign keys
        sqlx::query("DELETE FROM organization WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                log::error!(target: "atrium_orgs", "msg=\"database error\", operation=\"delete_organization\", error=\"{e}\"");
                AuthError::DatabaseError(e.to_string())
            })?;

        Ok(())
    }
}
