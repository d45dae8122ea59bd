//! Embedded database migrations for Postgres.
//!
//! Migrations are embedded at compile time, run programmatically, and
//! tracked in the `_atrium_migrations` table.
//!
//! # Example
//!
//! ```rust,ignore
//! use atrium::postgres::migrations;
//! use sqlx::PgPool;
//!
//! async fn setup_database(pool: &PgPool) -> Result<(), sqlx::Error> {
//!     migrations::run(pool).await?;
//!     Ok(())
//! }
//! ```

use sqlx::PgPool;

/// Identity-provider-owned core tables read by this crate.
const CORE_MIGRATIONS: &[(&str, &str)] = &[
    (
        "20250801000001_create_users_table",
        include_str!("../../migrations_postgres/core/20250801000001_create_users_table.sql"),
    ),
    (
        "20250801000002_create_sessions_table",
        include_str!("../../migrations_postgres/core/20250801000002_create_sessions_table.sql"),
    ),
    (
        "20250801000003_create_accounts_table",
        include_str!("../../migrations_postgres/core/20250801000003_create_accounts_table.sql"),
    ),
    (
        "20250801000004_create_verifications_table",
        include_str!(
            "../../migrations_postgres/core/20250801000004_create_verifications_table.sql"
        ),
    ),
];

/// Tables owned by the organization layer.
const ORGS_MIGRATIONS: &[(&str, &str)] = &[
    (
        "20250801000005_create_organizations_table",
        include_str!(
            "../../migrations_postgres/orgs/20250801000005_create_organizations_table.sql"
        ),
    ),
    (
        "20250801000006_create_members_table",
        include_str!("../../migrations_postgres/orgs/20250801000006_create_members_table.sql"),
    ),
    (
        "20250801000007_create_invitations_table",
        include_str!("../../migrations_postgres/orgs/20250801000007_create_invitations_table.sql"),
    ),
];

/// Auxiliary identity-provider tables, reproduced for schema compatibility.
/// Nothing in this crate reads or writes them.
const PROVIDER_MIGRATIONS: &[(&str, &str)] = &[
    (
        "20250801000008_create_passkeys_table",
        include_str!("../../migrations_postgres/provider/20250801000008_create_passkeys_table.sql"),
    ),
    (
        "20250801000009_create_oauth_clients_table",
        include_str!(
            "../../migrations_postgres/provider/20250801000009_create_oauth_clients_table.sql"
        ),
    ),
    (
        "20250801000010_create_oauth_codes_table",
        include_str!(
            "../../migrations_postgres/provider/20250801000010_create_oauth_codes_table.sql"
        ),
    ),
    (
        "20250801000011_create_device_codes_table",
        include_str!(
            "../../migrations_postgres/provider/20250801000011_create_device_codes_table.sql"
        ),
    ),
];

/// Runs all database migrations.
///
/// Migrations are executed in order and tracked in the `_atrium_migrations`
/// table; already-applied migrations are skipped.
pub async fn run(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(
        r"
        CREATE TABLE IF NOT EXISTS _atrium_migrations (
            name TEXT PRIMARY KEY,
            applied_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        ",
    )
    .execute(pool)
    .await?;

    run_migrations(pool, CORE_MIGRATIONS).await?;
    run_migrations(pool, ORGS_MIGRATIONS).await?;
    run_migrations(pool, PROVIDER_MIGRATIONS).await?;

    Ok(())
}

async fn run_migrations(pool: &PgPool, migrations: &[(&str, &str)]) -> Result<(), sqlx::Error> {
    for (name, sql) in migrations {
        let applied: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM _atrium_migrations WHERE name = $1)")
                .bind(*name)
                .fetch_one(pool)
                .await?;

        if !applied {
            sqlx::raw_sql(sql).execute(pool).await?;

            sqlx::query("INSERT INTO _atrium_migrations (name) VALUES ($1)")
                .bind(*name)
                .execute(pool)
                .await?;
        }
    }
    Ok(())
}
