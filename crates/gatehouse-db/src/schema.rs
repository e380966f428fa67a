//! Schema definitions and migration runner for SurrealDB.
//!
//! All tables are SCHEMAFULL. UUIDs are stored as strings and enums as
//! strings with ASSERT constraints. Session expiry is stored as Unix
//! milliseconds so it round-trips without datetime coercion.

use gatehouse_core::error::UniqueField;
use serde::Deserialize;
use surrealdb::{Connection, Surreal};
use tracing::info;

use crate::error::DbError;

pub(crate) const TENANT_TABLE: &str = "tenant";
pub(crate) const USER_TABLE: &str = "app_user";
pub(crate) const ACCOUNT_TABLE: &str = "credential_account";
pub(crate) const SESSION_TABLE: &str = "user_session";

/// Unique indexes and the field each one protects.
const UNIQUE_INDEXES: &[(&str, UniqueField)] = &[
    ("idx_tenant_slug", UniqueField::TenantSlug),
    ("idx_user_email", UniqueField::UserEmail),
    ("idx_account_user_provider", UniqueField::AccountProvider),
    ("idx_session_token", UniqueField::SessionToken),
];

/// Find the unique index named in a SurrealDB error message.
pub(crate) fn unique_field_for(message: &str) -> Option<UniqueField> {
    UNIQUE_INDEXES
        .iter()
        .find(|(index, _)| message.contains(index))
        .map(|(_, field)| *field)
}

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, Deserialize)]
struct MigrationRecord {
    version: u32,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "identity_and_sessions",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
DEFINE TABLE tenant SCHEMAFULL;
DEFINE FIELD name ON TABLE tenant TYPE string;
DEFINE FIELD slug ON TABLE tenant TYPE string;
DEFINE FIELD created_at ON TABLE tenant TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_tenant_slug ON TABLE tenant COLUMNS slug UNIQUE;

DEFINE TABLE app_user SCHEMAFULL;
DEFINE FIELD name ON TABLE app_user TYPE string;
DEFINE FIELD email ON TABLE app_user TYPE string;
DEFINE FIELD tenant_id ON TABLE app_user TYPE string;
DEFINE FIELD active ON TABLE app_user TYPE bool DEFAULT true;
DEFINE FIELD email_verified ON TABLE app_user TYPE bool DEFAULT false;
DEFINE FIELD created_at ON TABLE app_user TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_user_email ON TABLE app_user COLUMNS email UNIQUE;
DEFINE INDEX idx_user_tenant ON TABLE app_user COLUMNS tenant_id;

DEFINE TABLE credential_account SCHEMAFULL;
DEFINE FIELD user_id ON TABLE credential_account TYPE string;
DEFINE FIELD provider ON TABLE credential_account TYPE string \
    ASSERT $value IN ['Credential'];
DEFINE FIELD password_hash ON TABLE credential_account \
    TYPE option<string>;
DEFINE INDEX idx_account_user_provider ON TABLE credential_account \
    COLUMNS user_id, provider UNIQUE;

DEFINE TABLE user_session SCHEMAFULL;
DEFINE FIELD user_id ON TABLE user_session TYPE string;
DEFINE FIELD token ON TABLE user_session TYPE string;
DEFINE FIELD expires_at ON TABLE user_session TYPE int;
DEFINE FIELD platform ON TABLE user_session TYPE string \
    ASSERT $value IN ['Web', 'Mobile'];
DEFINE INDEX idx_session_token ON TABLE user_session COLUMNS token UNIQUE;
DEFINE INDEX idx_session_user ON TABLE user_session COLUMNS user_id;
";

/// Apply all pending migrations in order.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let mut result = db
        .query("SELECT version FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version <= current_version {
            continue;
        }

        info!(
            version = migration.version,
            name = migration.name,
            "Applying migration"
        );
        db.query(migration.sql).await?.check().map_err(|e| {
            DbError::Migration(format!(
                "Migration v{} '{}' failed: {}",
                migration.version, migration.name, e,
            ))
        })?;

        db.query("CREATE _migration SET version = $version, name = $name")
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;

        info!(version = migration.version, "Migration applied");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_ordered() {
        for window in MIGRATIONS.windows(2) {
            assert!(
                window[0].version < window[1].version,
                "Migrations must be in ascending version order"
            );
        }
    }

    #[test]
    fn every_unique_index_is_defined() {
        for (index, _) in UNIQUE_INDEXES {
            assert!(
                SCHEMA_V1.contains(&format!("DEFINE INDEX {index} ")),
                "{index} missing from schema"
            );
        }
    }

    #[test]
    fn table_names_match_schema() {
        for table in [TENANT_TABLE, USER_TABLE, ACCOUNT_TABLE, SESSION_TABLE] {
            assert!(SCHEMA_V1.contains(&format!("DEFINE TABLE {table} SCHEMAFULL")));
        }
    }

    #[test]
    fn unique_field_lookup_ignores_unrelated_messages() {
        assert_eq!(unique_field_for("timeout"), None);
        assert_eq!(
            unique_field_for("Database index `idx_tenant_slug` already contains 'acme'"),
            Some(UniqueField::TenantSlug)
        );
    }
}
