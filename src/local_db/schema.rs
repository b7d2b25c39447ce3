//! Database Schema Definitions
//!
//! One collection, `activities`, with a secondary index on `date`. The
//! recorded schema version lives in `schema_migrations`.
//!
//! An upgrade drops and recreates the collection. There is no data
//! migration step, so bumping [`CURRENT_SCHEMA_VERSION`] discards every
//! pending entry; the loss is logged and otherwise silent.

use crate::error::StoreError;
use crate::local_db::StoreResult;
use sqlx::SqlitePool;

/// Name of the activity collection
pub const ACTIVITIES_TABLE: &str = "activities";

/// Secondary index on `date`
pub const DATE_INDEX: &str = "by_date";

/// Current database schema version
pub const CURRENT_SCHEMA_VERSION: i64 = 3;

const CREATE_MIGRATIONS_TABLE: &str = "CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL
)";

const CREATE_ACTIVITIES_TABLE: &str = "CREATE TABLE activities (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    description TEXT NOT NULL,
    type TEXT NOT NULL,
    date TEXT NOT NULL
)";

const CREATE_DATE_INDEX: &str = "CREATE INDEX by_date ON activities (date)";

/// Check if database needs the destructive upgrade
pub fn needs_upgrade(recorded_version: i64) -> bool {
    recorded_version < CURRENT_SCHEMA_VERSION
}

/// Highest recorded schema version, 0 for a fresh database
pub async fn recorded_version(pool: &SqlitePool) -> StoreResult<i64> {
    sqlx::query(CREATE_MIGRATIONS_TABLE).execute(pool).await?;
    let (version,): (i64,) = sqlx::query_as("SELECT COALESCE(MAX(version), 0) FROM schema_migrations")
        .fetch_one(pool)
        .await?;
    Ok(version)
}

/// `true` when the activity collection exists
pub async fn table_exists(pool: &SqlitePool) -> StoreResult<bool> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?")
        .bind(ACTIVITIES_TABLE)
        .fetch_one(pool)
        .await?;
    Ok(count > 0)
}

/// Bring the schema to [`CURRENT_SCHEMA_VERSION`]
pub async fn migrate(pool: &SqlitePool) -> StoreResult<()> {
    let recorded = recorded_version(pool).await?;

    if recorded > CURRENT_SCHEMA_VERSION {
        return Err(StoreError::UnsupportedSchemaVersion {
            found: recorded,
            supported: CURRENT_SCHEMA_VERSION,
        });
    }
    if !needs_upgrade(recorded) {
        return Ok(());
    }

    tracing::info!("[Store] upgrading schema from version {} to {}", recorded, CURRENT_SCHEMA_VERSION);

    if table_exists(pool).await? {
        let (discarded,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM activities")
            .fetch_one(pool)
            .await?;
        if discarded > 0 {
            tracing::warn!(
                "[Store] schema upgrade recreates '{}', discarding {} pending entries",
                ACTIVITIES_TABLE,
                discarded
            );
        }
    }

    let mut tx = pool.begin().await?;
    sqlx::query("DROP INDEX IF EXISTS by_date").execute(&mut *tx).await?;
    sqlx::query("DROP TABLE IF EXISTS activities").execute(&mut *tx).await?;
    sqlx::query(CREATE_ACTIVITIES_TABLE).execute(&mut *tx).await?;
    sqlx::query(CREATE_DATE_INDEX).execute(&mut *tx).await?;
    sqlx::query("INSERT INTO schema_migrations (version, applied_at) VALUES (?, ?)")
        .bind(CURRENT_SCHEMA_VERSION)
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    tracing::info!("[Store] collection '{}' created", ACTIVITIES_TABLE);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_version() {
        assert_eq!(CURRENT_SCHEMA_VERSION, 3);
        assert!(!needs_upgrade(CURRENT_SCHEMA_VERSION));
        assert!(needs_upgrade(0));
        assert!(needs_upgrade(2));
    }
}
