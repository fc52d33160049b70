use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use tracing::debug;

use ratchet_core::error::{RatchetError, Result};
use ratchet_core::{Migration, MigrationLedger};

/// Ledger stored in a `ratchet_migrations` table.
#[derive(Clone)]
pub struct PgMigrationLedger {
    pool: PgPool,
}

impl PgMigrationLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the ledger table if it does not exist.
    pub async fn init(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS ratchet_migrations (
                id SERIAL PRIMARY KEY,
                migration_id VARCHAR(255) UNIQUE NOT NULL,
                version VARCHAR(64) NOT NULL,
                checksum VARCHAR(64),
                applied_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| RatchetError::Ledger(format!("Failed to init migrations table: {}", e)))?;

        debug!("Migration ledger table ready");
        Ok(())
    }

    /// Full records of applied migrations, oldest first.
    pub async fn applied_migrations(&self) -> Result<Vec<AppliedMigration>> {
        let rows = sqlx::query(
            r#"
            SELECT migration_id, version, checksum, applied_at
            FROM ratchet_migrations
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RatchetError::Ledger(format!("Failed to fetch migrations: {}", e)))?;

        let migrations = rows
            .iter()
            .map(|row| AppliedMigration {
                id: row.get("migration_id"),
                version: row.get("version"),
                checksum: row.get("checksum"),
                applied_at: row.get("applied_at"),
            })
            .collect();

        Ok(migrations)
    }
}

impl MigrationLedger for PgMigrationLedger {
    async fn has_run(&self, id: &str) -> Result<bool> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM ratchet_migrations WHERE migration_id = $1",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RatchetError::Ledger(format!("Failed to check migration: {}", e)))?;

        Ok(count > 0)
    }

    async fn mark_run(&self, migration: &Migration) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO ratchet_migrations (migration_id, version, checksum)
            VALUES ($1, $2, $3)
            ON CONFLICT (migration_id) DO NOTHING
            "#,
        )
        .bind(&migration.id)
        .bind(migration.version.to_string())
        .bind(migration.checksum())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            RatchetError::Ledger(format!("Failed to record migration '{}': {}", migration.id, e))
        })?;

        Ok(())
    }

    async fn applied(&self) -> Result<Vec<String>> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT migration_id FROM ratchet_migrations ORDER BY id ASC")
                .fetch_all(&self.pool)
                .await
                .map_err(|e| {
                    RatchetError::Ledger(format!("Failed to get applied migrations: {}", e))
                })?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }
}

/// A migration that has been applied.
#[derive(Debug, Clone)]
pub struct AppliedMigration {
    pub id: String,
    pub version: String,
    pub checksum: Option<String>,
    pub applied_at: DateTime<Utc>,
}
