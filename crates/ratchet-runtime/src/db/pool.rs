use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};

use ratchet_core::config::DatabaseConfig;
use ratchet_core::error::{RatchetError, Result};

use super::lock::MigrationLock;
use crate::ledger::PgMigrationLedger;
use crate::store::PgMigrationStore;

/// Connection pool for the database being migrated.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect using the given configuration.
    pub async fn from_config(config: &DatabaseConfig) -> Result<Self> {
        if config.url.is_empty() {
            return Err(RatchetError::Config("database.url is not set".into()));
        }

        // One connection holds the migration lock while the store uses another
        let pool = PgPoolOptions::new()
            .max_connections(config.pool_size.max(2))
            .acquire_timeout(Duration::from_secs(config.pool_timeout_secs))
            .connect(&config.url)
            .await
            .map_err(|e| RatchetError::Database(format!("Failed to connect: {}", e)))?;

        Ok(Self { pool })
    }

    /// Wrap an existing pool.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Store that applies migration steps on this pool.
    pub fn store(&self) -> PgMigrationStore {
        PgMigrationStore::new(self.pool.clone())
    }

    /// Ledger table on this pool.
    pub fn ledger(&self) -> PgMigrationLedger {
        PgMigrationLedger::new(self.pool.clone())
    }

    /// Take the process-wide migration lock on a dedicated connection.
    ///
    /// Waits while another process holds it.
    pub async fn acquire_lock(&self) -> Result<MigrationLock> {
        let conn = self.pool.acquire().await.map_err(|e| {
            RatchetError::Database(format!("Failed to get lock connection: {}", e))
        })?;
        MigrationLock::acquire(conn).await
    }

    /// Check database connectivity.
    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| RatchetError::Database(format!("Health check failed: {}", e)))?;
        Ok(())
    }

    /// Close all connections gracefully.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
