use sqlx::pool::PoolConnection;
use sqlx::Postgres;
use tracing::debug;

use ratchet_core::error::{RatchetError, Result};

/// Advisory lock key shared by every ratchet process.
pub const MIGRATION_LOCK_ID: i64 = 0x52415443484554; // "RATCHET" in hex

/// Session-level advisory lock held for the length of a migration run.
///
/// The lock lives on a dedicated connection and must be released through
/// [`MigrationLock::release`]. A dropped lock stays held until its pooled
/// connection is closed.
pub struct MigrationLock {
    conn: PoolConnection<Postgres>,
}

impl MigrationLock {
    /// Block until no other process holds the migration lock.
    pub(crate) async fn acquire(mut conn: PoolConnection<Postgres>) -> Result<Self> {
        debug!("Acquiring migration lock...");
        sqlx::query("SELECT pg_advisory_lock($1)")
            .bind(MIGRATION_LOCK_ID)
            .execute(&mut *conn)
            .await
            .map_err(|e| {
                RatchetError::Database(format!("Failed to acquire migration lock: {}", e))
            })?;
        debug!("Migration lock acquired");
        Ok(Self { conn })
    }

    /// Release the lock on the connection that took it.
    pub async fn release(mut self) -> Result<()> {
        sqlx::query("SELECT pg_advisory_unlock($1)")
            .bind(MIGRATION_LOCK_ID)
            .execute(&mut *self.conn)
            .await
            .map_err(|e| {
                RatchetError::Database(format!("Failed to release migration lock: {}", e))
            })?;
        debug!("Migration lock released");
        Ok(())
    }
}

impl std::fmt::Debug for MigrationLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MigrationLock")
            .field("key", &MIGRATION_LOCK_ID)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_id_spells_ratchet() {
        assert_eq!(&MIGRATION_LOCK_ID.to_be_bytes()[1..], b"RATCHET");
        assert!(MIGRATION_LOCK_ID > 0);
    }
}
