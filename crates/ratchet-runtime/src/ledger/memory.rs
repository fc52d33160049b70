use std::sync::RwLock;

use ratchet_core::error::{RatchetError, Result};
use ratchet_core::{Migration, MigrationLedger};

/// Ledger kept in process memory.
///
/// Useful for embedded stores and tests; forgets everything on restart.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    applied: RwLock<Vec<String>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ledger that already knows about the given ids.
    pub fn with_applied<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            applied: RwLock::new(ids.into_iter().map(Into::into).collect()),
        }
    }

    /// Snapshot of applied ids, in the order they were recorded.
    pub fn applied_ids(&self) -> Vec<String> {
        self.applied
            .read()
            .map(|a| a.clone())
            .unwrap_or_else(|e| e.into_inner().clone())
    }
}

impl MigrationLedger for InMemoryLedger {
    async fn has_run(&self, id: &str) -> Result<bool> {
        let applied = self
            .applied
            .read()
            .map_err(|_| RatchetError::Ledger("in-memory ledger lock poisoned".into()))?;
        Ok(applied.iter().any(|a| a == id))
    }

    async fn mark_run(&self, migration: &Migration) -> Result<()> {
        let mut applied = self
            .applied
            .write()
            .map_err(|_| RatchetError::Ledger("in-memory ledger lock poisoned".into()))?;
        if !applied.contains(&migration.id) {
            applied.push(migration.id.clone());
        }
        Ok(())
    }

    async fn applied(&self) -> Result<Vec<String>> {
        Ok(self.applied_ids())
    }
}
