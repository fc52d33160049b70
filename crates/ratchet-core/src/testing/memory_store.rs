use std::collections::HashSet;
use std::sync::RwLock;

use crate::error::{RatchetError, Result};
use crate::migration::Migration;
use crate::store::MigrationStore;

/// Store that records applied step ids in memory.
///
/// Can be told to fail on specific ids to exercise fail-fast behaviour.
#[derive(Debug, Default)]
pub struct MemoryStore {
    applied: RwLock<Vec<String>>,
    fail_on: HashSet<String>,
}

impl MemoryStore {
    /// Create a store that accepts every step.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `apply` fail for the step with this id.
    pub fn failing_on(mut self, id: impl Into<String>) -> Self {
        self.fail_on.insert(id.into());
        self
    }

    /// Ids of applied steps, in application order.
    pub fn applied(&self) -> Vec<String> {
        self.applied.read().map(|a| a.clone()).unwrap_or_default()
    }

    /// Assert the exact sequence of applied step ids.
    pub fn assert_applied(&self, expected: &[&str]) {
        let applied = self.applied();
        assert_eq!(
            applied, expected,
            "Expected applied steps {:?}, got {:?}",
            expected, applied
        );
    }
}

impl MigrationStore for MemoryStore {
    async fn apply(&self, migration: &Migration) -> Result<()> {
        if self.fail_on.contains(&migration.id) {
            return Err(RatchetError::Database(format!(
                "simulated failure applying {}",
                migration.id
            )));
        }

        self.applied
            .write()
            .map_err(|_| RatchetError::Database("memory store lock poisoned".into()))?
            .push(migration.id.clone());
        Ok(())
    }
}
