//! Registry of known migration steps and version-range resolution.

use std::collections::HashSet;

use ratchet_core::error::{RatchetError, Result};
use ratchet_core::{Migration, MigrationLedger, SemVersion};
use tracing::{debug, warn};

/// All migration steps known to the host, in registration order.
#[derive(Debug, Clone, Default)]
pub struct MigrationCatalog {
    migrations: Vec<Migration>,
}

/// Applied and pending step ids, as reported by [`MigrationCatalog::status`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationStatus {
    /// Ids recorded in the ledger, in ledger order.
    pub applied: Vec<String>,
    /// Catalog ids not yet in the ledger, ascending by version.
    pub pending: Vec<String>,
}

impl MigrationCatalog {
    /// Create a new empty catalog.
    pub fn new() -> Self {
        Self {
            migrations: Vec::new(),
        }
    }

    /// Register a step. Ids must be unique.
    pub fn register(&mut self, migration: Migration) -> Result<()> {
        if self.contains(&migration.id) {
            return Err(RatchetError::DuplicateMigration(migration.id));
        }
        self.migrations.push(migration);
        Ok(())
    }

    /// Build a catalog from a list, rejecting duplicate ids.
    pub fn from_migrations(migrations: impl IntoIterator<Item = Migration>) -> Result<Self> {
        let mut catalog = Self::new();
        for migration in migrations {
            catalog.register(migration)?;
        }
        Ok(catalog)
    }

    /// Check if a step with this id is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.migrations.iter().any(|m| m.id == id)
    }

    /// Get a step by id.
    pub fn get(&self, id: &str) -> Option<&Migration> {
        self.migrations.iter().find(|m| m.id == id)
    }

    /// All steps in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Migration> {
        self.migrations.iter()
    }

    /// Highest version any step raises the store to.
    pub fn latest_version(&self) -> Option<SemVersion> {
        self.migrations.iter().map(|m| m.version).max()
    }

    /// Get the number of registered steps.
    pub fn len(&self) -> usize {
        self.migrations.len()
    }

    /// Check if the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.migrations.is_empty()
    }

    /// Steps needed to move from `current` to `target`.
    ///
    /// Keeps steps with `current < version <= target`, ascending by version.
    /// Steps sharing a version keep their registration order. Moving
    /// backwards is an error, not a no-op.
    pub fn resolve(&self, current: SemVersion, target: SemVersion) -> Result<Vec<&Migration>> {
        if current > target {
            return Err(RatchetError::InvalidRange { current, target });
        }

        let mut due: Vec<&Migration> = self
            .migrations
            .iter()
            .filter(|m| m.version > current && m.version <= target)
            .collect();
        // stable
        due.sort_by_key(|m| m.version);

        debug!(
            "Resolved {} of {} migrations for {} -> {}",
            due.len(),
            self.migrations.len(),
            current,
            target
        );
        Ok(due)
    }

    /// Compare the catalog against a ledger.
    pub async fn status<L: MigrationLedger>(&self, ledger: &L) -> Result<MigrationStatus> {
        let applied = ledger.applied().await?;
        let applied_set: HashSet<&str> = applied.iter().map(String::as_str).collect();

        let mut pending: Vec<&Migration> = self
            .migrations
            .iter()
            .filter(|m| !applied_set.contains(m.id.as_str()))
            .collect();
        pending.sort_by_key(|m| m.version);
        let pending = pending.into_iter().map(|m| m.id.clone()).collect();

        Ok(MigrationStatus { applied, pending })
    }
}

impl From<Vec<Migration>> for MigrationCatalog {
    /// Wrap an ad-hoc step list. Later entries reusing an earlier id are dropped.
    fn from(migrations: Vec<Migration>) -> Self {
        let mut catalog = Self::new();
        for migration in migrations {
            if catalog.contains(&migration.id) {
                warn!("Ignoring duplicate migration id: {}", migration.id);
                continue;
            }
            catalog.migrations.push(migration);
        }
        catalog
    }
}
