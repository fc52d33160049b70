use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{RatchetError, Result};
use crate::ledger::MigrationLedger;
use crate::migration::Migration;

/// Ledger whose writes always fail.
///
/// Reads report an empty ledger so every due step is attempted.
#[derive(Debug, Default)]
pub struct FailingLedger {
    writes: AtomicUsize,
}

impl FailingLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `mark_run` calls seen so far.
    pub fn write_attempts(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl MigrationLedger for FailingLedger {
    async fn has_run(&self, _id: &str) -> Result<bool> {
        Ok(false)
    }

    async fn mark_run(&self, migration: &Migration) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        Err(RatchetError::Ledger(format!(
            "cannot record migration '{}'",
            migration.id
        )))
    }

    async fn applied(&self) -> Result<Vec<String>> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::SemVersion;

    #[tokio::test]
    async fn test_writes_fail_and_are_counted() {
        let ledger = FailingLedger::new();
        let migration = Migration::new("a", SemVersion::major(1), "SELECT 1");

        assert!(!ledger.has_run("a").await.unwrap());
        let err = ledger.mark_run(&migration).await.unwrap_err();
        assert!(matches!(err, RatchetError::Ledger(ref msg) if msg.contains("'a'")));
        assert_eq!(ledger.write_attempts(), 1);
        assert!(ledger.applied().await.unwrap().is_empty());
    }
}
