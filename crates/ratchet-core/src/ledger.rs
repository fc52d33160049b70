use std::future::Future;
use std::sync::Arc;

use crate::error::Result;
use crate::migration::Migration;

/// Record of which steps have already been applied.
pub trait MigrationLedger: Send + Sync {
    /// Whether the step with this id has been applied before.
    fn has_run(&self, id: &str) -> impl Future<Output = Result<bool>> + Send;

    /// Record a step as applied.
    fn mark_run(&self, migration: &Migration) -> impl Future<Output = Result<()>> + Send;

    /// Ids of all applied steps.
    fn applied(&self) -> impl Future<Output = Result<Vec<String>>> + Send;
}

/// Ledger that remembers nothing.
///
/// With it, the runner relies on version-range filtering alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLedger;

impl MigrationLedger for NoLedger {
    async fn has_run(&self, _id: &str) -> Result<bool> {
        Ok(false)
    }

    async fn mark_run(&self, _migration: &Migration) -> Result<()> {
        Ok(())
    }

    async fn applied(&self) -> Result<Vec<String>> {
        Ok(Vec::new())
    }
}

impl<T: MigrationLedger> MigrationLedger for Arc<T> {
    fn has_run(&self, id: &str) -> impl Future<Output = Result<bool>> + Send {
        (**self).has_run(id)
    }

    fn mark_run(&self, migration: &Migration) -> impl Future<Output = Result<()>> + Send {
        (**self).mark_run(migration)
    }

    fn applied(&self) -> impl Future<Output = Result<Vec<String>>> + Send {
        (**self).applied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::SemVersion;

    #[tokio::test]
    async fn test_no_ledger_never_remembers() {
        let ledger = NoLedger;
        let m = Migration::new("a", SemVersion::major(1), "SELECT 1");

        ledger.mark_run(&m).await.unwrap();
        assert!(!ledger.has_run("a").await.unwrap());
        assert!(ledger.applied().await.unwrap().is_empty());
    }
}
