use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use crate::context::MigrationEvent;
use crate::error::{RatchetError, Result};
use crate::listener::MigrationListener;

/// Listener that counts hook invocations and records their order.
#[derive(Debug, Default)]
pub struct CountingListener {
    targets: Vec<String>,
    before: AtomicUsize,
    after: AtomicUsize,
    log: RwLock<Vec<String>>,
    fail_before: bool,
}

impl CountingListener {
    /// Listener that hears every run.
    pub fn new() -> Self {
        Self::default()
    }

    /// Listener scoped to a single product.
    pub fn for_product(product_name: impl Into<String>) -> Self {
        Self {
            targets: vec![product_name.into()],
            ..Self::default()
        }
    }

    /// Make `before_migration` return an error (still counted).
    pub fn failing_before(mut self) -> Self {
        self.fail_before = true;
        self
    }

    pub fn before_count(&self) -> usize {
        self.before.load(Ordering::SeqCst)
    }

    pub fn after_count(&self) -> usize {
        self.after.load(Ordering::SeqCst)
    }

    /// Total hook invocations.
    pub fn total_calls(&self) -> usize {
        self.before_count() + self.after_count()
    }

    /// Hook calls as `before:<id>` / `after:<id>`, in call order.
    pub fn log(&self) -> Vec<String> {
        self.log.read().map(|l| l.clone()).unwrap_or_default()
    }

    fn record(&self, entry: String) {
        if let Ok(mut log) = self.log.write() {
            log.push(entry);
        }
    }
}

impl MigrationListener for CountingListener {
    fn name(&self) -> &str {
        "counting"
    }

    fn target_product_names(&self) -> &[String] {
        &self.targets
    }

    fn before_migration(&self, event: &MigrationEvent<'_>) -> Result<()> {
        self.before.fetch_add(1, Ordering::SeqCst);
        self.record(format!("before:{}", event.migration.id));
        if self.fail_before {
            return Err(RatchetError::Listener {
                hook: "before_migration",
                message: "simulated listener failure".into(),
            });
        }
        Ok(())
    }

    fn after_migration(&self, event: &MigrationEvent<'_>) -> Result<()> {
        self.after.fetch_add(1, Ordering::SeqCst);
        self.record(format!("after:{}", event.migration.id));
        Ok(())
    }
}
