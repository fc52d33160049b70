use uuid::Uuid;

use crate::migration::Migration;
use crate::version::SemVersion;

/// State of a single migration run.
///
/// Created when a run starts and dropped when it returns.
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Unique id for this run, attached to tracing spans.
    pub run_id: Uuid,
    /// Version the store was at when the run started.
    pub current_version: SemVersion,
    /// Version the run is trying to reach.
    pub target_version: SemVersion,
    /// Product the run is performed for. Never `Some("")`.
    pub product_name: Option<String>,
    /// Ids of the resolved steps, in execution order.
    pub steps: Vec<String>,
    executed: usize,
}

impl RunContext {
    pub fn new(
        current_version: SemVersion,
        target_version: SemVersion,
        product_name: Option<&str>,
        steps: Vec<String>,
    ) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            current_version,
            target_version,
            product_name: normalize_product_name(product_name).map(str::to_string),
            steps,
            executed: 0,
        }
    }

    /// Product name, or `None` when the run is not scoped to a product.
    pub fn product_name(&self) -> Option<&str> {
        self.product_name.as_deref()
    }

    /// Number of steps applied so far in this run.
    pub fn executed(&self) -> usize {
        self.executed
    }

    /// Record that one more step has been applied.
    pub fn record_executed(&mut self) {
        self.executed += 1;
    }
}

/// Payload handed to listeners before and after each step.
#[derive(Debug, Clone, Copy)]
pub struct MigrationEvent<'a> {
    /// The run this step belongs to.
    pub run: &'a RunContext,
    /// The step being applied.
    pub migration: &'a Migration,
    /// Zero-based position of the step within the run.
    pub position: usize,
}

impl MigrationEvent<'_> {
    pub fn product_name(&self) -> Option<&str> {
        self.run.product_name()
    }

    /// Total number of steps resolved for the run.
    pub fn total(&self) -> usize {
        self.run.steps.len()
    }
}

/// Treat blank product names as "no product".
pub fn normalize_product_name(product_name: Option<&str>) -> Option<&str> {
    product_name.filter(|name| !name.trim().is_empty())
}
