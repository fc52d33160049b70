//! Migration runner.
//!
//! Resolves the steps due for a version range, applies them one at a time
//! and notifies listeners around each one. Runs are forward-only and
//! fail-fast: the first failing step stops the run and nothing already
//! applied is undone.

use std::sync::Arc;

use ratchet_core::error::{RatchetError, Result};
use ratchet_core::{
    ListenerErrorPolicy, Migration, MigrationEvent, MigrationLedger, MigrationStore, NoLedger,
    RunContext, SemVersion,
};
use tracing::{debug, error, info, info_span, Instrument};

use crate::catalog::MigrationCatalog;
use crate::events::{notify, Hook, MigrationEventBus};

/// Outcome of one run.
#[derive(Debug, Default)]
pub struct ExecutionResult {
    /// Steps handed to the store.
    pub attempted: usize,
    /// Steps the store applied, including any whose ledger write or
    /// after-hook failed afterwards.
    pub succeeded: usize,
    /// Steps skipped because the ledger had already seen them.
    pub skipped: usize,
    /// What stopped the run, if anything.
    pub first_error: Option<RatchetError>,
}

impl ExecutionResult {
    /// Whether the run finished without error.
    pub fn is_success(&self) -> bool {
        self.first_error.is_none()
    }

    /// Turn a recorded failure into an `Err`.
    pub fn into_result(mut self) -> Result<Self> {
        match self.first_error.take() {
            Some(e) => Err(e),
            None => Ok(self),
        }
    }
}

/// Runs the migrations needed to move a store between two versions.
pub struct MigrationRunner<L = NoLedger> {
    catalog: MigrationCatalog,
    current: SemVersion,
    target: SemVersion,
    product_name: Option<String>,
    events: Arc<MigrationEventBus>,
    ledger: L,
    listener_policy: ListenerErrorPolicy,
}

impl MigrationRunner<NoLedger> {
    /// Create a runner for `current -> target` on behalf of `product_name`.
    ///
    /// `steps` may be a prepared [`MigrationCatalog`] or a plain `Vec`.
    pub fn new(
        current: SemVersion,
        target: SemVersion,
        product_name: Option<&str>,
        steps: impl Into<MigrationCatalog>,
    ) -> Self {
        Self {
            catalog: steps.into(),
            current,
            target,
            product_name: product_name.map(str::to_string),
            events: Arc::new(MigrationEventBus::new()),
            ledger: NoLedger,
            listener_policy: ListenerErrorPolicy::default(),
        }
    }
}

impl<L: MigrationLedger> MigrationRunner<L> {
    /// Notify the listeners registered on `events`.
    pub fn with_events(mut self, events: Arc<MigrationEventBus>) -> Self {
        self.events = events;
        self
    }

    /// Skip steps the ledger has already recorded, and record new ones.
    pub fn with_ledger<L2: MigrationLedger>(self, ledger: L2) -> MigrationRunner<L2> {
        MigrationRunner {
            catalog: self.catalog,
            current: self.current,
            target: self.target,
            product_name: self.product_name,
            events: self.events,
            ledger,
            listener_policy: self.listener_policy,
        }
    }

    pub fn with_listener_policy(mut self, policy: ListenerErrorPolicy) -> Self {
        self.listener_policy = policy;
        self
    }

    pub fn catalog(&self) -> &MigrationCatalog {
        &self.catalog
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Apply all due steps to `store`.
    ///
    /// An invalid range is returned as `Err` before anything runs. Failures
    /// during the run are reported through [`ExecutionResult::first_error`]
    /// together with how far the run got.
    pub async fn execute<S: MigrationStore>(&self, store: &S) -> Result<ExecutionResult> {
        let resolved = self.catalog.resolve(self.current, self.target)?;
        if resolved.is_empty() {
            debug!(
                "No migrations due between {} and {}",
                self.current, self.target
            );
            return Ok(ExecutionResult::default());
        }

        let mut ctx = RunContext::new(
            self.current,
            self.target,
            self.product_name.as_deref(),
            resolved.iter().map(|m| m.id.clone()).collect(),
        );
        let span = info_span!(
            "migration_run",
            run_id = %ctx.run_id,
            product = ctx.product_name().unwrap_or("-")
        );

        self.run_steps(store, &resolved, &mut ctx)
            .instrument(span)
            .await
    }

    async fn run_steps<S: MigrationStore>(
        &self,
        store: &S,
        resolved: &[&Migration],
        ctx: &mut RunContext,
    ) -> Result<ExecutionResult> {
        info!(
            "Running {} migration(s) from {} to {}",
            resolved.len(),
            ctx.current_version,
            ctx.target_version
        );

        // One filter pass per run; every step shares the product name
        let listeners = self.events.listeners_for(ctx.product_name());
        let mut result = ExecutionResult::default();

        for (position, migration) in resolved.iter().copied().enumerate() {
            match self.ledger.has_run(&migration.id).await {
                Ok(true) => {
                    debug!("Skipping already applied migration: {}", migration.id);
                    result.skipped += 1;
                    continue;
                }
                Ok(false) => {}
                Err(e) => {
                    error!("Failed to read ledger for {}: {}", migration.id, e);
                    result.first_error = Some(e);
                    break;
                }
            }

            let before = MigrationEvent {
                run: ctx,
                migration,
                position,
            };
            if let Err(e) = notify(&listeners, Hook::Before, &before, self.listener_policy) {
                result.first_error = Some(e);
                break;
            }

            result.attempted += 1;
            info!("Applying migration: {} ({})", migration.id, migration.version);

            if let Err(e) = store.apply(migration).await {
                error!("Migration {} failed: {}", migration.id, e);
                result.first_error = Some(RatchetError::step(&migration.id, e));
                break;
            }

            // The store has committed the step; later failures do not undo that
            ctx.record_executed();
            result.succeeded += 1;

            if let Err(e) = self.ledger.mark_run(migration).await {
                error!("Failed to record migration {}: {}", migration.id, e);
                result.first_error = Some(e);
                break;
            }

            let after = MigrationEvent {
                run: ctx,
                migration,
                position,
            };
            if let Err(e) = notify(&listeners, Hook::After, &after, self.listener_policy) {
                result.first_error = Some(e);
                break;
            }
        }

        info!(
            attempted = result.attempted,
            succeeded = result.succeeded,
            skipped = result.skipped,
            "Migration run finished"
        );
        Ok(result)
    }
}
