//! Execution side of the ratchet migration engine.
//!
//! - [`MigrationCatalog`] holds steps and resolves what is due for a range.
//! - [`MigrationRunner`] applies due steps and drives listener hooks.
//! - [`MigrationEventBus`] keeps the process-wide listener set.
//! - Postgres and in-memory implementations of the store and ledger traits.

pub mod catalog;
pub mod db;
pub mod events;
pub mod ledger;
pub mod loader;
pub mod runner;
pub mod store;

pub use catalog::{MigrationCatalog, MigrationStatus};
pub use db::{Database, MigrationLock};
pub use events::{Hook, MigrationEventBus};
pub use ledger::{AppliedMigration, InMemoryLedger, PgMigrationLedger};
pub use loader::load_migrations_from_dir;
pub use runner::{ExecutionResult, MigrationRunner};
pub use store::PgMigrationStore;
