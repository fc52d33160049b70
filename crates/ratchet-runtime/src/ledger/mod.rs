mod memory;
mod postgres;

pub use memory::InMemoryLedger;
pub use postgres::{AppliedMigration, PgMigrationLedger};
