mod lock;
mod pool;

pub use lock::{MigrationLock, MIGRATION_LOCK_ID};
pub use pool::Database;
