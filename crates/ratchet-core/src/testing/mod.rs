//! Test doubles for exercising the runner without a database.
//!
//! Enabled for this crate's own tests and, for downstream crates, through
//! the `testing` feature.
//!
//! # Example
//!
//! ```ignore
//! let store = MemoryStore::new();
//! let listener = Arc::new(CountingListener::for_product("cms"));
//!
//! bus.register(listener.clone());
//! runner.execute(&store).await?;
//!
//! assert_eq!(listener.after_count(), 1);
//! store.assert_applied(&["1.1.0_users"]);
//! ```

mod counting_listener;
mod failing_ledger;
mod memory_store;

pub use counting_listener::CountingListener;
pub use failing_ledger::FailingLedger;
pub use memory_store::MemoryStore;
