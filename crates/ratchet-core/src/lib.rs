//! Core types for the ratchet migration engine.
//!
//! This crate defines the vocabulary shared by the runtime and by hosts that
//! embed it: versions, migration steps, listener hooks, and the narrow store
//! and ledger traits the runner talks to.

pub mod config;
pub mod context;
pub mod error;
pub mod ledger;
pub mod listener;
pub mod migration;
pub mod store;
pub mod version;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use config::RatchetConfig;
pub use context::{MigrationEvent, RunContext};
pub use error::{RatchetError, Result};
pub use ledger::{MigrationLedger, NoLedger};
pub use listener::{listener_matches, CallbackListener, ListenerErrorPolicy, MigrationListener};
pub use migration::Migration;
pub use store::MigrationStore;
pub use version::SemVersion;
