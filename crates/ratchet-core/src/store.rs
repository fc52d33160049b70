use std::future::Future;

use crate::error::Result;
use crate::migration::Migration;

/// Anything a migration step can be applied to.
///
/// Implementations decide how the step's SQL is executed (statement splitting,
/// transactions). Failure is reported as an error; success carries no value.
pub trait MigrationStore: Send + Sync {
    /// Apply one step.
    fn apply(&self, migration: &Migration) -> impl Future<Output = Result<()>> + Send;
}
