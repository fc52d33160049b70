use thiserror::Error;

use crate::version::SemVersion;

/// Core error type for migration operations.
#[derive(Error, Debug)]
pub enum RatchetError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQL error: {0}")]
    Sql(#[from] sqlx::Error),

    #[error("Invalid version: {0}")]
    InvalidVersion(String),

    #[error("Invalid migration range: current version {current} is newer than target {target}")]
    InvalidRange {
        current: SemVersion,
        target: SemVersion,
    },

    #[error("Duplicate migration id: {0}")]
    DuplicateMigration(String),

    #[error("Migration '{step}' failed: {message}")]
    StepExecution { step: String, message: String },

    #[error("Listener failed in {hook}: {message}")]
    Listener { hook: &'static str, message: String },

    #[error("Ledger error: {0}")]
    Ledger(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl RatchetError {
    /// Build a step failure for the given migration id.
    pub fn step(step: impl Into<String>, message: impl ToString) -> Self {
        RatchetError::StepExecution {
            step: step.into(),
            message: message.to_string(),
        }
    }
}

/// Result type alias using RatchetError.
pub type Result<T> = std::result::Result<T, RatchetError>;
