use crate::version::SemVersion;

/// A single forward-only migration step.
///
/// A step knows only its own identity, the version it raises the store to and
/// the SQL it runs. Ordering relative to siblings is decided by the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Migration {
    /// Stable identifier (e.g. "1.2.0_add_posts").
    pub id: String,
    /// Version the store is at once this step has been applied.
    pub version: SemVersion,
    /// SQL to execute.
    pub sql: String,
}

impl Migration {
    pub fn new(id: impl Into<String>, version: SemVersion, sql: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            version,
            sql: sql.into(),
        }
    }

    /// Stable hash of the SQL body, recorded alongside applied steps.
    pub fn checksum(&self) -> String {
        calculate_checksum(&self.sql)
    }
}

fn calculate_checksum(content: &str) -> String {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}
