use serde::{Deserialize, Serialize};

use crate::listener::ListenerErrorPolicy;
use crate::version::SemVersion;

/// Migration run configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationsConfig {
    /// Directory holding `<version>_<name>.sql` files.
    #[serde(default = "default_dir")]
    pub dir: String,

    /// Product the run is performed for. Unset means no product.
    #[serde(default)]
    pub product_name: Option<String>,

    /// Version the store is currently at.
    #[serde(default)]
    pub current_version: SemVersion,

    /// Version to migrate to. Unset means the highest known step.
    #[serde(default)]
    pub target_version: Option<SemVersion>,

    /// Handling of failing listener hooks.
    #[serde(default)]
    pub listener_policy: ListenerErrorPolicy,
}

impl Default for MigrationsConfig {
    fn default() -> Self {
        Self {
            dir: default_dir(),
            product_name: None,
            current_version: SemVersion::ZERO,
            target_version: None,
            listener_policy: ListenerErrorPolicy::default(),
        }
    }
}

fn default_dir() -> String {
    "migrations".to_string()
}
