//! Observers notified around each applied migration step.
//!
//! Listeners are registered once at startup and live for the whole process.
//! Each one may restrict itself to a set of product names; an empty set means
//! the listener wants every run.

use serde::{Deserialize, Serialize};

use crate::context::{normalize_product_name, MigrationEvent};
use crate::error::Result;

/// Hooks invoked by the runner around each step.
///
/// Every method has a default, so implementors only override what they need.
pub trait MigrationListener: Send + Sync {
    /// Name used in logs when a hook fails.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Products this listener is interested in. Empty means all of them.
    fn target_product_names(&self) -> &[String] {
        &[]
    }

    /// Called before a step is applied.
    fn before_migration(&self, _event: &MigrationEvent<'_>) -> Result<()> {
        Ok(())
    }

    /// Called after a step has been applied successfully.
    fn after_migration(&self, _event: &MigrationEvent<'_>) -> Result<()> {
        Ok(())
    }
}

/// Whether a listener with the given targets should hear about a run.
///
/// Matching is exact and case-sensitive. A run without a product name only
/// reaches listeners that have no targets.
pub fn listener_matches(targets: &[String], product_name: Option<&str>) -> bool {
    if targets.is_empty() {
        return true;
    }
    match normalize_product_name(product_name) {
        Some(name) => targets.iter().any(|t| t == name),
        None => false,
    }
}

/// What the runner does when a listener hook returns an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListenerErrorPolicy {
    /// Log the failure and keep going.
    #[default]
    Isolate,
    /// Stop the run and report the failure as its first error.
    Propagate,
}

type Hook = Box<dyn Fn(&MigrationEvent<'_>) -> Result<()> + Send + Sync>;

/// Listener assembled from optional closures.
///
/// # Example
///
/// ```ignore
/// let listener = CallbackListener::new("cache-flush")
///     .for_product("cms")
///     .on_after(|event| {
///         flush_cache(event.migration.version);
///         Ok(())
///     });
/// bus.register(Arc::new(listener));
/// ```
pub struct CallbackListener {
    name: String,
    targets: Vec<String>,
    before: Option<Hook>,
    after: Option<Hook>,
}

impl CallbackListener {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            targets: Vec::new(),
            before: None,
            after: None,
        }
    }

    /// Restrict the listener to a product. May be called more than once.
    pub fn for_product(mut self, product_name: impl Into<String>) -> Self {
        let product_name = product_name.into();
        if !product_name.trim().is_empty() && !self.targets.contains(&product_name) {
            self.targets.push(product_name);
        }
        self
    }

    pub fn on_before<F>(mut self, f: F) -> Self
    where
        F: Fn(&MigrationEvent<'_>) -> Result<()> + Send + Sync + 'static,
    {
        self.before = Some(Box::new(f));
        self
    }

    pub fn on_after<F>(mut self, f: F) -> Self
    where
        F: Fn(&MigrationEvent<'_>) -> Result<()> + Send + Sync + 'static,
    {
        self.after = Some(Box::new(f));
        self
    }
}

impl MigrationListener for CallbackListener {
    fn name(&self) -> &str {
        &self.name
    }

    fn target_product_names(&self) -> &[String] {
        &self.targets
    }

    fn before_migration(&self, event: &MigrationEvent<'_>) -> Result<()> {
        match &self.before {
            Some(hook) => hook(event),
            None => Ok(()),
        }
    }

    fn after_migration(&self, event: &MigrationEvent<'_>) -> Result<()> {
        match &self.after {
            Some(hook) => hook(event),
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for CallbackListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackListener")
            .field("name", &self.name)
            .field("targets", &self.targets)
            .field("before", &self.before.is_some())
            .field("after", &self.after.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::context::RunContext;
    use crate::migration::Migration;
    use crate::version::SemVersion;

    fn targets(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_wildcard_matches_everything() {
        assert!(listener_matches(&[], Some("Test1")));
        assert!(listener_matches(&[], Some("")));
        assert!(listener_matches(&[], None));
    }

    #[test]
    fn test_targeted_listener_requires_exact_name() {
        let t = targets(&["Test1", "Other"]);
        assert!(listener_matches(&t, Some("Test1")));
        assert!(listener_matches(&t, Some("Other")));
        assert!(!listener_matches(&t, Some("Test2")));
        assert!(!listener_matches(&t, Some("test1")));
    }

    #[test]
    fn test_targeted_listener_ignores_unscoped_run() {
        let t = targets(&["Test1"]);
        assert!(!listener_matches(&t, None));
        assert!(!listener_matches(&t, Some("")));
        assert!(!listener_matches(&t, Some("   ")));
    }

    #[test]
    fn test_callback_listener_hooks() {
        let before = Arc::new(AtomicUsize::new(0));
        let after = Arc::new(AtomicUsize::new(0));
        let b = before.clone();
        let a = after.clone();

        let listener = CallbackListener::new("counter")
            .for_product("Test1")
            .for_product("Test1")
            .for_product("")
            .on_before(move |_| {
                b.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .on_after(move |_| {
                a.fetch_add(1, Ordering::SeqCst);
                Ok(())
            });

        assert_eq!(listener.name(), "counter");
        assert_eq!(listener.target_product_names(), &["Test1".to_string()]);

        let ctx = RunContext::new(SemVersion::major(1), SemVersion::major(2), Some("Test1"), vec![]);
        let migration = Migration::new("m", SemVersion::major(2), "");
        let event = MigrationEvent {
            run: &ctx,
            migration: &migration,
            position: 0,
        };

        listener.before_migration(&event).unwrap();
        listener.after_migration(&event).unwrap();
        listener.after_migration(&event).unwrap();

        assert_eq!(before.load(Ordering::SeqCst), 1);
        assert_eq!(after.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_default_hooks_are_noops() {
        struct Quiet;
        impl MigrationListener for Quiet {}

        let ctx = RunContext::new(SemVersion::ZERO, SemVersion::major(1), None, vec![]);
        let migration = Migration::new("m", SemVersion::major(1), "");
        let event = MigrationEvent {
            run: &ctx,
            migration: &migration,
            position: 0,
        };

        assert!(Quiet.target_product_names().is_empty());
        assert!(Quiet.before_migration(&event).is_ok());
        assert!(Quiet.after_migration(&event).is_ok());
        assert!(Quiet.name().ends_with("Quiet"));
    }

    #[test]
    fn test_policy_parses_lowercase() {
        #[derive(Deserialize)]
        struct Wrapper {
            policy: ListenerErrorPolicy,
        }
        let w: Wrapper = toml::from_str(r#"policy = "propagate""#).unwrap();
        assert_eq!(w.policy, ListenerErrorPolicy::Propagate);
        assert_eq!(ListenerErrorPolicy::default(), ListenerErrorPolicy::Isolate);
    }
}
