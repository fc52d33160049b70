//! Listener registry and hook dispatch.

use std::sync::{Arc, RwLock};

use ratchet_core::error::Result;
use ratchet_core::{listener_matches, ListenerErrorPolicy, MigrationEvent, MigrationListener};
use tracing::warn;

/// Which listener hook is being dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hook {
    Before,
    After,
}

impl Hook {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Before => "before_migration",
            Self::After => "after_migration",
        }
    }
}

/// Process-wide set of migration listeners.
///
/// Listeners are expected to be registered during startup, before any run.
/// Runs take a snapshot of the matching listeners when they start, so a
/// registration racing with a run does not affect that run.
#[derive(Default)]
pub struct MigrationEventBus {
    listeners: RwLock<Vec<Arc<dyn MigrationListener>>>,
}

impl MigrationEventBus {
    /// Create a new empty bus.
    pub fn new() -> Self {
        Self {
            listeners: RwLock::new(Vec::new()),
        }
    }

    /// Register a listener. Listeners are notified in registration order.
    pub fn register(&self, listener: Arc<dyn MigrationListener>) {
        self.listeners
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(listener);
    }

    /// Listeners that should hear about a run for `product_name`.
    pub fn listeners_for(&self, product_name: Option<&str>) -> Vec<Arc<dyn MigrationListener>> {
        self.listeners
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|l| listener_matches(l.target_product_names(), product_name))
            .cloned()
            .collect()
    }

    /// Get the number of registered listeners.
    pub fn len(&self) -> usize {
        self.listeners.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Check if no listeners are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for MigrationEventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MigrationEventBus")
            .field("listeners", &self.len())
            .finish()
    }
}

/// Invoke `hook` on every listener in order.
///
/// Under [`ListenerErrorPolicy::Isolate`] failures are logged and the
/// remaining listeners still run. Under `Propagate` the first failure is
/// returned and later listeners are skipped.
pub fn notify(
    listeners: &[Arc<dyn MigrationListener>],
    hook: Hook,
    event: &MigrationEvent<'_>,
    policy: ListenerErrorPolicy,
) -> Result<()> {
    for listener in listeners {
        let outcome = match hook {
            Hook::Before => listener.before_migration(event),
            Hook::After => listener.after_migration(event),
        };

        if let Err(e) = outcome {
            match policy {
                ListenerErrorPolicy::Isolate => {
                    warn!(
                        "Listener '{}' failed in {} for migration {}: {}",
                        listener.name(),
                        hook.as_str(),
                        event.migration.id,
                        e
                    );
                }
                ListenerErrorPolicy::Propagate => return Err(e),
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratchet_core::testing::CountingListener;
    use ratchet_core::{Migration, RunContext, SemVersion};

    fn with_event<F: FnOnce(&MigrationEvent<'_>)>(product: Option<&str>, f: F) {
        let ctx = RunContext::new(
            SemVersion::major(1),
            SemVersion::major(2),
            product,
            vec!["m".into()],
        );
        let migration = Migration::new("m", SemVersion::major(2), "SELECT 1");
        let event = MigrationEvent {
            run: &ctx,
            migration: &migration,
            position: 0,
        };
        f(&event);
    }

    #[test]
    fn test_empty_bus() {
        let bus = MigrationEventBus::new();
        assert!(bus.is_empty());
        assert!(bus.listeners_for(Some("Test1")).is_empty());
    }

    #[test]
    fn test_listeners_for_filters_by_product() {
        let bus = MigrationEventBus::new();
        bus.register(Arc::new(CountingListener::new()));
        bus.register(Arc::new(CountingListener::for_product("Test1")));
        bus.register(Arc::new(CountingListener::for_product("Test2")));

        assert_eq!(bus.len(), 3);
        assert_eq!(bus.listeners_for(Some("Test1")).len(), 2);
        assert_eq!(bus.listeners_for(Some("Test2")).len(), 2);
        assert_eq!(bus.listeners_for(Some("Other")).len(), 1);
        assert_eq!(bus.listeners_for(None).len(), 1);
    }

    #[test]
    fn test_notify_isolates_failures() {
        let failing = Arc::new(CountingListener::new().failing_before());
        let healthy = Arc::new(CountingListener::new());
        let listeners: Vec<Arc<dyn MigrationListener>> = vec![failing.clone(), healthy.clone()];

        with_event(None, |event| {
            let result = notify(&listeners, Hook::Before, event, ListenerErrorPolicy::Isolate);
            assert!(result.is_ok());
        });

        assert_eq!(failing.before_count(), 1);
        assert_eq!(healthy.before_count(), 1);
    }

    #[test]
    fn test_notify_propagates_first_failure() {
        let failing = Arc::new(CountingListener::new().failing_before());
        let healthy = Arc::new(CountingListener::new());
        let listeners: Vec<Arc<dyn MigrationListener>> = vec![failing.clone(), healthy.clone()];

        with_event(Some("cms"), |event| {
            let result = notify(&listeners, Hook::Before, event, ListenerErrorPolicy::Propagate);
            assert!(result.is_err());
        });

        assert_eq!(failing.before_count(), 1);
        assert_eq!(healthy.before_count(), 0);
    }

    #[test]
    fn test_notify_after_hook() {
        let listener = Arc::new(CountingListener::new());
        let listeners: Vec<Arc<dyn MigrationListener>> = vec![listener.clone()];

        with_event(None, |event| {
            notify(&listeners, Hook::After, event, ListenerErrorPolicy::Isolate).unwrap();
        });

        assert_eq!(listener.before_count(), 0);
        assert_eq!(listener.after_count(), 1);
        assert_eq!(listener.log(), vec!["after:m"]);
    }
}
