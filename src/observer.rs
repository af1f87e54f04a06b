//! Diagnostic observers for resolution traceability.
//!
//! The container performs no logging of its own on the resolution path;
//! observers are the opt-in hook for structured tracing, timing collection,
//! and failure diagnostics.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::error::DiError;
use crate::key::ServiceKey;

/// Observer for service construction events.
///
/// Observers are invoked synchronously around instantiation — not on cache
/// hits — so implementations should stay lightweight.
///
/// # Examples
///
/// ```rust
/// use cinder_di::{Container, DiError, DiObserver, DiResult, ServiceKey};
/// use std::sync::{Arc, Mutex};
/// use std::time::Duration;
///
/// #[derive(Default)]
/// struct Recorder {
///     events: Mutex<Vec<String>>,
/// }
///
/// impl DiObserver for Recorder {
///     fn resolving(&self, key: &ServiceKey) {
///         self.events.lock().unwrap().push(format!("resolving {}", key));
///     }
///
///     fn resolved(&self, key: &ServiceKey, _duration: Duration) {
///         self.events.lock().unwrap().push(format!("resolved {}", key));
///     }
///
///     fn failed(&self, key: &ServiceKey, error: &DiError) {
///         self.events.lock().unwrap().push(format!("failed {}: {}", key, error));
///     }
/// }
///
/// let container = Container::new();
/// let recorder = Arc::new(Recorder::default());
/// container.add_observer(recorder.clone());
///
/// container.register_factory("answer", |_| DiResult::Ok(42u32));
/// let _ = container.get::<u32>("answer").unwrap();
///
/// let events = recorder.events.lock().unwrap();
/// assert_eq!(events.len(), 2);
/// ```
pub trait DiObserver: Send + Sync {
    /// Called before a service's construction starts.
    fn resolving(&self, key: &ServiceKey);

    /// Called after a service was successfully constructed.
    fn resolved(&self, key: &ServiceKey, duration: Duration);

    /// Called when construction fails. The error still propagates to the
    /// caller after this hook runs.
    fn failed(&self, key: &ServiceKey, error: &DiError);
}

/// Observer emitting `tracing` events for every construction.
///
/// Successful constructions log at debug level with their duration; failures
/// log at warn level with the error.
#[derive(Debug, Default)]
pub struct LoggingObserver;

impl LoggingObserver {
    /// Creates a new logging observer.
    pub fn new() -> Self {
        LoggingObserver
    }
}

impl DiObserver for LoggingObserver {
    fn resolving(&self, key: &ServiceKey) {
        tracing::trace!(service = %key, "constructing service");
    }

    fn resolved(&self, key: &ServiceKey, duration: Duration) {
        tracing::debug!(service = %key, ?duration, "service constructed");
    }

    fn failed(&self, key: &ServiceKey, error: &DiError) {
        tracing::warn!(service = %key, %error, "service construction failed");
    }
}

/// Fan-out over all registered observers.
pub(crate) struct Observers {
    list: RwLock<Vec<Arc<dyn DiObserver>>>,
}

impl Observers {
    pub(crate) fn new() -> Self {
        Observers {
            list: RwLock::new(Vec::new()),
        }
    }

    pub(crate) fn add(&self, observer: Arc<dyn DiObserver>) {
        self.list.write().unwrap().push(observer);
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.list.read().unwrap().is_empty()
    }

    // The list is cloned out before fanning out so observer callbacks can
    // resolve services (and hence re-enter this type) without holding the
    // lock.
    fn snapshot(&self) -> Vec<Arc<dyn DiObserver>> {
        self.list.read().unwrap().clone()
    }

    pub(crate) fn resolving(&self, key: &ServiceKey) {
        for observer in self.snapshot() {
            observer.resolving(key);
        }
    }

    pub(crate) fn resolved(&self, key: &ServiceKey, duration: Duration) {
        for observer in self.snapshot() {
            observer.resolved(key, duration);
        }
    }

    pub(crate) fn failed(&self, key: &ServiceKey, error: &DiError) {
        for observer in self.snapshot() {
            observer.failed(key, error);
        }
    }
}
