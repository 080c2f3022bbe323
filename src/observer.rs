//! Diagnostic observers for resolution traceability.
//!
//! Observers are registered on a [`ContainerBuilder`](crate::ContainerBuilder)
//! and are notified synchronously as the container resolves types. With no
//! observers registered the container skips the bookkeeping entirely.

use std::sync::Arc;
use std::time::Duration;

use crate::error::DiError;
use crate::key::TypeKey;

/// Observer trait for resolution events.
///
/// Calls happen on the resolving thread while the resolution is in progress,
/// so implementations should be cheap. Nested resolutions produce nested
/// `resolving`/`resolved` pairs.
///
/// # Examples
///
/// ```
/// use dictor::{Container, DiError, ResolutionObserver, Resolver, StaticTable, TypeKey};
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// #[derive(Default)]
/// struct Counting {
///     resolved: AtomicUsize,
/// }
///
/// impl ResolutionObserver for Counting {
///     fn resolving(&self, _key: &TypeKey) {}
///
///     fn resolved(&self, _key: &TypeKey, _duration: Duration) {
///         self.resolved.fetch_add(1, Ordering::Relaxed);
///     }
/// }
///
/// let mut table = StaticTable::new();
/// table.install(|_| Ok(7u8));
///
/// let counting = Arc::new(Counting::default());
/// let container = Container::builder()
///     .provider(table)
///     .observer(counting.clone())
///     .build();
///
/// container.resolve::<u8>().unwrap();
/// container.resolve::<u8>().unwrap();
/// assert_eq!(counting.resolved.load(Ordering::Relaxed), 2);
/// ```
pub trait ResolutionObserver: Send + Sync {
    /// Called before the container looks up or runs the factory for `key`.
    fn resolving(&self, key: &TypeKey);

    /// Called after `key` was produced successfully.
    fn resolved(&self, key: &TypeKey, duration: Duration);

    /// Called when a provider's factory for `key` is installed in the cache.
    fn factory_installed(&self, _key: &TypeKey, _provider: &'static str) {}

    /// Called when resolving `key` failed.
    fn resolution_failed(&self, _key: &TypeKey, _error: &DiError) {}
}

/// Container for registered observers.
#[derive(Default, Clone)]
pub struct Observers {
    observers: Vec<Arc<dyn ResolutionObserver>>,
}

impl Observers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, observer: Arc<dyn ResolutionObserver>) {
        self.observers.push(observer);
    }

    /// Returns true if any observers are registered.
    #[inline]
    pub fn has_observers(&self) -> bool {
        !self.observers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl ResolutionObserver for Observers {
    #[inline]
    fn resolving(&self, key: &TypeKey) {
        for observer in &self.observers {
            observer.resolving(key);
        }
    }

    #[inline]
    fn resolved(&self, key: &TypeKey, duration: Duration) {
        for observer in &self.observers {
            observer.resolved(key, duration);
        }
    }

    #[inline]
    fn factory_installed(&self, key: &TypeKey, provider: &'static str) {
        for observer in &self.observers {
            observer.factory_installed(key, provider);
        }
    }

    #[inline]
    fn resolution_failed(&self, key: &TypeKey, error: &DiError) {
        for observer in &self.observers {
            observer.resolution_failed(key, error);
        }
    }
}

/// Built-in observer that forwards events to `tracing`.
///
/// # Examples
///
/// ```
/// use dictor::{Container, LoggingObserver};
/// use std::sync::Arc;
///
/// let container = Container::builder()
///     .observer(Arc::new(LoggingObserver::with_prefix("app")))
///     .build();
/// # let _ = container;
/// ```
pub struct LoggingObserver {
    prefix: String,
}

impl LoggingObserver {
    /// Creates a new logging observer with default prefix.
    pub fn new() -> Self {
        Self {
            prefix: "dictor".to_string(),
        }
    }

    /// Creates a new logging observer with a custom prefix.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl Default for LoggingObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl ResolutionObserver for LoggingObserver {
    fn resolving(&self, key: &TypeKey) {
        tracing::trace!(prefix = %self.prefix, ty = key.name(), "resolving");
    }

    fn resolved(&self, key: &TypeKey, duration: Duration) {
        tracing::debug!(prefix = %self.prefix, ty = key.name(), ?duration, "resolved");
    }

    fn factory_installed(&self, key: &TypeKey, provider: &'static str) {
        tracing::debug!(prefix = %self.prefix, ty = key.name(), provider, "factory installed");
    }

    fn resolution_failed(&self, key: &TypeKey, error: &DiError) {
        tracing::warn!(prefix = %self.prefix, ty = key.name(), %error, "resolution failed");
    }
}
