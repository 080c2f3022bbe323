//! The resolving container.
//!
//! A [`Container`] owns an ordered chain of [`Provider`]s and a cache of the
//! factory chosen for each type. It is the [`ResolverCore`] handed to every
//! factory it runs, so nested resolutions go through the same chain and the
//! same cache. That is what makes a singleton one instance across the whole
//! object graph: every dependent gets the same cached factory, and that
//! factory's memoization cell holds the single value.

use std::collections::hash_map::Entry;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::RwLock;

use crate::config::ContainerOptions;
use crate::error::{DiError, DiResult};
use crate::factory::Factory;
use crate::internal::{ResolutionGuard, TypeMap};
use crate::key::TypeKey;
use crate::observer::{Observers, ResolutionObserver};
use crate::provider::Provider;
use crate::traits::{AnyArc, ResolverCore};

mod builder;

pub use builder::ContainerBuilder;

/// Dependency resolver over a provider chain.
///
/// Cloning is cheap and yields a handle to the same container (same cache,
/// same singletons).
///
/// # Thread Safety
///
/// `Container` is `Send + Sync`. The factory cache is installed
/// first-writer-wins: threads racing on a cache miss may each consult the
/// providers, but all of them use the factory that was installed first. No
/// lock is held while a factory runs.
///
/// A singleton cycle entered from two threads at once deadlocks on the
/// memoization cells; validate cyclic graphs with
/// [`GraphBuilder`](crate::GraphBuilder) first.
///
/// # Examples
///
/// ```
/// use dictor::{Container, Resolver, StaticTable};
/// use std::sync::Arc;
///
/// struct Config { port: u16 }
/// struct Server { config: Arc<Config> }
///
/// let mut table = StaticTable::new();
/// table.install_singleton(|_| Ok(Config { port: 8080 }));
/// table.install(|r| Ok(Server { config: r.resolve::<Config>()? }));
///
/// let container = Container::new(vec![Arc::new(table)]);
/// let server = container.resolve::<Server>().unwrap();
/// assert_eq!(server.config.port, 8080);
/// assert_eq!(container.installed_count(), 2);
/// ```
#[derive(Clone)]
pub struct Container {
    inner: Arc<ContainerInner>,
}

struct ContainerInner {
    providers: Vec<Arc<dyn Provider>>,
    cache: RwLock<TypeMap<Arc<dyn Factory>>>,
    observers: Observers,
    options: ContainerOptions,
}

impl Container {
    /// Creates a container over `providers`, consulted in order, with default
    /// options and no observers.
    pub fn new(providers: Vec<Arc<dyn Provider>>) -> Self {
        Self::with_parts(providers, Observers::new(), ContainerOptions::default())
    }

    pub fn builder() -> ContainerBuilder {
        ContainerBuilder::new()
    }

    pub(crate) fn with_parts(
        providers: Vec<Arc<dyn Provider>>,
        observers: Observers,
        options: ContainerOptions,
    ) -> Self {
        tracing::debug!(
            providers = providers.len(),
            observers = observers.len(),
            max_depth = options.max_depth,
            detect_cycles = options.detect_cycles,
            "container created"
        );
        Self {
            inner: Arc::new(ContainerInner {
                providers,
                cache: RwLock::new(TypeMap::default()),
                observers,
                options,
            }),
        }
    }

    /// Whether a factory for `key` has been installed in the cache.
    pub fn is_installed(&self, key: &TypeKey) -> bool {
        self.inner.cache.read().contains_key(key)
    }

    /// Number of types with an installed factory.
    pub fn installed_count(&self) -> usize {
        self.inner.cache.read().len()
    }

    pub fn provider_count(&self) -> usize {
        self.inner.providers.len()
    }

    /// Provider names, in chain order.
    pub fn provider_names(&self) -> Vec<&'static str> {
        self.inner.providers.iter().map(|p| p.name()).collect()
    }

    pub fn options(&self) -> &ContainerOptions {
        &self.inner.options
    }

    #[cfg(feature = "diagnostics")]
    pub fn to_debug_string(&self) -> String {
        let mut s = String::new();
        s.push_str("=== Container Debug ===\n");
        s.push_str("Providers:\n");
        for (i, provider) in self.inner.providers.iter().enumerate() {
            s.push_str(&format!("  {}: {}\n", i, provider.name()));
        }
        s.push_str("Installed:\n");
        let cache = self.inner.cache.read();
        let mut keys: Vec<_> = cache.iter().collect();
        keys.sort_by_key(|(k, _)| **k);
        for (key, factory) in keys {
            let scope = if factory.is_memoized() { "memoized" } else { "per-call" };
            s.push_str(&format!("  {}: {}\n", key, scope));
        }
        s
    }

    // Identity used to tag frames of the thread-local resolution stack
    #[inline]
    fn id(&self) -> usize {
        Arc::as_ptr(&self.inner) as *const () as usize
    }

    fn resolve_any_impl(&self, key: &TypeKey) -> DiResult<AnyArc> {
        let options = &self.inner.options;
        let factory = self.factory_for(key)?;

        // Re-entering a memoization cell on the same thread never returns,
        // so memoized factories are always checked for re-entry.
        let detect_cycles = options.detect_cycles || factory.is_memoized();
        let _guard = ResolutionGuard::enter(self.id(), *key, options.max_depth, detect_cycles)?;

        factory.produce(self)
    }

    /// Cached factory for `key`, consulting the providers on a miss.
    fn factory_for(&self, key: &TypeKey) -> DiResult<Arc<dyn Factory>> {
        let cached = self.inner.cache.read().get(key).cloned();
        if let Some(factory) = cached {
            return Ok(factory);
        }

        let (provider, candidate) = self.lookup(key)?;

        let (factory, installed) = match self.inner.cache.write().entry(*key) {
            Entry::Occupied(entry) => (entry.get().clone(), false),
            Entry::Vacant(entry) => (entry.insert(candidate).clone(), true),
        };

        if installed {
            tracing::debug!(ty = key.name(), provider, "factory installed");
            if self.inner.observers.has_observers() {
                self.inner.observers.factory_installed(key, provider);
            }
        } else {
            tracing::trace!(ty = key.name(), provider, "lost factory install race");
        }
        Ok(factory)
    }

    /// First factory offered by the provider chain.
    fn lookup(&self, key: &TypeKey) -> DiResult<(&'static str, Arc<dyn Factory>)> {
        for provider in &self.inner.providers {
            if let Some(factory) = provider.lookup(key)? {
                return Ok((provider.name(), factory));
            }
        }
        tracing::debug!(
            ty = key.name(),
            providers = self.inner.providers.len(),
            "no provider found"
        );
        Err(DiError::NotFound(key.name()))
    }
}

impl ResolverCore for Container {
    fn resolve_any(&self, key: &TypeKey) -> DiResult<AnyArc> {
        if !self.inner.observers.has_observers() {
            return self.resolve_any_impl(key);
        }

        let start = Instant::now();
        self.inner.observers.resolving(key);
        let result = self.resolve_any_impl(key);
        match &result {
            Ok(_) => self.inner.observers.resolved(key, start.elapsed()),
            Err(error) => self.inner.observers.resolution_failed(key, error),
        }
        result
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("providers", &self.provider_names())
            .field("installed", &self.installed_count())
            .field("options", &self.inner.options)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::factory_fn;
    use crate::key::key_of;
    use crate::provider::StaticTable;
    use crate::traits::Resolver;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Failing;

    impl Provider for Failing {
        fn lookup(&self, key: &TypeKey) -> DiResult<Option<Arc<dyn Factory>>> {
            Err(DiError::NoEligibleConstructor(key.name()))
        }
    }

    struct Counting {
        lookups: AtomicUsize,
    }

    impl Provider for Counting {
        fn lookup(&self, _key: &TypeKey) -> DiResult<Option<Arc<dyn Factory>>> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            Ok(Some(factory_fn::<u32, _>(|_| Ok(5))))
        }
    }

    #[test]
    fn test_providers_consulted_once_per_type() {
        let counting = Arc::new(Counting {
            lookups: AtomicUsize::new(0),
        });
        let container = Container::new(vec![counting.clone()]);

        for _ in 0..3 {
            assert_eq!(*container.resolve::<u32>().unwrap(), 5);
        }
        assert_eq!(counting.lookups.load(Ordering::SeqCst), 1);
        assert!(container.is_installed(&key_of::<u32>()));
    }

    #[test]
    fn test_provider_error_aborts_chain() {
        let mut table = StaticTable::new();
        table.install(|_| Ok(1u8));
        let container = Container::new(vec![Arc::new(Failing), Arc::new(table)]);

        let err = container.resolve::<u8>().unwrap_err();
        assert_eq!(err, DiError::NoEligibleConstructor("u8"));
        assert!(!container.is_installed(&key_of::<u8>()));
    }

    #[test]
    fn test_not_found_is_not_cached() {
        let container = Container::new(vec![Arc::new(StaticTable::new())]);
        assert_eq!(container.resolve::<u8>().unwrap_err(), DiError::NotFound("u8"));
        assert_eq!(container.installed_count(), 0);
    }

    #[test]
    fn test_clones_share_the_cache() {
        let mut table = StaticTable::new();
        table.install_singleton(|_| Ok(String::from("one")));
        let container = Container::new(vec![Arc::new(table)]);
        let handle = container.clone();

        let a = container.resolve::<String>().unwrap();
        let b = handle.resolve::<String>().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(handle.installed_count(), 1);
    }

    #[test]
    fn test_depth_limit() {
        struct Level<const N: usize>;

        let mut table = StaticTable::new();
        table.install(|r| r.resolve::<Level<1>>().map(|_| Level::<0>));
        table.install(|r| r.resolve::<Level<2>>().map(|_| Level::<1>));
        table.install(|_| Ok(Level::<2>));

        let shallow = Container::builder()
            .provider(table)
            .options(ContainerOptions::default().with_max_depth(2))
            .build();
        assert_eq!(
            shallow.resolve::<Level<0>>().err().unwrap(),
            DiError::DepthExceeded(2)
        );
        assert!(shallow.resolve::<Level<1>>().is_ok());
    }
}
