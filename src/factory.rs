//! Factories: producers of one instance type.
//!
//! A [`Factory`] is the unit the container caches per type. It receives the
//! resolver it is being resolved from, so it can resolve its own dependencies
//! through the same container and cache. [`Memoized`] turns any factory into a
//! singleton factory with construct-once semantics.

use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::error::DiResult;
use crate::traits::{AnyArc, ResolverCore};

/// Producer of instances for a single type.
///
/// Implementations must be `Send + Sync`; the container shares one factory per
/// type across every thread that resolves it.
pub trait Factory: Send + Sync {
    /// Produces an instance, resolving dependencies through `resolver`.
    fn produce(&self, resolver: &dyn ResolverCore) -> DiResult<AnyArc>;

    /// Whether this factory caches its first successful result.
    fn is_memoized(&self) -> bool {
        false
    }
}

type ProduceFn = dyn Fn(&dyn ResolverCore) -> DiResult<AnyArc> + Send + Sync;

/// Non-memoizing factory backed by a closure.
pub struct FnFactory {
    produce: Box<ProduceFn>,
}

impl FnFactory {
    /// Wraps an erased producer closure.
    pub fn new<F>(produce: F) -> Self
    where
        F: Fn(&dyn ResolverCore) -> DiResult<AnyArc> + Send + Sync + 'static,
    {
        Self {
            produce: Box::new(produce),
        }
    }
}

impl Factory for FnFactory {
    #[inline]
    fn produce(&self, resolver: &dyn ResolverCore) -> DiResult<AnyArc> {
        (self.produce)(resolver)
    }
}

/// Scope-singleton wrapper around a delegate factory.
///
/// The first successful call stores the delegate's result in a one-shot cell;
/// every later call returns the stored value without invoking the delegate,
/// whatever resolver it is given. A failed attempt does not fill the cell, so
/// the next call retries the delegate.
///
/// Under concurrent first access only one thread runs the delegate; the others
/// block until the value is available and observe that same value. Producing
/// from inside the cell's own delegate on the same thread never returns; the
/// [`Container`](crate::Container) rejects such re-entry with
/// [`DiError::Circular`](crate::DiError::Circular) before reaching the cell.
///
/// # Examples
///
/// ```
/// use dictor::{Container, Factory, factory_fn, memoize};
/// use std::sync::Arc;
///
/// let container = Container::new(Vec::new());
/// let factory = memoize(factory_fn::<String, _>(|_| Ok("shared".to_string())));
///
/// let a = factory.produce(&container).unwrap();
/// let b = factory.produce(&container).unwrap();
/// assert!(Arc::ptr_eq(&a, &b));
/// ```
pub struct Memoized {
    delegate: Arc<dyn Factory>,
    cell: OnceCell<AnyArc>,
}

impl Memoized {
    /// Wraps `delegate` in an empty memoization cell.
    pub fn new(delegate: Arc<dyn Factory>) -> Self {
        Self {
            delegate,
            cell: OnceCell::new(),
        }
    }

    /// Whether the value has been computed.
    pub fn is_computed(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl Factory for Memoized {
    fn produce(&self, resolver: &dyn ResolverCore) -> DiResult<AnyArc> {
        // Ultra-fast path: check if already initialized
        if let Some(value) = self.cell.get() {
            return Ok(value.clone());
        }
        self.cell
            .get_or_try_init(|| self.delegate.produce(resolver))
            .map(Clone::clone)
    }

    fn is_memoized(&self) -> bool {
        true
    }
}

/// Wraps a factory in a [`Memoized`] cell. Already-memoized factories are
/// returned unchanged.
pub fn memoize(delegate: Arc<dyn Factory>) -> Arc<dyn Factory> {
    if delegate.is_memoized() {
        delegate
    } else {
        Arc::new(Memoized::new(delegate))
    }
}

/// Builds a non-memoizing factory for a concrete type from a typed closure.
pub fn factory_fn<T, F>(produce: F) -> Arc<dyn Factory>
where
    T: Send + Sync + 'static,
    F: Fn(&dyn ResolverCore) -> DiResult<T> + Send + Sync + 'static,
{
    Arc::new(FnFactory::new(move |resolver| {
        produce(resolver).map(|value| Arc::new(value) as AnyArc)
    }))
}

/// Builds a non-memoizing factory for a trait object from a typed closure.
pub fn trait_factory_fn<T, F>(produce: F) -> Arc<dyn Factory>
where
    T: ?Sized + Send + Sync + 'static,
    F: Fn(&dyn ResolverCore) -> DiResult<Arc<T>> + Send + Sync + 'static,
{
    Arc::new(FnFactory::new(move |resolver| {
        produce(resolver).map(|value| Arc::new(value) as AnyArc)
    }))
}

/// Builds a factory that always yields the given, already constructed value.
pub fn instance_factory<T: Send + Sync + 'static>(value: T) -> Arc<dyn Factory> {
    let cell = OnceCell::with_value(Arc::new(value) as AnyArc);
    Arc::new(Memoized {
        delegate: Arc::new(FnFactory::new(|_| {
            unreachable!("pre-initialized instance factory should not be called")
        })),
        cell,
    })
}
