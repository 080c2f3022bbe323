//! Resolver traits for instance resolution.

use std::any::Any;
use std::sync::Arc;
use crate::error::{DiError, DiResult};
use crate::key::TypeKey;

/// Type-erased instance handed between factories and the container.
///
/// A sized type `T` is stored as `Arc<T>`; a trait object `dyn Tr` is stored
/// as `Arc<Arc<dyn Tr>>`.
pub type AnyArc = Arc<dyn Any + Send + Sync>;

/// Core resolver trait for object-safe resolution.
///
/// This is the capability a [`Factory`](crate::Factory) receives: it resolves
/// the factory's own dependencies through the same container (and the same
/// cache) the factory is being resolved from.
///
/// Most users should use the [`Resolver`] extension trait instead, which
/// provides typed generic methods on top of this one.
pub trait ResolverCore: Send + Sync {
    /// Resolves a single instance for `key`.
    ///
    /// # Returns
    ///
    /// * `Ok(AnyArc)` - The instance wrapped in `Arc<dyn Any>`
    /// * `Err(DiError)` - Resolution error (not found, circular, construction, etc.)
    fn resolve_any(&self, key: &TypeKey) -> DiResult<AnyArc>;
}

/// High-level resolver interface with generic methods for type-safe resolution.
///
/// Implemented for every [`ResolverCore`], including `dyn ResolverCore`, so
/// factory closures can call `resolver.resolve::<T>()` directly.
///
/// # Examples
///
/// ```
/// use dictor::{Container, Resolver, StaticTable};
/// use std::sync::Arc;
///
/// trait Logger: Send + Sync {
///     fn log(&self, msg: &str) -> String;
/// }
///
/// struct ConsoleLogger;
/// impl Logger for ConsoleLogger {
///     fn log(&self, msg: &str) -> String { format!("LOG: {}", msg) }
/// }
///
/// let mut table = StaticTable::new();
/// table.install_instance(42usize);
/// table.install_singleton_trait::<dyn Logger, _>(|_| Ok(Arc::new(ConsoleLogger)));
///
/// let container = Container::new(vec![Arc::new(table)]);
///
/// let number = container.resolve_required::<usize>();
/// assert_eq!(*number, 42);
///
/// let logger = container.resolve_trait::<dyn Logger>().unwrap();
/// assert_eq!(logger.log("hi"), "LOG: hi");
/// ```
pub trait Resolver: ResolverCore {
    /// Resolves a concrete type.
    ///
    /// # Examples
    ///
    /// ```
    /// use dictor::{Container, Resolver, StaticTable};
    /// use std::sync::Arc;
    ///
    /// let mut table = StaticTable::new();
    /// table.install_instance("configuration".to_string());
    ///
    /// let container = Container::new(vec![Arc::new(table)]);
    /// let config = container.resolve::<String>().unwrap();
    /// assert_eq!(&*config, "configuration");
    /// ```
    fn resolve<T: Send + Sync + 'static>(&self) -> DiResult<Arc<T>> {
        let any = self.resolve_any(&TypeKey::of::<T>())?;
        downcast_instance::<T>(any)
    }

    /// Resolves a trait object such as `dyn Logger`.
    fn resolve_trait<T: ?Sized + Send + Sync + 'static>(&self) -> DiResult<Arc<T>> {
        let any = self.resolve_any(&TypeKey::of::<T>())?;
        downcast_trait::<T>(any)
    }

    /// Resolves a concrete type, panicking on failure.
    ///
    /// # Panics
    ///
    /// Panics if the type cannot be resolved (no provider, circular
    /// dependency, construction failure, etc.).
    fn resolve_required<T: Send + Sync + 'static>(&self) -> Arc<T> {
        self.resolve::<T>()
            .unwrap_or_else(|e| panic!("Failed to resolve {}: {}", std::any::type_name::<T>(), e))
    }

    /// Resolves a trait object, panicking on failure.
    fn resolve_required_trait<T: ?Sized + Send + Sync + 'static>(&self) -> Arc<T> {
        self.resolve_trait::<T>()
            .unwrap_or_else(|e| panic!("Failed to resolve trait {}: {}", std::any::type_name::<T>(), e))
    }
}

impl<R: ResolverCore + ?Sized> Resolver for R {}

pub(crate) fn downcast_instance<T: Send + Sync + 'static>(any: AnyArc) -> DiResult<Arc<T>> {
    any.downcast::<T>()
        .map_err(|_| DiError::TypeMismatch(std::any::type_name::<T>()))
}

// Trait objects are stored as Arc<Arc<dyn Trait>>
pub(crate) fn downcast_trait<T: ?Sized + Send + Sync + 'static>(any: AnyArc) -> DiResult<Arc<T>> {
    any.downcast::<Arc<T>>()
        .map(|boxed| (*boxed).clone())
        .map_err(|_| DiError::TypeMismatch(std::any::type_name::<T>()))
}
