//! Run-time factory synthesis from a [`TypeInspector`].

use std::sync::Arc;

use super::{resolve_arguments, ArgumentSource, Provider};
use crate::error::DiResult;
use crate::factory::{memoize, Factory};
use crate::inspector::{InjectConstructor, Redirect, TypeInspector};
use crate::key::TypeKey;
use crate::traits::{AnyArc, ResolverCore};

/// Factory that resolves a constructor's declared dependencies through the
/// resolver it is given and then invokes the constructor.
pub struct ReflectiveFactory {
    constructor: Arc<InjectConstructor>,
    arguments: Vec<ArgumentSource>,
}

impl ReflectiveFactory {
    pub fn new(constructor: Arc<InjectConstructor>) -> Self {
        let arguments = constructor
            .dependencies()
            .iter()
            .copied()
            .map(ArgumentSource::Direct)
            .collect();
        Self {
            constructor,
            arguments,
        }
    }

    pub(crate) fn with_arguments(constructor: Arc<InjectConstructor>, arguments: Vec<ArgumentSource>) -> Self {
        Self {
            constructor,
            arguments,
        }
    }

    pub fn constructor(&self) -> &InjectConstructor {
        &self.constructor
    }
}

impl Factory for ReflectiveFactory {
    fn produce(&self, resolver: &dyn ResolverCore) -> DiResult<AnyArc> {
        let args = resolve_arguments(resolver, &self.arguments)?;
        self.constructor.invoke(args)
    }
}

/// Factory for a redirect key: resolves the provided type and coerces it to
/// the requested one.
pub struct RedirectFactory {
    redirect: Arc<Redirect>,
}

impl RedirectFactory {
    pub fn new(redirect: Arc<Redirect>) -> Self {
        Self { redirect }
    }
}

impl Factory for RedirectFactory {
    fn produce(&self, resolver: &dyn ResolverCore) -> DiResult<AnyArc> {
        let provided = resolver.resolve_any(&self.redirect.provided())?;
        self.redirect.coerce(provided)
    }
}

/// Provider that asks a [`TypeInspector`] how to build each requested type.
///
/// Constructor-shape errors are propagated, including for types the
/// inspector has never seen, so this provider is normally last in a chain.
/// Every lookup yields a new factory; singleton state lives in whichever
/// container caches it.
///
/// # Examples
///
/// ```
/// use dictor::{injectable, Container, ReflectiveLookup, Resolver, TypeRegistry};
/// use std::sync::Arc;
///
/// pub struct Engine;
/// pub struct Auto { engine: Arc<Engine> }
/// injectable!(singleton Engine {});
/// injectable!(transient Auto { engine: Engine });
///
/// let mut registry = TypeRegistry::new();
/// registry.register::<Engine>().register::<Auto>();
///
/// let container = Container::new(vec![Arc::new(ReflectiveLookup::new(registry))]);
/// let a = container.resolve::<Auto>().unwrap();
/// let b = container.resolve::<Auto>().unwrap();
/// assert!(!Arc::ptr_eq(&a, &b));
/// assert!(Arc::ptr_eq(&a.engine, &b.engine));
/// ```
pub struct ReflectiveLookup {
    inspector: Arc<dyn TypeInspector>,
}

impl ReflectiveLookup {
    pub fn new<I: TypeInspector + 'static>(inspector: I) -> Self {
        Self {
            inspector: Arc::new(inspector),
        }
    }

    /// Shares an inspector already behind an `Arc`, e.g. with a
    /// [`GraphBuilder`](crate::GraphBuilder).
    pub fn from_shared(inspector: Arc<dyn TypeInspector>) -> Self {
        Self { inspector }
    }

    pub fn inspector(&self) -> &dyn TypeInspector {
        self.inspector.as_ref()
    }
}

impl Provider for ReflectiveLookup {
    fn lookup(&self, key: &TypeKey) -> DiResult<Option<Arc<dyn Factory>>> {
        if let Some(redirect) = self.inspector.redirect(key) {
            return Ok(Some(Arc::new(RedirectFactory::new(redirect))));
        }

        let constructor = self.inspector.inspect(key)?;
        let singleton = constructor.is_singleton();
        let factory: Arc<dyn Factory> = Arc::new(ReflectiveFactory::new(constructor));
        Ok(Some(if singleton { memoize(factory) } else { factory }))
    }

    fn name(&self) -> &'static str {
        "reflective"
    }
}
