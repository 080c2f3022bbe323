//! Constructor discovery.
//!
//! A [`TypeInspector`] answers "how is this type constructed?": the ordered
//! dependency list of its single injectable constructor and whether it is
//! singleton-scoped. The graph builder walks those answers ahead of time; the
//! reflective provider turns them into factories at run time.
//!
//! [`TypeRegistry`] is the inspector shipped with the crate. Types describe
//! their constructor by implementing [`Injectable`] (by hand or through the
//! [`injectable!`](crate::injectable) macro) and are registered once.
//! Registering two constructors for one type makes the type ambiguous, which
//! the registry reports the same way as a missing constructor: as a
//! constructor-shape error on inspection.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{DiError, DiResult};
use crate::graph::RedirectMap;
use crate::key::TypeKey;
use crate::lifetime::Lifetime;
use crate::traits::{downcast_instance, downcast_trait, AnyArc};

/// A type that can be built by the container from its dependencies.
///
/// # Examples
///
/// ```
/// use dictor::{key_of, Arguments, DiResult, Injectable, Lifetime, TypeKey};
/// use std::sync::Arc;
///
/// struct Engine;
/// struct Auto { engine: Arc<Engine> }
///
/// impl Injectable for Auto {
///     fn dependencies() -> Vec<TypeKey> {
///         vec![key_of::<Engine>()]
///     }
///
///     fn construct(args: &mut Arguments) -> DiResult<Self> {
///         Ok(Auto { engine: args.next::<Engine>()? })
///     }
/// }
///
/// assert_eq!(Auto::lifetime(), Lifetime::Transient);
/// ```
pub trait Injectable: Send + Sync + Sized + 'static {
    /// Scope of the constructed instances.
    fn lifetime() -> Lifetime {
        Lifetime::Transient
    }

    /// Constructor parameter types, in order.
    fn dependencies() -> Vec<TypeKey>;

    /// Builds an instance from resolved dependencies, consumed in the order
    /// declared by [`dependencies`](Injectable::dependencies).
    fn construct(args: &mut Arguments) -> DiResult<Self>;
}

type BuildFn = dyn Fn(&mut Arguments) -> DiResult<AnyArc> + Send + Sync;

/// An injectable constructor: its dependencies, scope, and invocation.
pub struct InjectConstructor {
    ty: TypeKey,
    dependencies: Vec<TypeKey>,
    lifetime: Lifetime,
    build: Box<BuildFn>,
}

impl InjectConstructor {
    /// Describes a constructor with an erased build function.
    ///
    /// `build` receives the resolved dependencies in `dependencies` order and
    /// must return an instance stored the way the crate stores `ty` (see
    /// [`AnyArc`]).
    pub fn new<F>(ty: TypeKey, dependencies: Vec<TypeKey>, lifetime: Lifetime, build: F) -> Self
    where
        F: Fn(&mut Arguments) -> DiResult<AnyArc> + Send + Sync + 'static,
    {
        Self {
            ty,
            dependencies,
            lifetime,
            build: Box::new(build),
        }
    }

    /// Describes the constructor of an [`Injectable`] type.
    pub fn of<T: Injectable>() -> Self {
        Self::new(TypeKey::of::<T>(), T::dependencies(), T::lifetime(), |args| {
            T::construct(args).map(|value| Arc::new(value) as AnyArc)
        })
    }

    /// Constructed type.
    pub fn ty(&self) -> TypeKey {
        self.ty
    }

    /// Parameter types, in order.
    pub fn dependencies(&self) -> &[TypeKey] {
        &self.dependencies
    }

    /// Scope of the constructed instances.
    pub fn lifetime(&self) -> Lifetime {
        self.lifetime
    }

    pub fn is_singleton(&self) -> bool {
        self.lifetime.is_singleton()
    }

    /// Invokes the constructor with already resolved dependencies.
    pub fn invoke(&self, mut args: Arguments) -> DiResult<AnyArc> {
        (self.build)(&mut args)
    }
}

impl fmt::Debug for InjectConstructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InjectConstructor")
            .field("ty", &self.ty)
            .field("dependencies", &self.dependencies)
            .field("lifetime", &self.lifetime)
            .finish()
    }
}

/// Resolved constructor arguments, consumed front to back.
pub struct Arguments {
    values: std::vec::IntoIter<(TypeKey, AnyArc)>,
}

impl Arguments {
    /// Wraps resolved `(declared type, instance)` pairs.
    pub fn new(values: Vec<(TypeKey, AnyArc)>) -> Self {
        Self {
            values: values.into_iter(),
        }
    }

    /// Takes the next argument as a concrete type.
    pub fn next<T: Send + Sync + 'static>(&mut self) -> DiResult<Arc<T>> {
        let value = self.take::<T>()?;
        downcast_instance::<T>(value)
    }

    /// Takes the next argument as a trait object.
    pub fn next_trait<T: ?Sized + Send + Sync + 'static>(&mut self) -> DiResult<Arc<T>> {
        let value = self.take::<T>()?;
        downcast_trait::<T>(value)
    }

    /// Takes the next argument without downcasting it.
    pub fn next_any(&mut self) -> Option<(TypeKey, AnyArc)> {
        self.values.next()
    }

    /// Number of arguments not yet consumed.
    pub fn remaining(&self) -> usize {
        self.values.len()
    }

    fn take<T: ?Sized + 'static>(&mut self) -> DiResult<AnyArc> {
        let expected = TypeKey::of::<T>();
        match self.values.next() {
            Some((declared, value)) if declared == expected => Ok(value),
            _ => Err(DiError::TypeMismatch(expected.name())),
        }
    }
}

type Coercion = dyn Fn(AnyArc) -> DiResult<AnyArc> + Send + Sync;

/// Runtime half of a redirect: how to turn the provided instance into the
/// requested one.
pub struct Redirect {
    requested: TypeKey,
    provided: TypeKey,
    coerce: Box<Coercion>,
}

impl Redirect {
    /// Builds a redirect with an erased coercion.
    pub fn new<F>(requested: TypeKey, provided: TypeKey, coerce: F) -> Self
    where
        F: Fn(AnyArc) -> DiResult<AnyArc> + Send + Sync + 'static,
    {
        Self {
            requested,
            provided,
            coerce: Box::new(coerce),
        }
    }

    /// Redirect from the trait object `I` to the concrete type `C`.
    ///
    /// `cast` is normally an unsizing coercion: `|c| c`.
    pub fn to_trait<I, C>(cast: fn(Arc<C>) -> Arc<I>) -> Self
    where
        I: ?Sized + Send + Sync + 'static,
        C: Send + Sync + 'static,
    {
        Self::new(TypeKey::of::<I>(), TypeKey::of::<C>(), move |value| {
            let concrete = downcast_instance::<C>(value)?;
            Ok(Arc::new(cast(concrete)) as AnyArc)
        })
    }

    pub fn requested(&self) -> TypeKey {
        self.requested
    }

    pub fn provided(&self) -> TypeKey {
        self.provided
    }

    /// Converts an instance of the provided type into the requested type.
    pub fn coerce(&self, provided: AnyArc) -> DiResult<AnyArc> {
        (self.coerce)(provided)
    }
}

impl fmt::Debug for Redirect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Redirect({} -> {})", self.requested, self.provided)
    }
}

/// Constructor discovery capability consumed by the graph builder and the
/// reflective provider.
pub trait TypeInspector: Send + Sync {
    /// Returns the single injectable constructor of `key`.
    ///
    /// Fails with [`DiError::NoEligibleConstructor`] or
    /// [`DiError::MultipleEligibleConstructors`].
    fn inspect(&self, key: &TypeKey) -> DiResult<Arc<InjectConstructor>>;

    /// Returns the redirect declared for `key`, if any.
    fn redirect(&self, _key: &TypeKey) -> Option<Arc<Redirect>> {
        None
    }
}

/// Registration-table [`TypeInspector`].
///
/// # Examples
///
/// ```
/// use dictor::{injectable, key_of, DiError, TypeInspector, TypeRegistry};
/// use std::sync::Arc;
///
/// pub struct Engine;
/// pub struct Auto { engine: Arc<Engine> }
///
/// injectable!(transient Engine {});
/// injectable!(transient Auto { engine: Engine });
///
/// let mut registry = TypeRegistry::new();
/// registry.register::<Engine>().register::<Auto>();
///
/// let ctor = registry.inspect(&key_of::<Auto>()).unwrap();
/// assert_eq!(ctor.dependencies(), &[key_of::<Engine>()]);
///
/// assert!(matches!(
///     registry.inspect(&key_of::<String>()),
///     Err(DiError::NoEligibleConstructor(_))
/// ));
/// ```
#[derive(Default)]
pub struct TypeRegistry {
    constructors: HashMap<TypeKey, Vec<Arc<InjectConstructor>>>,
    redirects: HashMap<TypeKey, Arc<Redirect>>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the constructor of an [`Injectable`] type.
    pub fn register<T: Injectable>(&mut self) -> &mut Self {
        self.register_constructor(InjectConstructor::of::<T>())
    }

    /// Registers a constructor. A second constructor for the same type makes
    /// the type ambiguous.
    pub fn register_constructor(&mut self, constructor: InjectConstructor) -> &mut Self {
        self.constructors
            .entry(constructor.ty())
            .or_default()
            .push(Arc::new(constructor));
        self
    }

    /// Redirects requests for the trait object `I` to the concrete type `C`.
    ///
    /// ```
    /// use dictor::{key_of, TypeRegistry};
    ///
    /// trait Logger: Send + Sync {}
    /// struct ConsoleLogger;
    /// impl Logger for ConsoleLogger {}
    ///
    /// let mut registry = TypeRegistry::new();
    /// registry.bind::<dyn Logger, ConsoleLogger>(|c| c);
    ///
    /// let redirects = registry.redirect_map();
    /// assert_eq!(redirects.get(&key_of::<dyn Logger>()), Some(key_of::<ConsoleLogger>()));
    /// ```
    pub fn bind<I, C>(&mut self, cast: fn(Arc<C>) -> Arc<I>) -> &mut Self
    where
        I: ?Sized + Send + Sync + 'static,
        C: Send + Sync + 'static,
    {
        self.bind_with(Redirect::to_trait::<I, C>(cast))
    }

    /// Declares a redirect; a later redirect for the same requested type
    /// replaces the earlier one.
    pub fn bind_with(&mut self, redirect: Redirect) -> &mut Self {
        self.redirects.insert(redirect.requested(), Arc::new(redirect));
        self
    }

    /// The declarative requested → provided mapping of every redirect.
    pub fn redirect_map(&self) -> RedirectMap {
        self.redirects
            .values()
            .map(|r| (r.requested(), r.provided()))
            .collect()
    }

    /// Number of types with at least one registered constructor.
    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }
}

impl TypeInspector for TypeRegistry {
    fn inspect(&self, key: &TypeKey) -> DiResult<Arc<InjectConstructor>> {
        match self.constructors.get(key).map(Vec::as_slice) {
            None | Some([]) => Err(DiError::NoEligibleConstructor(key.name())),
            Some([single]) => Ok(single.clone()),
            Some(many) => Err(DiError::MultipleEligibleConstructors(key.name(), many.len())),
        }
    }

    fn redirect(&self, key: &TypeKey) -> Option<Arc<Redirect>> {
        self.redirects.get(key).cloned()
    }
}

impl<I: TypeInspector + ?Sized> TypeInspector for Arc<I> {
    fn inspect(&self, key: &TypeKey) -> DiResult<Arc<InjectConstructor>> {
        (**self).inspect(key)
    }

    fn redirect(&self, key: &TypeKey) -> Option<Arc<Redirect>> {
        (**self).redirect(key)
    }
}
