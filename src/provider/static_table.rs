//! Hand-populated factory table.

use std::fmt;
use std::sync::Arc;

use super::reflective::{RedirectFactory, ReflectiveFactory};
use super::{ArgumentSource, Provider};
use crate::error::{DiError, DiResult};
use crate::factory::{factory_fn, instance_factory, memoize, trait_factory_fn, Factory};
use crate::graph::BindingModel;
use crate::inspector::{Redirect, TypeInspector};
use crate::internal::TypeMap;
use crate::key::TypeKey;
use crate::traits::ResolverCore;

/// Provider backed by an explicit `type → factory` table.
///
/// Installing a type that is already present replaces its factory. Singleton
/// factories keep their memoization cell in the table, so containers sharing
/// one table through an `Arc` share its singletons.
///
/// # Examples
///
/// ```
/// use dictor::{Container, Resolver, StaticTable};
/// use std::sync::Arc;
///
/// struct Database { url: String }
/// struct Repository { db: Arc<Database> }
///
/// let mut table = StaticTable::new();
/// table.install_singleton(|_| Ok(Database { url: "postgres://localhost".into() }));
/// table.install(|r| Ok(Repository { db: r.resolve::<Database>()? }));
///
/// let container = Container::new(vec![Arc::new(table)]);
/// let a = container.resolve::<Repository>().unwrap();
/// let b = container.resolve::<Repository>().unwrap();
/// assert!(!Arc::ptr_eq(&a, &b));
/// assert!(Arc::ptr_eq(&a.db, &b.db));
/// assert_eq!(a.db.url, "postgres://localhost");
/// ```
#[derive(Default)]
pub struct StaticTable {
    factories: TypeMap<Arc<dyn Factory>>,
}

impl StaticTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs a factory that builds a new `T` on every call.
    pub fn install<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: Send + Sync + 'static,
        F: Fn(&dyn ResolverCore) -> DiResult<T> + Send + Sync + 'static,
    {
        self.install_factory(TypeKey::of::<T>(), factory_fn(factory))
    }

    /// Installs a factory whose first successful result is reused.
    pub fn install_singleton<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: Send + Sync + 'static,
        F: Fn(&dyn ResolverCore) -> DiResult<T> + Send + Sync + 'static,
    {
        self.install_factory(TypeKey::of::<T>(), memoize(factory_fn(factory)))
    }

    /// Installs a trait-object factory that runs on every call.
    pub fn install_trait<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&dyn ResolverCore) -> DiResult<Arc<T>> + Send + Sync + 'static,
    {
        self.install_factory(TypeKey::of::<T>(), trait_factory_fn(factory))
    }

    /// Installs a trait-object factory whose first successful result is
    /// reused.
    pub fn install_singleton_trait<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&dyn ResolverCore) -> DiResult<Arc<T>> + Send + Sync + 'static,
    {
        self.install_factory(TypeKey::of::<T>(), memoize(trait_factory_fn(factory)))
    }

    /// Installs an already constructed value.
    pub fn install_instance<T: Send + Sync + 'static>(&mut self, value: T) -> &mut Self {
        self.install_factory(TypeKey::of::<T>(), instance_factory(value))
    }

    /// Installs an erased factory for `key`.
    ///
    /// The factory must produce values stored the way the crate stores `key`
    /// (see [`AnyArc`](crate::AnyArc)), or typed resolution of `key` fails
    /// with [`DiError::TypeMismatch`].
    pub fn install_factory(&mut self, key: TypeKey, factory: Arc<dyn Factory>) -> &mut Self {
        if self.factories.insert(key, factory).is_some() {
            tracing::debug!(ty = key.name(), "static factory replaced");
        }
        self
    }

    pub fn get(&self, key: &TypeKey) -> Option<Arc<dyn Factory>> {
        self.factories.get(key).cloned()
    }

    pub fn contains(&self, key: &TypeKey) -> bool {
        self.factories.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Materializes a resolved [`BindingModel`] into a table.
    ///
    /// Each binding becomes a factory (memoized when singleton) that resolves
    /// its dependencies after redirect substitution, coerces redirected ones
    /// back to their declared type and invokes the constructor reported by
    /// `inspector`. Each redirect key becomes a factory that resolves its
    /// target. This is the table an emitter would generate for the model.
    ///
    /// Fails if `inspector` no longer agrees with the model, or if a
    /// redirect in the model has no coercion in `inspector`.
    ///
    /// # Examples
    ///
    /// ```
    /// use dictor::{injectable, key_of, Container, GraphBuilder, Resolver, StaticTable, TypeRegistry};
    /// use std::sync::Arc;
    ///
    /// pub trait Wheels: Send + Sync { fn count(&self) -> usize; }
    /// pub struct Alloys;
    /// impl Wheels for Alloys { fn count(&self) -> usize { 4 } }
    ///
    /// pub struct Auto { wheels: Arc<dyn Wheels> }
    /// injectable!(transient Alloys {});
    /// injectable!(transient Auto { wheels: dyn Wheels });
    ///
    /// let mut registry = TypeRegistry::new();
    /// registry.register::<Alloys>().register::<Auto>();
    /// registry.bind::<dyn Wheels, Alloys>(|c| c);
    ///
    /// let model = GraphBuilder::new(&registry)
    ///     .build(&[key_of::<Auto>()], &registry.redirect_map())
    ///     .unwrap();
    /// let table = StaticTable::from_model(&model, &registry).unwrap();
    ///
    /// let container = Container::new(vec![Arc::new(table)]);
    /// assert_eq!(container.resolve::<Auto>().unwrap().wheels.count(), 4);
    /// assert_eq!(container.resolve_trait::<dyn Wheels>().unwrap().count(), 4);
    /// ```
    pub fn from_model(model: &BindingModel, inspector: &dyn TypeInspector) -> DiResult<Self> {
        let mut table = Self::new();

        for binding in model.bindings() {
            let constructor = inspector.inspect(&binding.ty())?;
            if constructor.dependencies() != binding.dependencies() {
                return Err(DiError::TypeMismatch(binding.ty().name()));
            }

            let arguments = binding
                .dependencies()
                .iter()
                .map(|dep| match model.redirects().get(dep) {
                    None => Ok(ArgumentSource::Direct(*dep)),
                    Some(provided) => {
                        redirect_of(inspector, dep, provided).map(ArgumentSource::Redirected)
                    }
                })
                .collect::<DiResult<Vec<_>>>()?;

            let factory: Arc<dyn Factory> =
                Arc::new(ReflectiveFactory::with_arguments(constructor, arguments));
            let factory = if binding.is_singleton() { memoize(factory) } else { factory };
            table.install_factory(binding.ty(), factory);
        }

        for (requested, provided) in model.redirects().iter() {
            let redirect = redirect_of(inspector, &requested, provided)?;
            table.install_factory(requested, Arc::new(RedirectFactory::new(redirect)));
        }

        tracing::debug!(
            factories = table.len(),
            singletons = model.singletons().count(),
            "static table materialized from binding model"
        );
        Ok(table)
    }
}

/// The inspector's coercion for `requested`, which must target `provided`.
fn redirect_of(
    inspector: &dyn TypeInspector,
    requested: &TypeKey,
    provided: TypeKey,
) -> DiResult<Arc<Redirect>> {
    match inspector.redirect(requested) {
        Some(redirect) if redirect.provided() == provided => Ok(redirect),
        _ => Err(DiError::TypeMismatch(requested.name())),
    }
}

impl Provider for StaticTable {
    fn lookup(&self, key: &TypeKey) -> DiResult<Option<Arc<dyn Factory>>> {
        Ok(self.get(key))
    }

    fn name(&self) -> &'static str {
        "static-table"
    }
}

impl fmt::Debug for StaticTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.factories.keys().collect();
        keys.sort();
        f.debug_struct("StaticTable").field("types", &keys).finish()
    }
}
