//! The static binding model produced by [`GraphBuilder`](super::GraphBuilder).
//!
//! Everything here is inert data: no factories, no instances. An emitter can
//! render it into source, tooling can serialize it, and
//! [`StaticTable::from_model`](crate::StaticTable::from_model) can turn it back
//! into a provider.

use std::collections::btree_map::{self, BTreeMap};

use crate::key::TypeKey;
use crate::lifetime::Lifetime;

#[cfg(feature = "graph-export")]
use serde::Serialize;

/// How to construct one instance of `ty` from instances of its dependencies.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "graph-export", derive(Serialize))]
pub struct Binding {
    ty: TypeKey,
    dependencies: Vec<TypeKey>,
    lifetime: Lifetime,
}

impl Binding {
    pub fn new(ty: TypeKey, dependencies: Vec<TypeKey>, lifetime: Lifetime) -> Self {
        Self { ty, dependencies, lifetime }
    }

    /// Constructed type.
    pub fn ty(&self) -> TypeKey {
        self.ty
    }

    /// Declared constructor parameter types, in order, before redirects.
    pub fn dependencies(&self) -> &[TypeKey] {
        &self.dependencies
    }

    pub fn lifetime(&self) -> Lifetime {
        self.lifetime
    }

    pub fn is_singleton(&self) -> bool {
        self.lifetime.is_singleton()
    }
}

/// Requested type → provided type substitutions ("ask for X, build Y").
///
/// Keys are unique; inserting an existing key replaces its target. Iteration
/// is ordered by key so traversals seeded from the map are reproducible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "graph-export", derive(Serialize), serde(transparent))]
pub struct RedirectMap {
    entries: BTreeMap<TypeKey, TypeKey>,
}

impl RedirectMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares `requested → provided`, returning the previous target.
    pub fn insert(&mut self, requested: TypeKey, provided: TypeKey) -> Option<TypeKey> {
        self.entries.insert(requested, provided)
    }

    /// Target declared for `requested`.
    pub fn get(&self, requested: &TypeKey) -> Option<TypeKey> {
        self.entries.get(requested).copied()
    }

    /// Applies the substitution: the declared target, or `key` itself.
    #[inline]
    pub fn resolve(&self, key: &TypeKey) -> TypeKey {
        self.get(key).unwrap_or(*key)
    }

    pub fn contains(&self, requested: &TypeKey) -> bool {
        self.entries.contains_key(requested)
    }

    /// Provided types, in key order.
    pub fn values(&self) -> impl Iterator<Item = TypeKey> + '_ {
        self.entries.values().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TypeKey, TypeKey)> + '_ {
        self.entries.iter().map(|(k, v)| (*k, *v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(TypeKey, TypeKey)> for RedirectMap {
    fn from_iter<I: IntoIterator<Item = (TypeKey, TypeKey)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for RedirectMap {
    type Item = (TypeKey, TypeKey);
    type IntoIter = btree_map::IntoIter<TypeKey, TypeKey>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Output of [`GraphBuilder::build`](super::GraphBuilder::build).
///
/// # Examples
///
/// ```
/// use dictor::{injectable, key_of, GraphBuilder, RedirectMap, TypeRegistry};
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
/// let model = GraphBuilder::new(&registry)
///     .build(&[key_of::<Auto>()], &RedirectMap::new())
///     .unwrap();
///
/// assert_eq!(model.len(), 2);
/// assert!(model.binding(&key_of::<Engine>()).unwrap().is_singleton());
/// assert_eq!(model.singletons().count(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "graph-export", derive(Serialize))]
pub struct BindingModel {
    entry_points: Vec<TypeKey>,
    bindings: Vec<Binding>,
    redirects: RedirectMap,
}

impl BindingModel {
    pub fn new(entry_points: Vec<TypeKey>, bindings: Vec<Binding>, redirects: RedirectMap) -> Self {
        Self {
            entry_points,
            bindings,
            redirects,
        }
    }

    /// Root types, in declaration order.
    pub fn entry_points(&self) -> &[TypeKey] {
        &self.entry_points
    }

    /// Bindings in traversal order, one per type.
    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    pub fn redirects(&self) -> &RedirectMap {
        &self.redirects
    }

    pub fn binding(&self, ty: &TypeKey) -> Option<&Binding> {
        self.bindings.iter().find(|b| b.ty() == *ty)
    }

    pub fn contains(&self, ty: &TypeKey) -> bool {
        self.binding(ty).is_some()
    }

    /// Singleton-scoped bindings, in traversal order.
    pub fn singletons(&self) -> impl Iterator<Item = &Binding> + '_ {
        self.bindings.iter().filter(|b| b.is_singleton())
    }

    /// Dependencies of `binding` after redirect substitution.
    pub fn provided_dependencies(&self, binding: &Binding) -> Vec<TypeKey> {
        binding
            .dependencies()
            .iter()
            .map(|dep| self.redirects.resolve(dep))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
