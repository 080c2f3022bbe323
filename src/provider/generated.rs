//! Precompiled factories registered at link time.
//!
//! Crates declare factories with [`generated_factory!`](crate::generated_factory),
//! which appends a [`GeneratedFactoryEntry`] to the [`GENERATED_FACTORIES`]
//! distributed slice. [`GeneratedLookup`] indexes the slice by type the first
//! time it is consulted.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  1. Crate declares:  generated_factory!(ENGINE: Engine);  │
//! │  2. Linker collects: GENERATED_FACTORIES = [ENGINE, ..]   │
//! │  3. Lookup indexes:  TypeKey → entry (first one wins)     │
//! └──────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use once_cell::sync::OnceCell;

use super::reflective::ReflectiveFactory;
use super::Provider;
use crate::error::DiResult;
use crate::factory::{memoize, Factory};
use crate::inspector::{InjectConstructor, Injectable};
use crate::internal::TypeMap;
use crate::key::TypeKey;

/// One precompiled factory.
///
/// Both fields are function pointers so entries can live in a `static`.
pub struct GeneratedFactoryEntry {
    /// Type produced by the factory.
    pub key: fn() -> TypeKey,
    /// Builds the factory; called once per [`GeneratedLookup::lookup`] hit.
    pub factory: fn() -> Arc<dyn Factory>,
}

/// Link-time registry of generated factories.
#[linkme::distributed_slice]
pub static GENERATED_FACTORIES: [GeneratedFactoryEntry] = [..];

/// Factory for an [`Injectable`] type, memoized when the type is singleton
/// scoped. Used by [`generated_factory!`](crate::generated_factory).
pub fn injectable_factory<T: Injectable>() -> Arc<dyn Factory> {
    let constructor = Arc::new(InjectConstructor::of::<T>());
    let singleton = constructor.is_singleton();
    let factory: Arc<dyn Factory> = Arc::new(ReflectiveFactory::new(constructor));
    if singleton {
        memoize(factory)
    } else {
        factory
    }
}

/// Provider over a table of [`GeneratedFactoryEntry`]s.
///
/// A type with no entry is simply not provided; this provider never fails.
/// When several entries exist for one type, the first in table order wins.
///
/// # Examples
///
/// ```
/// use dictor::{factory_fn, key_of, Container, GeneratedFactoryEntry, GeneratedLookup, Resolver};
/// use std::sync::Arc;
///
/// static ENTRIES: [GeneratedFactoryEntry; 1] = [GeneratedFactoryEntry {
///     key: key_of::<u16>,
///     factory: || factory_fn::<u16, _>(|_| Ok(8080)),
/// }];
///
/// let container = Container::new(vec![Arc::new(GeneratedLookup::from_entries(&ENTRIES))]);
/// assert_eq!(*container.resolve::<u16>().unwrap(), 8080);
/// assert!(container.resolve::<u32>().is_err());
/// ```
pub struct GeneratedLookup {
    entries: &'static [GeneratedFactoryEntry],
    index: OnceCell<TypeMap<usize>>,
}

impl GeneratedLookup {
    /// Lookup over the link-time [`GENERATED_FACTORIES`] slice.
    pub fn new() -> Self {
        Self::from_entries(GENERATED_FACTORIES.static_slice())
    }

    /// Lookup over an arbitrary static table.
    pub fn from_entries(entries: &'static [GeneratedFactoryEntry]) -> Self {
        Self {
            entries,
            index: OnceCell::new(),
        }
    }

    /// Number of distinct types with a generated factory.
    pub fn len(&self) -> usize {
        self.index().len()
    }

    pub fn is_empty(&self) -> bool {
        self.index().is_empty()
    }

    fn index(&self) -> &TypeMap<usize> {
        self.index.get_or_init(|| {
            let mut index = TypeMap::default();
            for (position, entry) in self.entries.iter().enumerate() {
                let key = (entry.key)();
                if let Some(first) = index.get(&key) {
                    tracing::warn!(
                        ty = key.name(),
                        kept = *first,
                        ignored = position,
                        "duplicate generated factory"
                    );
                    continue;
                }
                index.insert(key, position);
            }
            tracing::debug!(types = index.len(), "generated factory index built");
            index
        })
    }
}

impl Default for GeneratedLookup {
    fn default() -> Self {
        Self::new()
    }
}

impl Provider for GeneratedLookup {
    fn lookup(&self, key: &TypeKey) -> DiResult<Option<Arc<dyn Factory>>> {
        Ok(self
            .index()
            .get(key)
            .map(|&position| (self.entries[position].factory)()))
    }

    fn name(&self) -> &'static str {
        "generated"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::factory_fn;
    use crate::key::key_of;

    static DUPLICATES: [GeneratedFactoryEntry; 3] = [
        GeneratedFactoryEntry {
            key: key_of::<u8>,
            factory: || factory_fn::<u8, _>(|_| Ok(1)),
        },
        GeneratedFactoryEntry {
            key: key_of::<u8>,
            factory: || factory_fn::<u8, _>(|_| Ok(2)),
        },
        GeneratedFactoryEntry {
            key: key_of::<u16>,
            factory: || factory_fn::<u16, _>(|_| Ok(3)),
        },
    ];

    struct NoDeps;

    impl crate::traits::ResolverCore for NoDeps {
        fn resolve_any(&self, key: &TypeKey) -> DiResult<crate::traits::AnyArc> {
            Err(crate::error::DiError::NotFound(key.name()))
        }
    }

    #[test]
    fn test_first_duplicate_wins() {
        let lookup = GeneratedLookup::from_entries(&DUPLICATES);
        assert_eq!(lookup.len(), 2);

        let factory = lookup.lookup(&key_of::<u8>()).unwrap().unwrap();
        let value = factory.produce(&NoDeps).unwrap();
        assert_eq!(*value.downcast::<u8>().unwrap(), 1);
    }

    #[test]
    fn test_absence_is_not_an_error() {
        let lookup = GeneratedLookup::from_entries(&DUPLICATES);
        assert!(lookup.lookup(&key_of::<u64>()).unwrap().is_none());

        let empty = GeneratedLookup::from_entries(&[]);
        assert!(empty.is_empty());
        assert!(empty.lookup(&key_of::<u8>()).unwrap().is_none());
    }
}
