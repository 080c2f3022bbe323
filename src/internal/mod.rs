//! Internal implementation details.

pub(crate) mod circular;

pub(crate) use circular::{ResolutionGuard, MAX_DEPTH};

use crate::key::TypeKey;

/// Type-keyed map used by the container cache and the provider tables.
#[cfg(feature = "ahash")]
pub(crate) type TypeMap<V> = std::collections::HashMap<TypeKey, V, ahash::RandomState>;

#[cfg(not(feature = "ahash"))]
pub(crate) type TypeMap<V> = std::collections::HashMap<TypeKey, V>;
