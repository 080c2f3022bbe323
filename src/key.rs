//! Type keys for factory storage and lookup.

use std::any::TypeId;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Identity of a requested capability.
///
/// A key pairs the `TypeId` of a type with its `std::any::type_name` for
/// diagnostics. Equality and hashing use the `TypeId` only, so two keys for
/// the same type always collide regardless of how they were built. Ordering
/// is by name first, which keeps ordered collections of keys stable across
/// runs.
///
/// Trait objects are valid keys: `key_of::<dyn Logger>()` identifies the
/// interface while `key_of::<ConsoleLogger>()` identifies an implementation.
///
/// # Examples
///
/// ```rust
/// use dictor::{key_of, TypeKey};
///
/// let a = key_of::<String>();
/// let b = TypeKey::of::<String>();
/// assert_eq!(a, b);
/// assert_eq!(a.name(), "alloc::string::String");
/// assert_ne!(a, key_of::<u32>());
/// ```
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    /// Creates the key for `T`.
    #[inline(always)]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Underlying `TypeId`.
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Full type name, as reported by `std::any::type_name`.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Last path segment of the type name, with generic arguments kept.
    ///
    /// ```rust
    /// use dictor::key_of;
    ///
    /// assert_eq!(key_of::<String>().short_name(), "String");
    /// ```
    pub fn short_name(&self) -> &'static str {
        let base_end = self.name.find('<').unwrap_or(self.name.len());
        match self.name[..base_end].rfind("::") {
            Some(idx) => &self.name[idx + 2..],
            None => self.name,
        }
    }
}

impl PartialEq for TypeKey {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    #[inline(always)]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for TypeKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TypeKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name.cmp(other.name).then_with(|| self.id.cmp(&other.id))
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeKey({})", self.name)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

#[cfg(feature = "graph-export")]
impl serde::Serialize for TypeKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name)
    }
}

// Helper function for creating type keys - add aggressive inlining
#[inline(always)]
pub fn key_of<T: ?Sized + 'static>() -> TypeKey {
    TypeKey::of::<T>()
}
