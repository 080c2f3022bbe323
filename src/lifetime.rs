//! Instance lifetime definitions.

/// Lifetimes controlling whether a factory memoizes its instance
///
/// # Examples
///
/// ```rust
/// use dictor::{Container, Resolver, StaticTable};
/// use std::sync::Arc;
///
/// struct Database { url: String }
/// struct RequestModel { id: u32 }
///
/// let mut table = StaticTable::new();
///
/// // Singleton: one instance per factory
/// table.install_singleton::<Database, _>(|_| Ok(Database {
///     url: "postgres://localhost".to_string(),
/// }));
///
/// // Transient: new instance every time
/// table.install::<RequestModel, _>(|_| Ok(RequestModel { id: 12345 }));
///
/// let container = Container::new(vec![Arc::new(table)]);
///
/// let db1 = container.resolve_required::<Database>();
/// let db2 = container.resolve_required::<Database>();
/// assert!(Arc::ptr_eq(&db1, &db2));
///
/// let model1 = container.resolve_required::<RequestModel>();
/// let model2 = container.resolve_required::<RequestModel>();
/// assert!(!Arc::ptr_eq(&model1, &model2));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "graph-export", derive(serde::Serialize))]
pub enum Lifetime {
    /// Single instance per factory, cached forever
    ///
    /// The factory computes the value on first use and hands out the same
    /// instance to every later request, from any thread and any dependent.
    Singleton,
    /// New instance per resolution, never cached
    #[default]
    Transient,
}

impl Lifetime {
    /// Returns `true` for [`Lifetime::Singleton`].
    #[inline]
    pub fn is_singleton(self) -> bool {
        matches!(self, Lifetime::Singleton)
    }

    /// Maps a singleton flag to a lifetime.
    pub fn from_singleton(singleton: bool) -> Self {
        if singleton {
            Lifetime::Singleton
        } else {
            Lifetime::Transient
        }
    }
}
