//! Providers: the sources a [`Container`](crate::Container) consults on a
//! cache miss.
//!
//! A provider maps a requested type to a [`Factory`], or answers "not
//! provided" (`Ok(None)`) so the container moves on to the next provider in
//! its chain. An `Err` is a hard failure and aborts the chain.
//!
//! Three implementations ship with the crate:
//!
//! * [`StaticTable`]: hand-installed factories, also built from a
//!   [`BindingModel`](crate::BindingModel) by [`StaticTable::from_model`].
//! * [`ReflectiveLookup`]: synthesizes factories from a
//!   [`TypeInspector`](crate::TypeInspector) at run time.
//! * [`GeneratedLookup`]: precompiled factories registered at link time
//!   with [`generated_factory!`](crate::generated_factory).

use std::sync::Arc;

use crate::error::DiResult;
use crate::factory::Factory;
use crate::inspector::{Arguments, Redirect};
use crate::key::TypeKey;
use crate::traits::ResolverCore;

pub mod generated;
pub mod reflective;
pub mod static_table;

pub use generated::{GeneratedFactoryEntry, GeneratedLookup, GENERATED_FACTORIES};
pub use reflective::{RedirectFactory, ReflectiveFactory, ReflectiveLookup};
pub use static_table::StaticTable;

/// Source of factories for requested types.
///
/// # Examples
///
/// ```
/// use dictor::{factory_fn, Container, DiResult, Factory, Provider, Resolver, TypeKey};
/// use std::sync::Arc;
///
/// /// Provides every `String` request with a fixed greeting.
/// struct Greetings;
///
/// impl Provider for Greetings {
///     fn lookup(&self, key: &TypeKey) -> DiResult<Option<Arc<dyn Factory>>> {
///         if *key == TypeKey::of::<String>() {
///             Ok(Some(factory_fn::<String, _>(|_| Ok("hello".to_string()))))
///         } else {
///             Ok(None)
///         }
///     }
///
///     fn name(&self) -> &'static str {
///         "greetings"
///     }
/// }
///
/// let container = Container::new(vec![Arc::new(Greetings)]);
/// assert_eq!(&*container.resolve::<String>().unwrap(), "hello");
/// assert!(container.resolve::<u32>().is_err());
/// ```
pub trait Provider: Send + Sync {
    /// Returns the factory for `key`, `Ok(None)` when this provider does not
    /// provide it, or an error that aborts the provider chain.
    fn lookup(&self, key: &TypeKey) -> DiResult<Option<Arc<dyn Factory>>>;

    /// Short name used in logs and diagnostics.
    fn name(&self) -> &'static str {
        "provider"
    }
}

impl<P: Provider + ?Sized> Provider for Arc<P> {
    fn lookup(&self, key: &TypeKey) -> DiResult<Option<Arc<dyn Factory>>> {
        (**self).lookup(key)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// How one constructor argument is obtained.
#[derive(Clone)]
pub(crate) enum ArgumentSource {
    /// Resolve the declared type itself.
    Direct(TypeKey),
    /// Resolve the provided type of a redirect and coerce it to the declared
    /// type.
    Redirected(Arc<Redirect>),
}

impl ArgumentSource {
    fn declared(&self) -> TypeKey {
        match self {
            ArgumentSource::Direct(key) => *key,
            ArgumentSource::Redirected(redirect) => redirect.requested(),
        }
    }
}

/// Resolves every argument through `resolver`, in order, keyed by declared
/// type.
pub(crate) fn resolve_arguments(
    resolver: &dyn ResolverCore,
    sources: &[ArgumentSource],
) -> DiResult<Arguments> {
    let mut values = Vec::with_capacity(sources.len());
    for source in sources {
        let value = match source {
            ArgumentSource::Direct(key) => resolver.resolve_any(key)?,
            ArgumentSource::Redirected(redirect) => {
                let provided = resolver.resolve_any(&redirect.provided())?;
                redirect.coerce(provided)?
            }
        };
        values.push((source.declared(), value));
    }
    Ok(Arguments::new(values))
}
