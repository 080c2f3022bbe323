use std::sync::Arc;

use super::Container;
use crate::config::ContainerOptions;
use crate::observer::{Observers, ResolutionObserver};
use crate::provider::Provider;

/// Step-by-step [`Container`] construction.
///
/// Providers are consulted in the order they are added.
///
/// # Examples
///
/// ```
/// use dictor::{Container, ContainerOptions, LoggingObserver, Resolver, StaticTable};
/// use std::sync::Arc;
///
/// let mut overrides = StaticTable::new();
/// overrides.install_instance(String::from("override"));
///
/// let mut defaults = StaticTable::new();
/// defaults.install_instance(String::from("default"));
///
/// let container = Container::builder()
///     .provider(overrides)
///     .provider(defaults)
///     .observer(Arc::new(LoggingObserver::new()))
///     .options(ContainerOptions::default().with_max_depth(128))
///     .build();
///
/// assert_eq!(&*container.resolve::<String>().unwrap(), "override");
/// assert_eq!(container.provider_count(), 2);
/// ```
#[derive(Default)]
pub struct ContainerBuilder {
    providers: Vec<Arc<dyn Provider>>,
    observers: Observers,
    options: ContainerOptions,
}

impl ContainerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a provider to the chain.
    pub fn provider<P: Provider + 'static>(mut self, provider: P) -> Self {
        self.providers.push(Arc::new(provider));
        self
    }

    /// Appends providers that are already shared, e.g. one
    /// [`StaticTable`](crate::StaticTable) used by several containers.
    pub fn providers<I>(mut self, providers: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn Provider>>,
    {
        self.providers.extend(providers);
        self
    }

    pub fn observer(mut self, observer: Arc<dyn ResolutionObserver>) -> Self {
        self.observers.add(observer);
        self
    }

    pub fn options(mut self, options: ContainerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn build(self) -> Container {
        Container::with_parts(self.providers, self.observers, self.options)
    }
}
