//! # dictor
//!
//! Dependency-injection resolution engine: declare how each type is
//! constructed, then either resolve the object graph ahead of time into an
//! inert binding model or resolve it lazily through a chain of providers.
//!
//! ## Features
//!
//! - **Ahead-of-time graph resolution**: [`GraphBuilder`] turns entry points and
//!   redirects into a serializable [`BindingModel`], rejecting missing or
//!   ambiguous constructors and dependency cycles before anything is built
//! - **Provider chains**: hand-wired [`StaticTable`]s, run-time
//!   [`ReflectiveLookup`] and link-time [`GeneratedLookup`], consulted in order
//! - **Singleton scoping**: [`Memoized`] factories construct once, even under
//!   concurrent first access, and retry after a failed attempt
//! - **Thread-safe**: one [`Container`] can be shared and resolved from many
//!   threads; runtime cycles fail with the dependency path instead of
//!   deadlocking
//!
//! ## Quick Start
//!
//! ```rust
//! use dictor::{injectable, Container, ReflectiveLookup, Resolver, StaticTable, TypeRegistry};
//! use std::sync::Arc;
//!
//! pub struct Engine;
//! pub struct Wheels;
//! pub struct Auto {
//!     engine: Arc<Engine>,
//!     wheels: Arc<Wheels>,
//! }
//!
//! injectable!(singleton Engine {});
//! injectable!(transient Wheels {});
//! injectable!(transient Auto { engine: Engine, wheels: Wheels });
//!
//! let mut registry = TypeRegistry::new();
//! registry.register::<Engine>().register::<Wheels>().register::<Auto>();
//!
//! // Hand-wired values take precedence over the reflective fallback
//! let mut table = StaticTable::new();
//! table.install_instance(String::from("VW Beetle"));
//!
//! let container = Container::new(vec![
//!     Arc::new(table),
//!     Arc::new(ReflectiveLookup::new(registry)),
//! ]);
//!
//! let a = container.resolve::<Auto>().unwrap();
//! let b = container.resolve::<Auto>().unwrap();
//! assert!(Arc::ptr_eq(&a.engine, &b.engine));
//! assert!(!Arc::ptr_eq(&a.wheels, &b.wheels));
//! assert_eq!(&*container.resolve::<String>().unwrap(), "VW Beetle");
//! ```
//!
//! ## Ahead-of-time Resolution
//!
//! ```rust
//! use dictor::{injectable, key_of, Container, GraphBuilder, Resolver, StaticTable, TypeRegistry};
//! use std::sync::Arc;
//!
//! pub trait Logger: Send + Sync {
//!     fn log(&self, message: &str) -> String;
//! }
//!
//! pub struct ConsoleLogger;
//! impl Logger for ConsoleLogger {
//!     fn log(&self, message: &str) -> String {
//!         format!("[LOG] {}", message)
//!     }
//! }
//!
//! pub struct Service {
//!     logger: Arc<dyn Logger>,
//! }
//!
//! injectable!(singleton ConsoleLogger {});
//! injectable!(transient Service { logger: dyn Logger });
//!
//! let mut registry = TypeRegistry::new();
//! registry.register::<ConsoleLogger>().register::<Service>();
//! registry.bind::<dyn Logger, ConsoleLogger>(|c| c);
//!
//! let model = GraphBuilder::new(&registry)
//!     .build(&[key_of::<Service>()], &registry.redirect_map())
//!     .unwrap();
//! assert_eq!(model.len(), 2);
//!
//! let table = StaticTable::from_model(&model, &registry).unwrap();
//! let container = Container::new(vec![Arc::new(table)]);
//! let service = container.resolve::<Service>().unwrap();
//! assert_eq!(service.logger.log("ready"), "[LOG] ready");
//! ```

// Module declarations
pub mod config;
pub mod container;
pub mod error;
pub mod factory;
pub mod graph;
pub mod inspector;
pub mod key;
pub mod lifetime;
pub mod observer;
pub mod provider;
pub mod traits;

mod internal;
mod macros;

#[doc(hidden)]
pub use linkme;

// Re-exports
pub use config::ContainerOptions;
pub use container::{Container, ContainerBuilder};
pub use error::{DiError, DiResult};
pub use factory::{factory_fn, instance_factory, memoize, trait_factory_fn, Factory, FnFactory, Memoized};
pub use graph::{Binding, BindingModel, ExportFormat, GraphBuilder, RedirectMap};
pub use inspector::{Arguments, InjectConstructor, Injectable, Redirect, TypeInspector, TypeRegistry};
pub use key::{key_of, TypeKey};
pub use lifetime::Lifetime;
pub use observer::{LoggingObserver, Observers, ResolutionObserver};
pub use provider::generated::injectable_factory;
pub use provider::{
    GeneratedFactoryEntry, GeneratedLookup, Provider, RedirectFactory, ReflectiveFactory,
    ReflectiveLookup, StaticTable, GENERATED_FACTORIES,
};
pub use traits::{AnyArc, Resolver, ResolverCore};
