//! Declarative helpers for describing constructors and generated factories.

/// Implements [`Injectable`](crate::Injectable) for a struct whose fields are
/// all `Arc`s of its dependencies.
///
/// Each field is written as `name: Dep`, or `name: dyn Trait` for a trait
/// object dependency; the struct field itself must be `Arc<Dep>` or
/// `Arc<dyn Trait>`. Dependencies are declared in field order. The scope
/// comes first: `singleton` or `transient`.
///
/// # Examples
///
/// ```
/// use dictor::{injectable, key_of, Injectable, Lifetime};
/// use std::sync::Arc;
///
/// pub trait Wheels: Send + Sync {}
///
/// pub struct Engine;
/// pub struct Auto {
///     engine: Arc<Engine>,
///     wheels: Arc<dyn Wheels>,
/// }
///
/// injectable!(singleton Engine {});
/// injectable!(transient Auto { engine: Engine, wheels: dyn Wheels });
///
/// assert_eq!(Engine::lifetime(), Lifetime::Singleton);
/// assert_eq!(Auto::dependencies(), vec![key_of::<Engine>(), key_of::<dyn Wheels>()]);
/// ```
#[macro_export]
macro_rules! injectable {
    (@lifetime singleton) => {
        $crate::Lifetime::Singleton
    };
    (@lifetime transient) => {
        $crate::Lifetime::Transient
    };

    // Trait object field: `name: dyn Trait`
    (@fields $head:tt [$($acc:tt)*] $field:ident : dyn $tr:path $(, $($rest:tt)*)?) => {
        $crate::injectable!(@fields $head [$($acc)* ($field, next_trait, dyn $tr)] $($($rest)*)?);
    };
    // Concrete field: `name: Dep`
    (@fields $head:tt [$($acc:tt)*] $field:ident : $dep:ty $(, $($rest:tt)*)?) => {
        $crate::injectable!(@fields $head [$($acc)* ($field, next, $dep)] $($($rest)*)?);
    };
    (@fields [$scope:ident $ty:ty] [$(($field:ident, $next:ident, $dep:ty))*]) => {
        impl $crate::Injectable for $ty {
            fn lifetime() -> $crate::Lifetime {
                $crate::injectable!(@lifetime $scope)
            }

            fn dependencies() -> ::std::vec::Vec<$crate::TypeKey> {
                ::std::vec![$($crate::key_of::<$dep>()),*]
            }

            #[allow(unused_variables)]
            fn construct(args: &mut $crate::Arguments) -> $crate::DiResult<Self> {
                ::std::result::Result::Ok(Self {
                    $($field: args.$next::<$dep>()?,)*
                })
            }
        }
    };

    ($scope:ident $ty:ty { $($fields:tt)* }) => {
        $crate::injectable!(@fields [$scope $ty] [] $($fields)*);
    };
}

/// Registers a precompiled factory in
/// [`GENERATED_FACTORIES`](crate::GENERATED_FACTORIES).
///
/// `NAME: Type` registers the constructor of an
/// [`Injectable`](crate::Injectable) type (memoized when singleton scoped).
/// `NAME: Type => factory` registers an explicit
/// `fn() -> Arc<dyn Factory>`.
///
/// # Examples
///
/// ```
/// use dictor::{generated_factory, injectable, factory_fn, Container, GeneratedLookup, Resolver};
/// use std::sync::Arc;
///
/// pub struct Engine;
/// injectable!(singleton Engine {});
///
/// pub struct Port(u16);
///
/// generated_factory!(ENGINE_FACTORY: Engine);
/// generated_factory!(PORT_FACTORY: Port => || factory_fn::<Port, _>(|_| Ok(Port(8080))));
///
/// fn main() {
///     let container = Container::new(vec![Arc::new(GeneratedLookup::new())]);
///     let a = container.resolve::<Engine>().unwrap();
///     let b = container.resolve::<Engine>().unwrap();
///     assert!(Arc::ptr_eq(&a, &b));
///     assert_eq!(container.resolve::<Port>().unwrap().0, 8080);
/// }
/// ```
#[macro_export]
macro_rules! generated_factory {
    ($name:ident : $ty:ty => $factory:expr) => {
        #[$crate::linkme::distributed_slice($crate::GENERATED_FACTORIES)]
        #[linkme(crate = $crate::linkme)]
        static $name: $crate::GeneratedFactoryEntry = $crate::GeneratedFactoryEntry {
            key: $crate::key_of::<$ty>,
            factory: $factory,
        };
    };
    ($name:ident : $ty:ty) => {
        $crate::generated_factory!($name: $ty => $crate::injectable_factory::<$ty>);
    };
}
