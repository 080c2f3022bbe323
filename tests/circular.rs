//! Cycle detection, ahead of time in the graph builder and at run time in the
//! container.

use dictor::{
    injectable, key_of, Container, ContainerOptions, DiError, GraphBuilder, ReflectiveLookup,
    Resolver, StaticTable, TypeRegistry,
};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

pub struct Chicken {
    _egg: Arc<Egg>,
}
pub struct Egg {
    _chicken: Arc<Chicken>,
}

injectable!(singleton Chicken { _egg: Egg });
injectable!(transient Egg { _chicken: Chicken });

pub struct Ouroboros {
    _tail: Arc<Ouroboros>,
}
injectable!(singleton Ouroboros { _tail: Ouroboros });

fn registry() -> TypeRegistry {
    let mut registry = TypeRegistry::new();
    registry
        .register::<Chicken>()
        .register::<Egg>()
        .register::<Ouroboros>();
    registry
}

fn names(keys: &[dictor::TypeKey]) -> Vec<&'static str> {
    keys.iter().map(|k| k.name()).collect()
}

#[test]
fn test_two_node_cycle_rejected_at_build_time() {
    let registry = registry();
    let err = GraphBuilder::new(&registry)
        .build(&[key_of::<Chicken>()], &registry.redirect_map())
        .unwrap_err();

    assert_eq!(
        err,
        DiError::Circular(names(&[key_of::<Chicken>(), key_of::<Egg>(), key_of::<Chicken>()]))
    );
}

#[test]
fn test_self_cycle_rejected_at_build_time() {
    let registry = registry();
    let err = GraphBuilder::new(&registry)
        .build(&[key_of::<Ouroboros>()], &registry.redirect_map())
        .unwrap_err();

    assert_eq!(
        err,
        DiError::Circular(names(&[key_of::<Ouroboros>(), key_of::<Ouroboros>()]))
    );
}

#[test]
fn test_runtime_cycle_through_singleton_does_not_deadlock() {
    let container = Container::new(vec![Arc::new(ReflectiveLookup::new(registry()))]);

    match container.resolve::<Chicken>() {
        Err(DiError::Circular(path)) => {
            assert_eq!(path, names(&[key_of::<Chicken>(), key_of::<Egg>(), key_of::<Chicken>()]));
        }
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("cycle resolved"),
    }

    // The failure leaves the container usable and is reported again
    assert!(matches!(container.resolve::<Egg>(), Err(DiError::Circular(_))));
    assert!(matches!(container.resolve::<Ouroboros>(), Err(DiError::Circular(_))));
}

#[test]
fn test_runtime_cycle_in_static_table() {
    struct Ping;
    struct Pong;

    let mut table = StaticTable::new();
    table.install(|r| r.resolve::<Pong>().map(|_| Ping));
    table.install(|r| r.resolve::<Ping>().map(|_| Pong));
    let container = Container::new(vec![Arc::new(table)]);

    let err = container.resolve::<Ping>().err().unwrap();
    assert_eq!(
        err,
        DiError::Circular(vec![
            std::any::type_name::<Ping>(),
            std::any::type_name::<Pong>(),
            std::any::type_name::<Ping>(),
        ])
    );
}

#[test]
fn test_disabled_cycle_detection_hits_depth_limit() {
    struct Ping;
    struct Pong;

    let mut table = StaticTable::new();
    table.install(|r| r.resolve::<Pong>().map(|_| Ping));
    table.install(|r| r.resolve::<Ping>().map(|_| Pong));
    let container = Container::builder()
        .provider(table)
        .options(
            ContainerOptions::default()
                .with_cycle_detection(false)
                .with_max_depth(16),
        )
        .build();

    assert_eq!(container.resolve::<Ping>().err().unwrap(), DiError::DepthExceeded(16));
}

#[test]
fn test_singleton_cycle_fails_with_detection_disabled() {
    struct Ping;
    struct Pong;

    let mut table = StaticTable::new();
    table.install_singleton(|r| r.resolve::<Pong>().map(|_| Ping));
    table.install(|r| r.resolve::<Ping>().map(|_| Pong));
    let container = Container::builder()
        .provider(table)
        .options(
            ContainerOptions::default()
                .with_cycle_detection(false)
                .with_max_depth(16),
        )
        .build();

    // Resolve on a worker so a blocked memoization cell fails the test
    // instead of hanging it
    let (tx, rx) = mpsc::channel();
    let worker = container.clone();
    thread::spawn(move || {
        let _ = tx.send(worker.resolve::<Ping>().err());
    });

    let err = rx
        .recv_timeout(Duration::from_secs(5))
        .expect("resolution blocked on its own singleton")
        .unwrap();
    assert_eq!(
        err,
        DiError::Circular(vec![
            std::any::type_name::<Ping>(),
            std::any::type_name::<Pong>(),
            std::any::type_name::<Ping>(),
        ])
    );

    // The cell was never entered, so the container stays usable
    assert!(matches!(container.resolve::<Ping>(), Err(DiError::Circular(_))));
}

#[test]
fn test_same_type_through_two_containers_is_not_a_cycle() {
    #[derive(Debug)]
    struct Outer(u32);
    #[derive(Debug)]
    struct Inner(u32);

    let mut inner_table = StaticTable::new();
    inner_table.install(|_| Ok(Inner(2)));
    inner_table.install(|_| Ok(Outer(20)));
    let inner = Container::new(vec![Arc::new(inner_table)]);

    let mut outer_table = StaticTable::new();
    outer_table.install(move |_| {
        let nested = inner.resolve::<Outer>()?;
        Ok(Outer(nested.0 + inner.resolve::<Inner>()?.0))
    });
    let outer = Container::new(vec![Arc::new(outer_table)]);

    assert_eq!(outer.resolve::<Outer>().unwrap().0, 22);
}
