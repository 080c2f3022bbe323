/// Property-based tests for binding graphs
///
/// Random acyclic graphs over a fixed set of node types: the builder must
/// expand exactly the reachable types, deterministically, and both provider
/// paths must honour each node's lifetime.

use dictor::{
    key_of, AnyArc, Arguments, Container, DiResult, GraphBuilder, InjectConstructor, Lifetime,
    ReflectiveLookup, ResolverCore, StaticTable, TypeKey, TypeRegistry,
};
use proptest::prelude::*;
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

const NODES: usize = 6;

static SERIAL: AtomicUsize = AtomicUsize::new(0);

struct Node<const N: usize> {
    _serial: usize,
}

fn build<const N: usize>(_args: &mut Arguments) -> DiResult<AnyArc> {
    Ok(Arc::new(Node::<N> {
        _serial: SERIAL.fetch_add(1, Ordering::Relaxed),
    }) as AnyArc)
}

type Build = fn(&mut Arguments) -> DiResult<AnyArc>;

const BUILDS: [Build; NODES] = [build::<0>, build::<1>, build::<2>, build::<3>, build::<4>, build::<5>];

fn keys() -> [TypeKey; NODES] {
    [
        key_of::<Node<0>>(),
        key_of::<Node<1>>(),
        key_of::<Node<2>>(),
        key_of::<Node<3>>(),
        key_of::<Node<4>>(),
        key_of::<Node<5>>(),
    ]
}

/// Node `i` depends on node `j` when `j > i` and bit `j` of its mask is set,
/// which keeps every generated graph acyclic.
fn successors(i: usize, mask: u8) -> Vec<usize> {
    (i + 1..NODES).filter(|j| mask & (1 << j) != 0).collect()
}

fn registry(shape: &[(bool, u8)]) -> TypeRegistry {
    let keys = keys();
    let mut registry = TypeRegistry::new();
    for (i, &(singleton, mask)) in shape.iter().enumerate() {
        let deps = successors(i, mask).into_iter().map(|j| keys[j]).collect();
        registry.register_constructor(InjectConstructor::new(
            keys[i],
            deps,
            Lifetime::from_singleton(singleton),
            BUILDS[i],
        ));
    }
    registry
}

fn reachable(shape: &[(bool, u8)]) -> HashSet<usize> {
    let mut seen = HashSet::new();
    let mut queue = VecDeque::from([0]);
    while let Some(i) = queue.pop_front() {
        if seen.insert(i) {
            queue.extend(successors(i, shape[i].1));
        }
    }
    seen
}

fn graph_shape() -> impl Strategy<Value = Vec<(bool, u8)>> {
    proptest::collection::vec((any::<bool>(), any::<u8>()), NODES)
}

// Property: the model holds each reachable type exactly once, entry point first
proptest! {
    #[test]
    fn model_covers_exactly_the_reachable_types(shape in graph_shape()) {
        let keys = keys();
        let registry = registry(&shape);
        let model = GraphBuilder::new(&registry)
            .build(&[keys[0]], &registry.redirect_map())
            .unwrap();

        let expected: HashSet<TypeKey> = reachable(&shape).into_iter().map(|i| keys[i]).collect();
        let actual: Vec<TypeKey> = model.bindings().iter().map(|b| b.ty()).collect();

        prop_assert_eq!(actual.len(), expected.len());
        prop_assert_eq!(actual.iter().copied().collect::<HashSet<_>>(), expected);
        prop_assert_eq!(actual[0], keys[0]);
    }
}

// Property: building twice from the same inputs yields identical models
proptest! {
    #[test]
    fn model_is_deterministic(shape in graph_shape()) {
        let keys = keys();
        let registry = registry(&shape);
        let builder = GraphBuilder::new(&registry);

        let first = builder.build(&[keys[0]], &registry.redirect_map()).unwrap();
        let second = builder.build(&[keys[0]], &registry.redirect_map()).unwrap();
        prop_assert_eq!(first, second);
    }
}

fn assert_lifetimes(container: &Container, shape: &[(bool, u8)]) -> Result<(), TestCaseError> {
    let keys = keys();
    for i in reachable(shape) {
        let a = container.resolve_any(&keys[i]).unwrap();
        let b = container.resolve_any(&keys[i]).unwrap();
        prop_assert_eq!(Arc::ptr_eq(&a, &b), shape[i].0, "{}", keys[i]);
    }
    Ok(())
}

// Property: singletons are unique per container and transients are fresh,
// through both the reflective and the static provider
proptest! {
    #[test]
    fn lifetimes_hold_on_both_provider_paths(shape in graph_shape()) {
        let keys = keys();
        let registry = Arc::new(registry(&shape));

        let reflective = Container::new(vec![Arc::new(ReflectiveLookup::from_shared(registry.clone()))]);
        assert_lifetimes(&reflective, &shape)?;

        let model = GraphBuilder::new(&*registry)
            .build(&[keys[0]], &registry.redirect_map())
            .unwrap();
        let table = StaticTable::from_model(&model, &*registry).unwrap();
        prop_assert_eq!(table.len(), model.len());

        let generated = Container::new(vec![Arc::new(table)]);
        assert_lifetimes(&generated, &shape)?;
    }
}
