#![no_main]

use dictor::{
    key_of, AnyArc, Arguments, Container, DiError, DiResult, GraphBuilder, InjectConstructor,
    Lifetime, ReflectiveLookup, ResolverCore, StaticTable, TypeKey, TypeRegistry,
};
use libfuzzer_sys::fuzz_target;
use std::sync::Arc;

const NODES: usize = 8;

struct Node<const N: usize>;

fn build<const N: usize>(_args: &mut Arguments) -> DiResult<AnyArc> {
    Ok(Arc::new(Node::<N>) as AnyArc)
}

type Build = fn(&mut Arguments) -> DiResult<AnyArc>;

const BUILDS: [Build; NODES] = [
    build::<0>, build::<1>, build::<2>, build::<3>,
    build::<4>, build::<5>, build::<6>, build::<7>,
];

fn keys() -> [TypeKey; NODES] {
    [
        key_of::<Node<0>>(), key_of::<Node<1>>(), key_of::<Node<2>>(), key_of::<Node<3>>(),
        key_of::<Node<4>>(), key_of::<Node<5>>(), key_of::<Node<6>>(), key_of::<Node<7>>(),
    ]
}

// Byte i: bit 7 selects singleton, bits 0 to 6 pick dependencies among nodes
// 0 to 6. Self and back edges are allowed, so cycles are common.
fuzz_target!(|data: &[u8]| {
    if data.len() < NODES {
        return;
    }

    let keys = keys();
    let mut registry = TypeRegistry::new();
    for (i, &byte) in data[..NODES].iter().enumerate() {
        let deps = (0..NODES - 1)
            .filter(|bit| byte & (1 << bit) != 0)
            .map(|bit| keys[bit])
            .collect();
        registry.register_constructor(InjectConstructor::new(
            keys[i],
            deps,
            Lifetime::from_singleton(byte & 0x80 != 0),
            BUILDS[i],
        ));
    }

    let entry = keys[data.get(NODES).map_or(0, |b| *b as usize % NODES)];
    let registry = Arc::new(registry);
    let built = GraphBuilder::new(&*registry).build(&[entry], &registry.redirect_map());

    let container = Container::new(vec![Arc::new(ReflectiveLookup::from_shared(registry.clone()))]);
    let resolved = container.resolve_any(&entry);

    match built {
        Ok(model) => {
            assert!(resolved.is_ok());
            assert_eq!(model.bindings()[0].ty(), entry);

            let table = StaticTable::from_model(&model, &*registry).unwrap();
            let generated = Container::new(vec![Arc::new(table)]);
            assert!(generated.resolve_any(&entry).is_ok());
        }
        Err(DiError::Circular(path)) => {
            assert!(path.len() >= 2);
            assert_eq!(path.first(), path.last());
            assert!(matches!(resolved, Err(DiError::Circular(_))));
        }
        Err(other) => panic!("unexpected build error: {}", other),
    }
});
