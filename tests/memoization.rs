//! Singleton memoization through the container: uniqueness, freshness and
//! retry after a failed construction.

use dictor::{
    factory_fn, memoize, Container, DiError, Factory, Memoized, Resolver, StaticTable, TypeKey,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

struct Connection {
    attempt: usize,
}

struct Repository {
    connection: Arc<Connection>,
}

struct Handler {
    repository: Arc<Repository>,
    connection: Arc<Connection>,
}

fn flaky_table(attempts: Arc<AtomicUsize>) -> StaticTable {
    let mut table = StaticTable::new();
    table.install_singleton(move |_| match attempts.fetch_add(1, Ordering::SeqCst) {
        0 => Err(DiError::construction::<Connection>("database unavailable")),
        attempt => Ok(Connection { attempt }),
    });
    table.install(|r| {
        Ok(Repository {
            connection: r.resolve::<Connection>()?,
        })
    });
    table.install(|r| {
        Ok(Handler {
            repository: r.resolve::<Repository>()?,
            connection: r.resolve::<Connection>()?,
        })
    });
    table
}

#[test]
fn test_failed_singleton_is_retried_then_fixed() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let container = Container::new(vec![Arc::new(flaky_table(attempts.clone()))]);

    let first = container.resolve::<Handler>().err().unwrap();
    assert!(matches!(first, DiError::Construction(_, ref msg) if msg == "database unavailable"));

    let handler = container.resolve::<Handler>().unwrap();
    assert_eq!(handler.connection.attempt, 1);

    let again = container.resolve::<Connection>().unwrap();
    assert!(Arc::ptr_eq(&again, &handler.connection));
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[test]
fn test_singleton_is_shared_transitively() {
    let attempts = Arc::new(AtomicUsize::new(1));
    let container = Container::new(vec![Arc::new(flaky_table(attempts))]);

    let handler = container.resolve::<Handler>().unwrap();
    assert!(Arc::ptr_eq(&handler.connection, &handler.repository.connection));

    let other = container.resolve::<Handler>().unwrap();
    assert!(!Arc::ptr_eq(&handler, &other));
    assert!(!Arc::ptr_eq(&handler.repository, &other.repository));
    assert!(Arc::ptr_eq(&handler.connection, &other.connection));
}

#[test]
fn test_memoized_ignores_the_resolver_after_first_success() {
    let memo = Arc::new(Memoized::new(factory_fn::<String, _>(|r| {
        Ok(format!("{} values", r.resolve::<u8>()?))
    })));

    let mut table = StaticTable::new();
    table.install_instance(3u8);
    let first = Container::new(vec![Arc::new(table)]);
    let empty = Container::new(Vec::new());

    assert!(memo.produce(&empty).is_err());
    assert!(!memo.is_computed());

    let value = memo.produce(&first).unwrap();
    let cached = memo.produce(&empty).unwrap();
    assert!(Arc::ptr_eq(&value, &cached));
    assert_eq!(&*cached.downcast::<String>().unwrap(), "3 values");
}

#[test]
fn test_install_factory_with_erased_memoization() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let factory = memoize(factory_fn::<u32, _>(move |_| {
        Ok(counter.fetch_add(1, Ordering::SeqCst) as u32)
    }));
    assert!(factory.is_memoized());

    let mut table = StaticTable::new();
    table.install_factory(TypeKey::of::<u32>(), factory);
    let container = Container::new(vec![Arc::new(table)]);

    for _ in 0..5 {
        assert_eq!(*container.resolve::<u32>().unwrap(), 0);
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
