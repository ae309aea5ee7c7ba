//! Wide graphs and heavy concurrency.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use lazymod::test_utils::{CallCounter, init_test_logging, recording_factory};
use lazymod::{Container, ContainerError, Definition, Dependencies, Factory};
use serial_test::serial;

const WIDTH: usize = 500;

/// `root` depends on `m0..m{WIDTH}`, each of which depends on `base`.
fn fan_out(counter: &CallCounter) -> Container {
    let container = Container::new();
    container.register("base", recording_factory("x", counter)).unwrap();

    let mut names = Vec::with_capacity(WIDTH);
    for i in 0..WIDTH {
        let name = format!("m{i}");
        container.register(&name, (["base"], recording_factory("", counter))).unwrap();
        names.push(name);
    }
    container
        .register("root", Definition::depends_on(names).with_factory(recording_factory("!", counter)))
        .unwrap();
    container
}

#[tokio::test]
#[serial]
async fn test_wide_fan_out() {
    init_test_logging(None);
    let counter = CallCounter::new();
    let container = fan_out(&counter);

    let start = Instant::now();
    let root = container.resolve_as::<String>("root").await.unwrap();
    println!("Resolved {} modules in {:?}", WIDTH + 2, start.elapsed());

    assert_eq!(root.len(), WIDTH + 1);
    assert_eq!(counter.get(), WIDTH + 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
#[serial]
async fn test_many_concurrent_resolutions() {
    let counter = CallCounter::new();
    let container = fan_out(&counter);

    let start = Instant::now();
    let handles: Vec<_> = (0..WIDTH)
        .map(|i| {
            let container = container.clone();
            tokio::spawn(async move { container.resolve_as::<String>(&format!("m{}", WIDTH - 1 - i)).await })
        })
        .collect();

    for handle in handles {
        assert_eq!(*handle.await.unwrap().unwrap(), "x");
    }
    println!("{WIDTH} concurrent resolutions in {:?}", start.elapsed());

    // base once plus every middle module once
    assert_eq!(counter.get(), WIDTH + 1);

    container.resolve("root").await.unwrap();
    assert_eq!(counter.get(), WIDTH + 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_contended_slow_module() {
    let calls = Arc::new(AtomicUsize::new(0));
    let container = Container::new();
    let seen = Arc::clone(&calls);
    container
        .register(
            "slow",
            Factory::new_async(move |_: Dependencies| {
                seen.fetch_add(1, Ordering::SeqCst);
                async {
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    Ok::<_, ContainerError>(7u64)
                }
            }),
        )
        .unwrap();

    let handles: Vec<_> = (0..200)
        .map(|_| {
            let container = container.clone();
            tokio::spawn(async move { container.resolve_as::<u64>("slow").await })
        })
        .collect();

    let results = tokio::time::timeout(Duration::from_secs(30), futures::future::join_all(handles))
        .await
        .expect("contended resolution timed out");
    for result in results {
        assert_eq!(*result.unwrap().unwrap(), 7);
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_large_cycle_is_detected() {
    let container = Container::new();
    for i in 0..WIDTH {
        let next = format!("n{}", (i + 1) % WIDTH);
        container
            .register(&format!("n{i}"), ([next.as_str()], Factory::new(|_| Ok::<_, ContainerError>(()))))
            .unwrap_or_else(|e| panic!("register n{i}: {e}"));
    }

    let err = container.resolve("n0").await.unwrap_err();
    let ContainerError::CircularDependency { chain } = err else {
        panic!("expected a cycle, got {err}");
    };
    assert!(chain.starts_with("n0 -> n1 -> "));
    assert!(chain.ends_with(&format!("n{} -> n0", WIDTH - 1)));
}
