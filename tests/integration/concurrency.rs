use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use lazymod::{Container, ContainerError, Definition, Dependencies, Factory, factory};

/// A slow async factory that counts its invocations.
fn slow_counted(label: &'static str, calls: &Arc<AtomicUsize>) -> Factory {
    let calls = Arc::clone(calls);
    Factory::new_async(move |deps: Dependencies| {
        calls.fetch_add(1, Ordering::SeqCst);
        async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            let mut value = String::new();
            for index in 0..deps.len() {
                value.push_str(&deps.get::<String>(index)?);
            }
            value.push_str(label);
            Ok::<_, ContainerError>(value)
        }
    })
}

#[tokio::test]
async fn test_interleaved_resolutions_share_in_flight_module() {
    let calls = Arc::new(AtomicUsize::new(0));
    let container = Container::new();
    container.register("shared", slow_counted("shared", &calls)).unwrap();

    let (first, second) = tokio::join!(container.resolve("shared"), container.resolve("shared"));
    let (first, second) = (first.unwrap(), second.unwrap());

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_resolutions_across_tasks() {
    let calls = Arc::new(AtomicUsize::new(0));
    let container = Container::new();
    container.register("base", slow_counted("base", &calls)).unwrap();
    for i in 0..8 {
        let name = format!("leaf{i}");
        container
            .register(&name, Definition::depends_on(["base"]).with_factory(slow_counted("!", &calls)))
            .unwrap();
    }

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let container = container.clone();
            tokio::spawn(async move { container.resolve_as::<String>(&format!("leaf{i}")).await })
        })
        .collect();

    for handle in handles {
        assert_eq!(*handle.await.unwrap().unwrap(), "base!");
    }
    // base once, every leaf once
    assert_eq!(calls.load(Ordering::SeqCst), 9);
}

#[tokio::test]
async fn test_overlapping_diamonds() {
    let calls = Arc::new(AtomicUsize::new(0));
    let container = Container::new();
    container.register("a", slow_counted("a", &calls)).unwrap();
    container.register("b", (["a"], slow_counted("b", &calls))).unwrap();
    container.register("c", (["a", "b"], slow_counted("c", &calls))).unwrap();
    container.register("d", (["b", "a"], slow_counted("d", &calls))).unwrap();

    let (c, d) = tokio::join!(container.resolve_as::<String>("c"), container.resolve_as::<String>("d"));
    assert_eq!(*c.unwrap(), "aabc");
    assert_eq!(*d.unwrap(), "abad");
    assert_eq!(calls.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn test_waiters_all_see_the_failure() {
    let container = Container::new();
    container
        .register(
            "broken",
            Factory::new_async(|_| async {
                tokio::time::sleep(Duration::from_millis(10)).await;
                Err::<(), _>(anyhow::anyhow!("connection refused"))
            }),
        )
        .unwrap();

    let (first, second) = tokio::join!(container.resolve("broken"), container.resolve("broken"));
    let first = first.unwrap_err();
    assert_eq!(first, second.unwrap_err());
    assert!(matches!(first, ContainerError::FactoryFailed { ref reason, .. } if reason == "connection refused"));
    assert!(!container.is_resolved("broken"));
}

#[tokio::test]
async fn test_concurrent_cycle_does_not_hang() {
    let container = Container::new();
    container.register("a", factory!(|b: String| format!("{b}a"))).unwrap();
    container.register("b", factory!(|a: String| format!("{a}b"))).unwrap();

    let result = tokio::time::timeout(Duration::from_secs(5), async {
        tokio::join!(container.resolve("a"), container.resolve("b"))
    })
    .await
    .expect("cyclic resolution must not hang");

    assert!(matches!(result.0, Err(ContainerError::CircularDependency { .. })));
    assert!(matches!(result.1, Err(ContainerError::CircularDependency { .. })));
}

#[tokio::test]
async fn test_independent_resolutions_in_flight() {
    let calls = Arc::new(AtomicUsize::new(0));
    let container = Container::new();
    container.register("x", slow_counted("x", &calls)).unwrap();
    container.register("y", slow_counted("y", &calls)).unwrap();

    let (x, y) = tokio::join!(container.resolve_as::<String>("x"), container.resolve_as::<String>("y"));
    assert_eq!(*x.unwrap(), "x");
    assert_eq!(*y.unwrap(), "y");
    assert!(container.is_resolved("x") && container.is_resolved("y"));
}
