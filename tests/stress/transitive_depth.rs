//! Long dependency chains and stacked diamonds.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use lazymod::test_utils::{CallCounter, recording_factory};
use lazymod::{Container, ContainerError, Dependencies, Factory};

const DEPTH: usize = 200;

/// `level0 -> level1 -> ... -> level{depth-1}`, each appending one character.
fn linear_chain(depth: usize, counter: &CallCounter) -> Container {
    let container = Container::new();
    for i in 0..depth {
        let name = format!("level{i}");
        if i + 1 < depth {
            let next = format!("level{}", i + 1);
            container.register(&name, ([next.as_str()], recording_factory(".", counter))).unwrap();
        } else {
            container.register(&name, recording_factory("leaf", counter)).unwrap();
        }
    }
    container
}

#[tokio::test]
async fn test_deep_linear_chain() {
    let counter = CallCounter::new();
    let container = linear_chain(DEPTH, &counter);

    let start = Instant::now();
    let top = container.resolve_as::<String>("level0").await.unwrap();
    println!("Resolved a chain of {DEPTH} in {:?}", start.elapsed());

    assert_eq!(*top, format!("leaf{}", ".".repeat(DEPTH - 1)));
    assert_eq!(counter.get(), DEPTH);
    assert_eq!(container.plan("level0").unwrap(), Vec::<String>::new());
}

#[tokio::test]
async fn test_chain_resolved_from_the_middle_first() {
    let counter = CallCounter::new();
    let container = linear_chain(DEPTH, &counter);

    container.resolve("level100").await.unwrap();
    assert_eq!(counter.get(), DEPTH - 100);

    assert_eq!(container.plan("level0").unwrap().len(), 100);
    container.resolve("level0").await.unwrap();
    assert_eq!(counter.get(), DEPTH);
}

/// Sums its `u64` dependencies, or yields 1 without any, counting calls.
fn summing(calls: &Arc<AtomicUsize>) -> Factory {
    let calls = Arc::clone(calls);
    Factory::new(move |deps: Dependencies| {
        calls.fetch_add(1, Ordering::SeqCst);
        if deps.is_empty() {
            return Ok::<_, ContainerError>(1u64);
        }
        let mut total = 0u64;
        for index in 0..deps.len() {
            total += *deps.get::<u64>(index)?;
        }
        Ok(total)
    })
}

/// `d{i}` depends on both `l{i-1}` and `r{i-1}`, which both depend on `d{i-1}`.
#[tokio::test]
async fn test_stacked_diamonds() {
    const LAYERS: usize = 50;
    let calls = Arc::new(AtomicUsize::new(0));
    let container = Container::new();
    container.register("d0", summing(&calls)).unwrap();
    for i in 1..=LAYERS {
        let below = format!("d{}", i - 1);
        let left = format!("l{}", i - 1);
        let right = format!("r{}", i - 1);
        container.register(&left, ([below.as_str()], summing(&calls))).unwrap();
        container.register(&right, ([below.as_str()], summing(&calls))).unwrap();
        container.register(&format!("d{i}"), ([left.as_str(), right.as_str()], summing(&calls))).unwrap();
    }

    let start = Instant::now();
    let top = container.resolve_as::<u64>(&format!("d{LAYERS}")).await.unwrap();
    println!("Resolved {LAYERS} stacked diamonds in {:?}", start.elapsed());

    // the value doubles per layer while every module is built once
    assert_eq!(*top, 1u64 << LAYERS);
    assert_eq!(calls.load(Ordering::SeqCst), 1 + 3 * LAYERS);
}

#[tokio::test]
async fn test_cycle_at_the_bottom_of_a_chain() {
    let counter = CallCounter::new();
    let container = Container::new();
    for i in 0..DEPTH {
        let next = format!("c{}", i + 1);
        container.register(&format!("c{i}"), ([next.as_str()], recording_factory("", &counter))).unwrap();
    }
    container
        .register(&format!("c{DEPTH}"), ([format!("c{}", DEPTH - 2).as_str()], recording_factory("", &counter)))
        .unwrap();

    let err = container.resolve("c0").await.unwrap_err();
    assert_eq!(
        err,
        ContainerError::CircularDependency {
            chain: format!("c{} -> c{} -> c{} -> c{}", DEPTH - 2, DEPTH - 1, DEPTH, DEPTH - 2)
        }
    );
    assert_eq!(counter.get(), 0);
}
