//! Fetch throughput for factory, singleton and nested dependency chains

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use switchboard_core::prelude::*;

/// Register a linear chain `link0 -> link1 -> ... -> link{depth-1}` of
/// factories ending in a singleton leaf
fn linear_chain(depth: usize) -> Registry {
    let registry = Registry::new();
    for i in 0..depth {
        let next = format!("link{}", i + 1);
        if i + 1 == depth {
            registry.singleton_fn(format!("link{}", i), || 1usize).unwrap();
        } else {
            registry
                .factory(format!("link{}", i), move |f| {
                    f.fetch::<usize>(next.as_str()).map(|v| *v + 1)
                })
                .unwrap();
        }
    }
    registry
}

fn benchmark_leaf_fetch(c: &mut Criterion) {
    let registry = Registry::new();
    registry
        .factory_fn("factory", || 42u64)
        .unwrap()
        .singleton_fn("singleton", || 42u64)
        .unwrap();

    let mut group = c.benchmark_group("leaf_fetch");
    group.bench_function("factory", |b| {
        b.iter(|| registry.fetch::<u64>(black_box("factory")).unwrap())
    });
    group.bench_function("singleton", |b| {
        b.iter(|| registry.fetch::<u64>(black_box("singleton")).unwrap())
    });
    group.finish();
}

fn benchmark_chain_depth(c: &mut Criterion) {
    let mut group = c.benchmark_group("chain_depth");

    for depth in [2, 8, 32, 128].iter() {
        let registry = linear_chain(*depth);
        group.bench_with_input(BenchmarkId::new("linear", depth), depth, |b, &depth| {
            b.iter(|| {
                let value = registry.fetch::<usize>("link0").unwrap();
                assert_eq!(*value, depth);
            })
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_leaf_fetch, benchmark_chain_depth);
criterion_main!(benches);
