//! Benchmarks for Algoscope step producers
//!
//! Measures:
//! - Draining each sort over reversed arrays of growing size
//! - Folding a full step sequence into visual state
//! - Shortest paths over the default weighted graph

use algoscope_graph::{Graph, NodeId};
use algoscope_steps::{drain, run_to_end, Scenario, SortAlgorithm, VisualState};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

fn reversed(n: usize) -> Vec<i64> {
    (0..n as i64).rev().collect()
}

/// Pull every step of each sort
fn bench_sort_drain(c: &mut Criterion) {
    let mut group = c.benchmark_group("sort_drain");

    for algorithm in [
        SortAlgorithm::Bubble,
        SortAlgorithm::Insertion,
        SortAlgorithm::Merge,
        SortAlgorithm::Quick,
        SortAlgorithm::Heap,
    ] {
        for &n in &[8usize, 30, 120] {
            let scenario = Scenario::sort(algorithm, reversed(n));
            group.throughput(Throughput::Elements(n as u64));
            group.bench_with_input(
                BenchmarkId::new(scenario.name(), n),
                &scenario,
                |b, s| b.iter(|| drain(black_box(s.build().as_mut())).map(|steps| steps.len())),
            );
        }
    }
    group.finish();
}

/// Fold a precomputed sequence, as a seek to the end would
fn bench_fold(c: &mut Criterion) {
    let mut group = c.benchmark_group("fold");

    for &n in &[30usize, 120] {
        let scenario = Scenario::sort(SortAlgorithm::Quick, reversed(n));
        let steps = drain(scenario.build().as_mut()).unwrap_or_default();
        group.throughput(Throughput::Elements(steps.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &steps, |b, steps| {
            b.iter(|| VisualState::fold(scenario.baseline(), black_box(steps)))
        });
    }
    group.finish();
}

fn bench_dijkstra(c: &mut Criterion) {
    let graph = Graph::weighted_default();
    let scenario = Scenario::shortest_path(&graph, Some(NodeId(1)), Some(NodeId(5)));

    c.bench_function("dijkstra_default_graph", |b| {
        b.iter(|| {
            scenario
                .as_ref()
                .ok()
                .map(|s| run_to_end(s.build().as_mut(), s.baseline()))
        })
    });
}

criterion_group!(benches, bench_sort_drain, bench_fold, bench_dijkstra);

criterion_main!(benches);
