//! # Resolution Benchmarks
//!
//! Performance benchmarks for the equivalence engine and aggregator.
//!
//! Run with: `cargo bench -p convalida-core`

use convalida_core::{
    Course, CourseCode, Curriculum, EquivalenceEngine, ProgressAggregator, Rule, RuleKind,
    Snapshot,
};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::collections::BTreeSet;
use std::hint::black_box;

/// Destination of `size` courses and one 1:1 rule per course.
fn synthetic(size: usize) -> (Curriculum, Vec<Rule>, BTreeSet<CourseCode>) {
    let courses = (0..size)
        .map(|i| Course::new(format!("D{}", i), "Course", "FD", 5, (i % 10) as u32 + 1))
        .collect();
    let rules = (0..size)
        .map(|i| Rule {
            id: format!("R{}", i),
            kind: if i % 4 == 3 {
                RuleKind::Partial
            } else {
                RuleKind::OneToOne
            },
            sources: vec![CourseCode::new(format!("O{}", i))],
            targets: vec![CourseCode::new(format!("D{}", i))],
            coverage: Some(100),
            note: None,
        })
        .collect();
    let completed = (0..size)
        .step_by(2)
        .map(|i| CourseCode::new(format!("O{}", i)))
        .collect();
    (Curriculum::new("dst", "Destination", courses), rules, completed)
}

// =============================================================================
// BENCHMARKS
// =============================================================================

fn bench_resolve_sample(c: &mut Criterion) {
    let (store, _) = Snapshot::sample().expect("sample").into_parts();
    let completed: BTreeSet<_> = store
        .origin()
        .courses
        .iter()
        .map(|course| course.code.clone())
        .collect();

    c.bench_function("resolve_icoc_sample_all_completed", |b| {
        b.iter(|| {
            EquivalenceEngine::resolve(
                black_box(&completed),
                black_box(store.rules()),
                black_box(store.destination()),
            )
        });
    });
}

fn bench_resolve_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve_scaling");

    for size in [100, 1_000, 5_000] {
        let (destination, rules, completed) = synthetic(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                EquivalenceEngine::resolve(
                    black_box(&completed),
                    black_box(&rules),
                    black_box(&destination),
                )
            });
        });
    }

    group.finish();
}

fn bench_aggregate(c: &mut Criterion) {
    let (destination, rules, completed) = synthetic(1_000);
    let resolution = EquivalenceEngine::resolve(&completed, &rules, &destination);

    c.bench_function("aggregate_1000", |b| {
        b.iter(|| {
            ProgressAggregator::aggregate(black_box(&destination), black_box(&resolution.satisfied))
        });
    });
}

criterion_group!(
    benches,
    bench_resolve_sample,
    bench_resolve_scaling,
    bench_aggregate
);
criterion_main!(benches);
