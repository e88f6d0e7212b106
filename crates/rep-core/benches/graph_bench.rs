//! # Graph Benchmarks
//!
//! Performance benchmarks for rep-core graph operations.
//!
//! Run with: `cargo bench -p rep-core`

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rep_core::{
    Cell, ConstraintSolver, Identifier, RepIntegrityChecker, RepSerializer, RepStruct,
    RepValidator,
};
use std::hint::black_box;

fn id(n: usize) -> Identifier {
    Identifier::from_u128(n as u128)
}

/// Create a graph with N cells, each pointing at the next.
fn create_chain(size: usize) -> RepStruct {
    let mut rep = RepStruct::new("chain");
    for i in 0..size {
        let mut cell = Cell::new(id(i)).with_data("index", i as i64);
        if i + 1 < size {
            cell = cell.with_port("next", id(i + 1));
        }
        rep = rep.adding(cell);
    }
    rep
}

/// Create a graph with a hub pointing at N-1 spokes.
fn create_star(size: usize) -> RepStruct {
    let mut hub = Cell::new(id(0));
    let mut rep = RepStruct::new("star");
    for i in 1..size {
        hub = hub.with_port(format!("spoke{i}"), id(i));
        rep = rep.adding(Cell::new(id(i)));
    }
    rep.adding(hub)
}

// =============================================================================
// BENCHMARKS
// =============================================================================

fn bench_adding(c: &mut Criterion) {
    let mut group = c.benchmark_group("adding");

    for size in [100, 1000, 10000].iter() {
        let rep = create_chain(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            b.iter(|| black_box(rep.adding(Cell::new(id(size + 1)))));
        });
    }

    group.finish();
}

fn bench_removing(c: &mut Criterion) {
    let mut group = c.benchmark_group("removing");

    for size in [100, 1000, 10000].iter() {
        let chain = create_chain(*size);
        let star = create_star(*size);

        group.bench_with_input(BenchmarkId::new("chain", size), size, |b, &size| {
            b.iter(|| black_box(chain.removing(id(size / 2))));
        });
        group.bench_with_input(BenchmarkId::new("star_spoke", size), size, |b, _| {
            b.iter(|| black_box(star.removing(id(1))));
        });
    }

    group.finish();
}

fn bench_validate(c: &mut Criterion) {
    let mut group = c.benchmark_group("validate");

    for size in [100, 1000, 10000].iter() {
        let rep = create_chain(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(RepValidator::validate(&rep)));
        });
    }

    group.finish();
}

fn bench_integrity(c: &mut Criterion) {
    let mut group = c.benchmark_group("integrity_check");

    for size in [100, 1000, 10000].iter() {
        let rep = create_chain(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(RepIntegrityChecker::check(&rep)));
        });
    }

    group.finish();
}

fn bench_order_cells(c: &mut Criterion) {
    let mut group = c.benchmark_group("order_cells");

    for size in [100, 1000, 10000].iter() {
        let rep = create_chain(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(ConstraintSolver::order_cells(&rep)));
        });
    }

    group.finish();
}

fn bench_serialize(c: &mut Criterion) {
    let mut group = c.benchmark_group("serialize");

    for size in [100, 500, 1000].iter() {
        let rep = create_chain(*size);

        group.bench_with_input(BenchmarkId::new("json", size), size, |b, _| {
            b.iter(|| black_box(RepSerializer::to_json(&rep)));
        });
        group.bench_with_input(BenchmarkId::new("bytes", size), size, |b, _| {
            b.iter(|| black_box(RepSerializer::to_bytes(&rep)));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_adding,
    bench_removing,
    bench_validate,
    bench_integrity,
    bench_order_cells,
    bench_serialize,
);

criterion_main!(benches);
