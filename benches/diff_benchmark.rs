//! Diffing engine benchmark: Measure edit script computation.
//!
//! Target: < 1ms for a 1000-row list with scattered edits

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use flywheel_list::{compute_diff, EqComparator, KeyComparator};

/// Create a list of distinct rows for benchmarking.
fn create_rows(len: usize) -> Vec<u64> {
    (0..len as u64).collect()
}

/// Remove every `stride`-th row and insert a fresh one next to it.
fn scatter_edits(rows: &[u64], stride: usize) -> Vec<u64> {
    let mut next = rows.len() as u64 + 1_000_000;
    let mut out = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        if i % stride == 0 {
            out.push(next);
            next += 1;
        } else {
            out.push(*row);
        }
    }
    out
}

fn diff_identical_lists(c: &mut Criterion) {
    let old = create_rows(1000);
    let new = old.clone();

    c.bench_function("diff_1000_identical", |b| {
        b.iter(|| compute_diff(black_box(&old), black_box(&new), &EqComparator, true))
    });
}

fn diff_single_insert(c: &mut Criterion) {
    let old = create_rows(1000);
    let mut new = old.clone();
    // Insert a single row in the middle
    new.insert(500, u64::MAX);

    c.bench_function("diff_1000_single_insert", |b| {
        b.iter(|| compute_diff(black_box(&old), black_box(&new), &EqComparator, true))
    });
}

fn diff_scattered_edits(c: &mut Criterion) {
    let old = create_rows(1000);
    let new = scatter_edits(&old, 10);

    c.bench_function("diff_1000_scattered", |b| {
        b.iter(|| compute_diff(black_box(&old), black_box(&new), &EqComparator, true))
    });
}

fn diff_reversed(c: &mut Criterion) {
    let old = create_rows(500);
    let new: Vec<u64> = old.iter().rev().copied().collect();

    let mut group = c.benchmark_group("diff_500_reversed");
    group.bench_function("with_moves", |b| {
        b.iter(|| compute_diff(black_box(&old), black_box(&new), &EqComparator, true))
    });
    group.bench_function("without_moves", |b| {
        b.iter(|| compute_diff(black_box(&old), black_box(&new), &EqComparator, false))
    });
    group.finish();
}

fn diff_keyed_rows(c: &mut Criterion) {
    let old: Vec<(u64, String)> = create_rows(1000)
        .into_iter()
        .map(|id| (id, format!("row {id}")))
        .collect();
    let mut new = old.clone();
    for row in new.iter_mut().step_by(7) {
        row.1.push_str(" (edited)");
    }
    let comparator = KeyComparator::new(|row: &(u64, String)| row.0);

    c.bench_function("diff_1000_keyed_changes", |b| {
        b.iter(|| compute_diff(black_box(&old), black_box(&new), &comparator, true))
    });
}

fn diff_various_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("diff_by_size");

    for len in [100, 1_000, 10_000] {
        let old = create_rows(len);
        let new = scatter_edits(&old, 20);

        group.bench_with_input(
            BenchmarkId::new("scattered", len),
            &(old, new),
            |b, (old, new)| {
                b.iter(|| compute_diff(black_box(old), black_box(new), &EqComparator, true))
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    diff_identical_lists,
    diff_single_insert,
    diff_scattered_edits,
    diff_reversed,
    diff_keyed_rows,
    diff_various_sizes,
);
criterion_main!(benches);
