// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Performance benchmarks for scoreparts
//!
//! Run with: cargo bench
//!
//! These benchmarks measure:
//! - Score order ranking on large rosters
//! - Roster moves
//! - Change notification fan-out
//! - Undo snapshot cost

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use scoreparts::model::Instrument;
use scoreparts::{EntityStore, InsertMode, NotationParts, Part, PartId, ScoreOrder};

const FAMILIES: [&str; 8] = [
    "flutes", "oboes", "clarinets", "horns", "trumpets", "percussion", "violins", "violoncellos",
];

fn orchestral() -> ScoreOrder {
    FAMILIES
        .iter()
        .fold(ScoreOrder::new("orchestral", "Orchestral"), |order, family| {
            order.with_family(*family)
        })
        .with_soloists()
}

/// Roster of `size` parts in shuffled family order
fn roster(size: usize) -> EntityStore {
    let mut rng = StdRng::seed_from_u64(7);
    let mut families: Vec<&str> = (0..size).map(|i| FAMILIES[i % FAMILIES.len()]).collect();
    families.shuffle(&mut rng);

    let mut store = EntityStore::new();
    for (i, family) in families.into_iter().enumerate() {
        let instrument = Instrument::new(family, format!("{} {}", family, i))
            .with_family(family)
            .with_staff_count(1 + i % 2);
        let (part, staves) = Part::from_instrument(instrument);
        let _ = store.insert_part(part, staves);
    }
    store
}

/// Benchmark ranking a roster against a score order
fn bench_order_sort(c: &mut Criterion) {
    let mut group = c.benchmark_group("score_order");
    let order = orchestral();

    for size in [16, 128, 1024].iter() {
        let store = roster(*size);
        group.bench_with_input(BenchmarkId::new("sort", size), size, |b, _| {
            b.iter(|| black_box(order.sort(store.part_list())))
        });

        group.bench_with_input(BenchmarkId::new("apply", size), size, |b, _| {
            b.iter_batched(
                || NotationParts::new(store.clone()),
                |mut parts| {
                    let _ = parts.set_score_order(order.clone());
                    black_box(parts.part_list().len())
                },
                criterion::BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

/// Benchmark moving a scattered selection of parts
fn bench_move_parts(c: &mut Criterion) {
    let mut group = c.benchmark_group("move_parts");

    for size in [16, 128, 1024].iter() {
        let store = roster(*size);
        let ids: Vec<PartId> = store.part_ids().to_vec();
        let selection: Vec<PartId> = ids.iter().step_by(3).copied().collect();
        let destination = ids[ids.len() - 1];

        group.bench_with_input(BenchmarkId::new("after_last", size), size, |b, _| {
            b.iter_batched(
                || NotationParts::new(store.clone()),
                |mut parts| {
                    let _ = parts.move_parts(&selection, destination, InsertMode::After);
                    black_box(parts.part_list().len())
                },
                criterion::BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

/// Benchmark notification delivery with many live staff scopes
fn bench_notification_flush(c: &mut Criterion) {
    let mut group = c.benchmark_group("notifications");

    for size in [16, 128].iter() {
        let store = roster(*size);
        group.bench_with_input(BenchmarkId::new("toggle_visible", size), size, |b, _| {
            let mut parts = NotationParts::new(store.clone());
            let staff_ids = parts.store().staff_ids();
            let subscriptions: Vec<_> = staff_ids
                .iter()
                .filter_map(|id| parts.subscribe_staff(*id).ok())
                .collect();
            let structure = parts.subscribe_structure();
            let target = staff_ids[0];
            let mut visible = true;

            b.iter(|| {
                visible = !visible;
                let _ = parts.set_staff_visible(target, visible);
                black_box(structure.recv_all().len())
            });
            black_box(subscriptions.len());
        });
    }

    group.finish();
}

/// Benchmark snapshotting the store for undo
fn bench_undo_snapshot(c: &mut Criterion) {
    let store = roster(512);
    c.bench_function("undo_snapshot_512", |b| b.iter(|| black_box(store.clone())));
}

criterion_group!(
    benches,
    bench_order_sort,
    bench_move_parts,
    bench_notification_flush,
    bench_undo_snapshot,
);

criterion_main!(benches);
