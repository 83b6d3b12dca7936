//! Criterion benchmarks for whole and incremental cost evaluation.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use drift_bench::{reference_profile, stress_profile, trial_nodes};
use drift_core::TrialMove;
use drift_cost::{Ccg, CostConfig, CostEngine, CostModel};
use drift_field::Field;

fn engine(p: drift_bench::Profile) -> CostEngine<Ccg> {
    CostEngine::new(
        Ccg::new(p.diffusivity, p.force),
        p.store,
        p.events,
        p.diffusivity,
        CostConfig::default(),
    )
    .expect("profile engine")
}

/// Benchmark: full cost over 20K events.
fn bench_total_cost_20k(c: &mut Criterion) {
    let e = engine(reference_profile(42));
    c.bench_function("total_cost_20k", |b| b.iter(|| black_box(e.total_cost())));
}

/// Benchmark: 100 apply/restore trials on the reference profile.
fn bench_trial_cycle_20k(c: &mut Criterion) {
    let mut e = engine(reference_profile(42));
    let d = e.model().fields()[0];
    let nodes = trial_nodes(100, 100, 3);

    c.bench_function("trial_cycle_20k", |b| {
        b.iter(|| {
            for &n in &nodes {
                let old = e.fields()[d].sample(n).unwrap_or(1.0);
                let trial = TrialMove::new(d, n, old, old * 1.05);
                black_box(e.apply(&trial));
                e.restore(&trial);
            }
        });
    });
}

/// Benchmark: one apply/restore trial on 200K events.
fn bench_trial_cycle_200k(c: &mut Criterion) {
    let mut e = engine(stress_profile(42));
    let f = e.model().fields()[1];

    c.bench_function("trial_cycle_200k", |b| {
        b.iter(|| {
            let old = e.fields()[f].sample(200).unwrap_or(0.0);
            let trial = TrialMove::new(f, 200, old, old + 0.1);
            black_box(e.apply(&trial));
            e.restore(&trial);
        });
    });
}

/// Benchmark: rebuild every node cache after a global change.
fn bench_update_local_200k(c: &mut Criterion) {
    let mut e = engine(stress_profile(42));
    c.bench_function("update_local_200k", |b| b.iter(|| black_box(e.update_local())));
}

criterion_group!(
    benches,
    bench_total_cost_20k,
    bench_trial_cycle_20k,
    bench_trial_cycle_200k,
    bench_update_local_200k
);
criterion_main!(benches);
