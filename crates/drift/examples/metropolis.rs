//! Metropolis fit of diffusivity and force to a synthetic trajectory.
//!
//! Demonstrates: sample a trajectory from known fields → start from flat
//! guesses → propose one node at a time → accept or reject on the cost
//! change → compare the fit with the truth.

use std::f64::consts::PI;

use drift::prelude::*;
use drift_test_utils::{events_from_trajectory, periodic_grid, simulate, Langevin};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

fn gaussian(rng: &mut ChaCha8Rng) -> f64 {
    let u1: f64 = rng.random::<f64>().max(1e-300);
    let u2: f64 = rng.random();
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

fn rms(a: &[f64], b: &[f64]) -> f64 {
    let sum: f64 = a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum();
    (sum / a.len() as f64).sqrt()
}

fn main() {
    println!("=== drift Metropolis Example ===\n");

    // --- Synthetic data from known fields ---
    let grid = periodic_grid(20, 0.5);
    let k = 2.0 * PI / grid.length();
    let true_d = CubicField::from_fn(grid, |x| 1.0 + 0.4 * (k * x).sin());
    let true_f = CubicField::from_fn(grid, |x| 1.5 * (k * x).cos());
    let lag = 0.01;
    let model = Langevin {
        diffusivity: &true_d,
        force: &true_f,
        kt: 1.0,
        dt: lag,
    };
    let xs = simulate(&model, 5.0, 100_000, 42);
    let events = events_from_trajectory(&xs, lag, 1).unwrap();
    println!("{} events at lag {lag}", events.len());

    // --- Flat starting guesses ---
    let mut store = FieldStore::new();
    let d = store.push(CubicField::uniform(grid, 0.5));
    let f = store.push(CubicField::uniform(grid, 0.0));
    let mut cost = ModelSpec::Ccg
        .build(store, &[d, f], events, None, CostConfig::default())
        .unwrap();
    println!("initial cost {:.3}\n", cost.total_cost());

    // --- Sweeps ---
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let steps = [(d, 0.05), (f, 0.2)];
    let (mut accepted, mut proposed) = (0usize, 0usize);

    for sweep in 1..=200 {
        for &(id, size) in &steps {
            for node in 0..grid.len() {
                let old = cost.fields()[id].sample(node).unwrap();
                let trial = TrialMove::new(id, node, old, old + size * gaussian(&mut rng));
                let dc = cost.apply(&trial);
                proposed += 1;
                // An infinite cost change is never accepted.
                if dc <= 0.0 || rng.random::<f64>() < (-dc).exp() {
                    cost.clone_last();
                    accepted += 1;
                } else {
                    cost.restore(&trial);
                }
            }
        }

        if sweep % 40 == 0 {
            let fields = cost.fields();
            println!(
                "  sweep {:>3}: cost={:>12.3}, acceptance={:>5.3}, rms(D)={:.4}, rms(F)={:.4}",
                sweep,
                cost.cached_cost(),
                accepted as f64 / proposed as f64,
                rms(fields[d].samples(), true_d.samples()),
                rms(fields[f].samples(), true_f.samples()),
            );
        }
    }

    // Cached and recomputed totals agree after every commit.
    let gap = (cost.cached_cost() - cost.total_cost()).abs();
    println!("\ncache gap after fit: {gap:.3e}");

    println!("\n  x      D fit   D true   F fit   F true");
    let fields = cost.fields();
    for node in (0..grid.len()).step_by(4) {
        println!(
            "  {:<5.2} {:>7.3} {:>7.3} {:>7.3} {:>7.3}",
            grid.node_position(node),
            fields[d].samples()[node],
            true_d.samples()[node],
            fields[f].samples()[node],
            true_f.samples()[node],
        );
    }
}
