//! Benchmark profiles for the drift engine.
//!
//! Provides pre-built trajectory profiles for benchmarks and examples:
//!
//! - [`reference_profile`]: 100-node periodic domain, 20K events
//! - [`stress_profile`]: 400-node periodic domain, 200K events
//! - [`trial_nodes`]: deterministic sequence of nodes to perturb

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::f64::consts::PI;

use drift_core::{Event, FieldId};
use drift_field::{CubicField, FieldStore};
use drift_test_utils::{events_from_trajectory, periodic_grid, simulate, Langevin};

/// Fields and events sampled from them.
pub struct Profile {
    /// Holds the diffusivity and force.
    pub store: FieldStore,
    /// Diffusivity field.
    pub diffusivity: FieldId,
    /// Force field.
    pub force: FieldId,
    /// Events from one long trajectory.
    pub events: Vec<Event>,
    /// Lag between samples.
    pub lag: f64,
}

fn profile(nodes: usize, dr: f64, events: usize, lag: f64, seed: u64) -> Profile {
    let grid = periodic_grid(nodes, dr);
    let k = 2.0 * PI / grid.length();
    let mut store = FieldStore::new();
    let diffusivity = store.push(CubicField::from_fn(grid, |x| 1.0 + 0.3 * (k * x).sin()));
    let force = store.push(CubicField::from_fn(grid, |x| 2.0 * (2.0 * k * x).cos()));

    let model = Langevin {
        diffusivity: &store[diffusivity],
        force: &store[force],
        kt: 1.0,
        dt: lag,
    };
    let xs = simulate(&model, 0.5 * grid.length(), events, seed);
    let events = events_from_trajectory(&xs, lag, 1).unwrap_or_default();
    Profile {
        store,
        diffusivity,
        force,
        events,
        lag,
    }
}

/// 100 nodes spaced 0.1 apart, 20K events at lag 0.001.
pub fn reference_profile(seed: u64) -> Profile {
    profile(100, 0.1, 20_000, 0.001, seed)
}

/// 400 nodes spaced 0.05 apart, 200K events at lag 0.001.
pub fn stress_profile(seed: u64) -> Profile {
    profile(400, 0.05, 200_000, 0.001, seed)
}

/// `count` node indices below `nodes`, deterministic in `seed`.
pub fn trial_nodes(nodes: usize, count: usize, seed: u64) -> Vec<usize> {
    (0..count as u64)
        .map(|i| {
            (seed
                .wrapping_mul(6364136223846793005)
                .wrapping_add(i.wrapping_mul(1442695040888963407))
                >> 33) as usize
                % nodes
        })
        .collect()
}
