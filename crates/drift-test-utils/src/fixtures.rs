//! Reusable fixtures.
//!
//! - [`periodic_grid`] / [`clamped_grid`]: unit-spaced grids.
//! - [`sine_store`]: smooth periodic diffusivity and force.
//! - [`three_events`]: hand-placed events on a 10-node periodic domain.
//! - [`simulate`]: seeded overdamped Langevin trajectory.

use std::f64::consts::PI;

use drift_core::{events_from_samples, Event, EventError, FieldId};
use drift_field::{Boundary, CubicField, Field, FieldStore, Grid1D};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

pub fn periodic_grid(n: usize, dr: f64) -> Grid1D {
    Grid1D::new(n, 0.0, dr, Boundary::Periodic).expect("fixture grid")
}

pub fn clamped_grid(n: usize, dr: f64) -> Grid1D {
    Grid1D::new(n, 0.0, dr, Boundary::Clamp).expect("fixture grid")
}

/// A store holding one diffusivity and one force field.
pub struct SineStore {
    pub store: FieldStore,
    pub diffusivity: FieldId,
    pub force: FieldId,
}

/// `D(x) = 1 + 0.3 sin(2 pi x / L)` and `F(x) = 0.5 cos(2 pi x / L)` on a
/// periodic grid of `n` unit cells.
pub fn sine_store(n: usize) -> SineStore {
    let grid = periodic_grid(n, 1.0);
    let k = 2.0 * PI / grid.length();
    let mut store = FieldStore::new();
    let diffusivity = store.push(CubicField::from_fn(grid, |x| 1.0 + 0.3 * (k * x).sin()));
    let force = store.push(CubicField::from_fn(grid, |x| 0.5 * (k * x).cos()));
    SineStore {
        store,
        diffusivity,
        force,
    }
}

/// Three events on a 10-node unit periodic domain, position in slot 0
/// and time in slot 1. Two share a cell; one sits next to the wrap.
pub fn three_events() -> Vec<Event> {
    [(2.3, 0.25), (2.8, -0.35), (9.6, 0.5)]
        .iter()
        .enumerate()
        .map(|(i, &(x, dx))| {
            Event::new(i)
                .with_var(0, x, dx, 0.0)
                .with_var(1, i as f64 * 0.01, 0.01, 0.01)
        })
        .collect()
}

// ── Langevin sampler ───────────────────────────────────────────────

/// Overdamped Langevin dynamics sampled by Euler-Maruyama:
/// `x += (beta D F + D') dt + sqrt(2 D dt) N(0, 1)`.
pub struct Langevin<'a> {
    pub diffusivity: &'a dyn Field,
    pub force: &'a dyn Field,
    pub kt: f64,
    pub dt: f64,
}

impl Langevin<'_> {
    fn step(&self, x: f64, rng: &mut ChaCha8Rng) -> f64 {
        let p = [x];
        let (d, d_grad) = self.diffusivity.value_gradient(0, &p);
        let f = self.force.evaluate(&p);
        let drift = d * f / self.kt + d_grad;
        x + drift * self.dt + (2.0 * d.max(0.0) * self.dt).sqrt() * box_muller(rng)
    }
}

/// Gaussian sample using the Box-Muller transform.
fn box_muller(rng: &mut ChaCha8Rng) -> f64 {
    let u1: f64 = rng.random::<f64>().max(1e-300);
    let u2: f64 = rng.random();
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

/// `steps + 1` positions starting at `x0`, unwrapped, deterministic in `seed`.
pub fn simulate(model: &Langevin<'_>, x0: f64, steps: usize, seed: u64) -> Vec<f64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut xs = Vec::with_capacity(steps + 1);
    let mut x = x0;
    xs.push(x);
    for _ in 0..steps {
        x = model.step(x, &mut rng);
        xs.push(x);
    }
    xs
}

/// Events from positions sampled every `dt`, position in slot 0 and time
/// in slot 1.
pub fn events_from_trajectory(
    xs: &[f64],
    dt: f64,
    stride: usize,
) -> Result<Vec<Event>, EventError> {
    let rows: Vec<Vec<f64>> = xs
        .iter()
        .enumerate()
        .map(|(t, &x)| vec![x, t as f64 * dt])
        .collect();
    events_from_samples(&rows, stride, 0)
}
