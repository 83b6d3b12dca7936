//! Accuracy of the Crank-Nicolson propagator against closed forms.

use drift_field::{Boundary, CubicField, Grid1D};
use drift_solver::CrankNicolson;
use proptest::prelude::*;

/// Max deviation from the free-diffusion kernel at `t = 1`, `D = 1`.
fn free_diffusion_error(dx: f64, dt: f64, steps: usize) -> f64 {
    let n = (20.0 / dx).round() as usize;
    let grid = Grid1D::new(n, -10.0, dx, Boundary::Clamp).unwrap();
    let origin = grid.nearest_node(0.0);
    let solver = CrankNicolson::builder().timestep(dt).build().unwrap();
    let p = solver
        .propagate(
            &grid,
            origin,
            steps,
            &CubicField::uniform(grid, 1.0),
            &CubicField::uniform(grid, 0.0),
            None,
        )
        .unwrap();

    let mass = p.iter().sum::<f64>() * dx;
    assert!((mass - 1.0).abs() < 1e-6, "mass {mass}");

    let norm = 1.0 / (4.0 * std::f64::consts::PI).sqrt();
    p.iter()
        .enumerate()
        .map(|(i, v)| {
            let x = grid.node_position(i);
            (v - norm * (-x * x / 4.0).exp()).abs()
        })
        .fold(0.0, f64::max)
}

#[test]
fn free_diffusion_converges_under_refinement() {
    let coarse = free_diffusion_error(0.2, 0.04, 25);
    let fine = free_diffusion_error(0.1, 0.01, 100);
    assert!(coarse < 1e-2, "coarse error {coarse}");
    assert!(fine < coarse, "fine {fine} vs coarse {coarse}");
}

#[test]
fn harmonic_well_relaxes_to_boltzmann() {
    let grid = Grid1D::new(100, -5.0, 0.1, Boundary::Clamp).unwrap();
    let solver = CrankNicolson::builder().timestep(0.01).build().unwrap();
    let diffusivity = CubicField::uniform(grid, 1.0);
    let force = CubicField::from_fn(grid, |x| -x);
    let p = solver
        .propagate(&grid, grid.nearest_node(1.5), 1000, &diffusivity, &force, None)
        .unwrap();

    let norm = 1.0 / (2.0 * std::f64::consts::PI).sqrt();
    for (i, v) in p.iter().enumerate() {
        let x = grid.node_position(i);
        let want = norm * (-x * x / 2.0).exp();
        assert!((v - want).abs() < 1e-2, "x = {x}: {v} vs {want}");
    }
}

proptest! {
    #[test]
    fn reflecting_walls_conserve_raw_mass(
        d in 0.1f64..1.0,
        origin in 0usize..60,
        steps in 1usize..40,
    ) {
        let grid = Grid1D::new(60, 0.0, 0.1, Boundary::Clamp).unwrap();
        let solver = CrankNicolson::builder().timestep(0.005).build().unwrap();
        let mut p = solver.point_mass(&grid, origin);
        solver.solve(
            &grid,
            &mut p,
            steps,
            &CubicField::uniform(grid, d),
            &CubicField::uniform(grid, 0.0),
            None,
        );
        let mass = p.iter().sum::<f64>() * grid.dr();
        prop_assert!((mass - 1.0).abs() < 1e-9);
        prop_assert!(solver.first_negative(&p).is_none());
    }
}
