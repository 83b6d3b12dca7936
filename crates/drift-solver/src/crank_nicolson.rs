//! Crank-Nicolson integration of the 1D Smoluchowski equation.
//!
//! Expanding `dp/dt = d/dx [ D (dp/dx - beta F p) ]` gives
//!
//! ```text
//! dp/dt = D p'' + (D' - beta D F) p' - beta (D' F + D F') p
//! ```
//!
//! which is discretized with central differences at the grid nodes and
//! stepped with the trapezoidal rule
//! `(I - dt/2 L) p[n+1] = (I + dt/2 L) p[n]`.
//!
//! Constructed via the builder pattern: [`CrankNicolson::builder`].

use crate::error::InvalidDensity;
use crate::tridiag::{solve_cyclic, solve_tridiagonal};
use drift_field::{Field, Grid1D};

/// Relative threshold below which negative density values are rounding noise.
const DEFAULT_NEGATIVE_TOLERANCE: f64 = 1e-12;

/// A Crank-Nicolson Smoluchowski propagator with a fixed timestep.
///
/// ```
/// use drift_solver::CrankNicolson;
///
/// let solver = CrankNicolson::builder()
///     .timestep(0.01)
///     .kt(2.0)
///     .build()
///     .unwrap();
/// assert_eq!(solver.beta(), 0.5);
/// assert_eq!(solver.steps_for(0.105), 11);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct CrankNicolson {
    timestep: f64,
    kt: f64,
    negative_tolerance: f64,
}

/// Builder for [`CrankNicolson`].
///
/// `timestep` is required. `kt` defaults to 1 and the negative tolerance
/// to `1e-12` of the density peak.
#[derive(Clone, Debug)]
pub struct CrankNicolsonBuilder {
    timestep: Option<f64>,
    kt: f64,
    negative_tolerance: f64,
}

/// Discretized operator `L`: `(L p)_i = a_i p_{i-1} + b_i p_i + c_i p_{i+1}`.
struct Operator {
    lower: Vec<f64>,
    diag: Vec<f64>,
    upper: Vec<f64>,
}

impl CrankNicolson {
    /// Create a new builder.
    pub fn builder() -> CrankNicolsonBuilder {
        CrankNicolsonBuilder {
            timestep: None,
            kt: 1.0,
            negative_tolerance: DEFAULT_NEGATIVE_TOLERANCE,
        }
    }

    /// Integration timestep.
    pub fn timestep(&self) -> f64 {
        self.timestep
    }

    /// Thermal energy.
    pub fn kt(&self) -> f64 {
        self.kt
    }

    /// Inverse thermal energy `1 / kt`.
    pub fn beta(&self) -> f64 {
        1.0 / self.kt
    }

    /// Negative values below `-tolerance * peak` invalidate a density.
    pub fn negative_tolerance(&self) -> f64 {
        self.negative_tolerance
    }

    /// Steps needed to cover `lag`, rounding up.
    pub fn steps_for(&self, lag: f64) -> usize {
        (lag / self.timestep).ceil().max(0.0) as usize
    }

    /// A unit-mass spike at `node`: `1/dr` there, zero elsewhere.
    pub fn point_mass(&self, grid: &Grid1D, node: usize) -> Vec<f64> {
        let mut p = vec![0.0; grid.len()];
        if let Some(v) = p.get_mut(node) {
            *v = 1.0 / grid.dr();
        }
        p
    }

    fn operator(
        &self,
        grid: &Grid1D,
        diffusivity: &dyn Field,
        force: &dyn Field,
        bias: Option<&dyn Field>,
    ) -> Operator {
        let n = grid.len();
        let dx = grid.dr();
        let beta = self.beta();
        let mut op = Operator {
            lower: Vec::with_capacity(n),
            diag: Vec::with_capacity(n),
            upper: Vec::with_capacity(n),
        };

        for i in 0..n {
            let x = [grid.node_position(i)];
            let (d, dd) = diffusivity.value_gradient(0, &x);
            let (mut f, mut df) = force.value_gradient(0, &x);
            if let Some(b) = bias {
                let (bf, bdf) = b.value_gradient(0, &x);
                f += bf;
                df += bdf;
            }

            let drift = dd - beta * d * f;
            let curvature = d / (dx * dx);
            op.lower.push(curvature - drift / (2.0 * dx));
            op.upper.push(curvature + drift / (2.0 * dx));
            op.diag
                .push(-2.0 * curvature - beta * (dd * f + d * df));
        }

        if !grid.is_periodic() {
            // Reflecting ends: ghost nodes mirror their neighbor.
            op.diag[0] += op.lower[0];
            op.lower[0] = 0.0;
            op.diag[n - 1] += op.upper[n - 1];
            op.upper[n - 1] = 0.0;
        }
        op
    }

    /// Advance `p` by `steps` timesteps in place.
    ///
    /// Fields are evaluated once at the grid nodes; `bias` adds to `force`.
    pub fn solve(
        &self,
        grid: &Grid1D,
        p: &mut [f64],
        steps: usize,
        diffusivity: &dyn Field,
        force: &dyn Field,
        bias: Option<&dyn Field>,
    ) {
        let n = grid.len();
        if n == 0 || p.len() != n || steps == 0 {
            return;
        }
        let op = self.operator(grid, diffusivity, force, bias);
        let h = 0.5 * self.timestep;
        let periodic = grid.is_periodic();

        let lower: Vec<f64> = op.lower.iter().map(|a| -h * a).collect();
        let diag: Vec<f64> = op.diag.iter().map(|b| 1.0 - h * b).collect();
        let upper: Vec<f64> = op.upper.iter().map(|c| -h * c).collect();

        let mut rhs = vec![0.0; n];
        let mut scratch = Vec::with_capacity(n);
        for _ in 0..steps {
            for i in 0..n {
                let mut lp = op.diag[i] * p[i];
                if let Some(j) = grid.prev_index(i) {
                    lp += op.lower[i] * p[j];
                }
                if let Some(j) = grid.next_index(i) {
                    lp += op.upper[i] * p[j];
                }
                rhs[i] = p[i] + h * lp;
            }
            if periodic {
                solve_cyclic(&lower, &diag, &upper, &mut rhs, &mut scratch);
            } else {
                solve_tridiagonal(&lower, &diag, &upper, &mut rhs, &mut scratch);
            }
            p.copy_from_slice(&rhs);
        }
    }

    /// Rescale `p` so that `sum(p) * dr == 1`.
    ///
    /// Returns the mass before rescaling, or `None` when it is not a
    /// positive finite number (and `p` is left untouched).
    pub fn conserve(&self, grid: &Grid1D, p: &mut [f64]) -> Option<f64> {
        let total = p.iter().sum::<f64>() * grid.dr();
        if !(total > 0.0) || !total.is_finite() {
            return None;
        }
        for v in p.iter_mut() {
            *v /= total;
        }
        Some(total)
    }

    /// First node whose value is NaN or more negative than the tolerance
    /// allows relative to the peak.
    pub fn first_negative(&self, p: &[f64]) -> Option<usize> {
        let peak = p.iter().copied().fold(0.0, f64::max);
        let floor = -self.negative_tolerance * peak;
        p.iter().position(|&v| !(v >= floor))
    }

    /// Transition density after `steps` timesteps from a spike at `origin`.
    ///
    /// The result is normalized and tolerated negative noise is zeroed.
    pub fn propagate(
        &self,
        grid: &Grid1D,
        origin: usize,
        steps: usize,
        diffusivity: &dyn Field,
        force: &dyn Field,
        bias: Option<&dyn Field>,
    ) -> Result<Vec<f64>, InvalidDensity> {
        let mut p = self.point_mass(grid, origin);
        self.solve(grid, &mut p, steps, diffusivity, force, bias);

        if let Some(node) = self.first_negative(&p) {
            let err = InvalidDensity::Negative {
                origin,
                node,
                value: p[node],
            };
            log::warn!("{err}; invalidating this solution");
            return Err(err);
        }
        let total = p.iter().sum::<f64>() * grid.dr();
        if self.conserve(grid, &mut p).is_none() {
            let err = InvalidDensity::NoMass { origin, total };
            log::warn!("{err}; invalidating this solution");
            return Err(err);
        }
        for v in &mut p {
            if *v < 0.0 {
                *v = 0.0;
            }
        }
        Ok(p)
    }
}

impl CrankNicolsonBuilder {
    /// Set the integration timestep (required).
    pub fn timestep(mut self, dt: f64) -> Self {
        self.timestep = Some(dt);
        self
    }

    /// Set the thermal energy.
    pub fn kt(mut self, kt: f64) -> Self {
        self.kt = kt;
        self
    }

    /// Set the relative tolerance for negative density values.
    pub fn negative_tolerance(mut self, tolerance: f64) -> Self {
        self.negative_tolerance = tolerance;
        self
    }

    /// Build the solver, validating all parameters.
    pub fn build(self) -> Result<CrankNicolson, String> {
        let timestep = self
            .timestep
            .ok_or_else(|| "timestep is required".to_string())?;
        if !(timestep > 0.0) || !timestep.is_finite() {
            return Err(format!("timestep must be finite and > 0, got {timestep}"));
        }
        if !(self.kt > 0.0) || !self.kt.is_finite() {
            return Err(format!("kt must be finite and > 0, got {}", self.kt));
        }
        if !(self.negative_tolerance >= 0.0) || !self.negative_tolerance.is_finite() {
            return Err(format!(
                "negative_tolerance must be finite and >= 0, got {}",
                self.negative_tolerance
            ));
        }
        Ok(CrankNicolson {
            timestep,
            kt: self.kt,
            negative_tolerance: self.negative_tolerance,
        })
    }
}
