//! 1D nearest-sample field.

use crate::boundary::Boundary;
use crate::error::FieldError;
use crate::field::{Field, FieldKind};
use crate::grid1d::Grid1D;
use crate::span::check_span;
use drift_core::NodeList;

/// A 1D field that evaluates to the sample of the nearest node.
///
/// There is no interpolation state: setting a sample is a plain store.
/// Typically used as the reference grid events are bound to.
#[derive(Clone, Debug, PartialEq)]
pub struct ZeroField {
    grid: Grid1D,
    v0: Vec<f64>,
    err: Vec<f64>,
}

impl ZeroField {
    /// Build a field from one sample per grid node.
    pub fn new(grid: Grid1D, samples: Vec<f64>) -> Result<Self, FieldError> {
        let n = grid.len();
        Self::with_errors(grid, samples, vec![0.0; n])
    }

    /// Build a field from samples and a per-node error column.
    pub fn with_errors(grid: Grid1D, samples: Vec<f64>, errors: Vec<f64>) -> Result<Self, FieldError> {
        for found in [samples.len(), errors.len()] {
            if found != grid.len() {
                return Err(FieldError::LengthMismatch {
                    expected: grid.len(),
                    found,
                });
            }
        }
        Ok(Self {
            grid,
            v0: samples,
            err: errors,
        })
    }

    /// A field holding `value` at every node.
    pub fn uniform(grid: Grid1D, value: f64) -> Self {
        let n = grid.len();
        Self {
            grid,
            v0: vec![value; n],
            err: vec![0.0; n],
        }
    }

    /// Grid geometry.
    pub fn grid(&self) -> &Grid1D {
        &self.grid
    }

    /// Sample of the node nearest `x`.
    pub fn value_at(&self, x: f64) -> f64 {
        self.v0[self.grid.nearest_node(x)]
    }

    /// Finite-difference slope of the samples at node `j`.
    ///
    /// Central inside the grid, one-sided at clamped ends.
    pub fn node_gradient(&self, j: usize) -> f64 {
        let n = self.grid.len();
        if j >= n || n < 2 {
            return 0.0;
        }
        let dr = self.grid.dr();
        match (self.grid.prev_index(j), self.grid.next_index(j)) {
            (Some(p), Some(q)) => (self.v0[q] - self.v0[p]) / (2.0 * dr),
            (None, Some(q)) => (self.v0[q] - self.v0[j]) / dr,
            (Some(p), None) => (self.v0[j] - self.v0[p]) / dr,
            (None, None) => 0.0,
        }
    }

    /// Sample value governing unwrapped nearest-cell index `k`.
    fn cell_value(&self, k: i64) -> f64 {
        self.v0[self.grid.wrap_index(k)]
    }

    /// Definite integral of the nearest-sample step function.
    ///
    /// Limits are clamped to `[r0, r1]`; reversed limits flip the sign.
    pub fn integral(&self, a: f64, b: f64) -> f64 {
        if a > b {
            return -self.integral(b, a);
        }
        let g = &self.grid;
        let (r0, r1, dr) = (g.r0(), g.r1(), g.dr());
        if a == b || b < r0 || a > r1 {
            return 0.0;
        }
        let a = a.max(r0);
        let b = b.min(r1);
        // Node k owns [r0 + (k - 1/2) dr, r0 + (k + 1/2) dr).
        let k0 = ((a - r0) / dr + 0.5).floor() as i64;
        let k1 = ((b - r0) / dr + 0.5).floor() as i64;
        let mut total = 0.0;
        for k in k0..=k1 {
            let lo = a.max(r0 + (k as f64 - 0.5) * dr);
            let hi = b.min(r0 + (k as f64 + 0.5) * dr);
            if hi > lo {
                total += (hi - lo) * self.cell_value(k);
            }
        }
        total
    }

    /// Multiply every sample by `factor`.
    pub fn scale(&mut self, factor: f64) {
        self.v0.iter_mut().for_each(|v| *v *= factor);
    }

    /// Set every sample to `value`.
    pub fn fill(&mut self, value: f64) {
        self.v0.iter_mut().for_each(|v| *v = value);
    }

    /// Resample `src` onto this field's nodes.
    pub fn map_from(&self, src: &dyn Field) -> Result<Self, FieldError> {
        if !self.spanned_by(src)? {
            return Err(FieldError::NotSpanned {
                reason: format!(
                    "source [{}, {}) does not cover [{}, {})",
                    src.bounds(0).0,
                    src.bounds(0).1,
                    self.grid.r0(),
                    self.grid.r1()
                ),
            });
        }
        let mut out = self.clone();
        for j in 0..self.grid.len() {
            let x = [self.grid.node_position(j)];
            out.v0[j] = src.evaluate(&x);
            out.err[j] = src.errors()[src.nearest_node(&x)];
        }
        Ok(out)
    }
}

impl Field for ZeroField {
    fn kind(&self) -> FieldKind {
        FieldKind::Zero
    }

    fn len(&self) -> usize {
        self.grid.len()
    }

    fn boundary(&self) -> Boundary {
        self.grid.boundary()
    }

    fn samples(&self) -> &[f64] {
        &self.v0
    }

    fn errors(&self) -> &[f64] {
        &self.err
    }

    fn set_sample(&mut self, node: usize, value: f64) -> bool {
        match self.v0.get_mut(node) {
            Some(v) => {
                *v = value;
                true
            }
            None => false,
        }
    }

    fn value_gradient(&self, _axis: usize, pos: &[f64]) -> (f64, f64) {
        (self.value_at(pos[0]), 0.0)
    }

    fn neighbors(&self, node: usize) -> NodeList {
        self.grid.window(node, -2, 1)
    }

    fn neighbors_minimal(&self, node: usize) -> NodeList {
        self.grid.window(node, -1, 1)
    }

    fn nearest_node(&self, pos: &[f64]) -> usize {
        self.grid.nearest_node(pos[0])
    }

    fn enclosing_node(&self, pos: &[f64]) -> usize {
        self.grid.enclosing_node(pos[0])
    }

    fn node_position(&self, node: usize, _axis: usize) -> f64 {
        self.grid.node_position(node)
    }

    fn spacing(&self, _axis: usize) -> f64 {
        self.grid.dr()
    }

    fn bounds(&self, _axis: usize) -> (f64, f64) {
        (self.grid.r0(), self.grid.r1())
    }

    fn integrate(&self, a: f64, b: f64) -> Option<f64> {
        Some(self.integral(a, b))
    }

    fn spanned_by(&self, src: &dyn Field) -> Result<bool, FieldError> {
        check_span(self, src)
    }
}
