//! 1D local cubic field with O(1) coefficient updates.

use crate::boundary::Boundary;
use crate::error::FieldError;
use crate::field::{Field, FieldKind};
use crate::grid1d::Grid1D;
use crate::span::check_span;
use drift_core::NodeList;

/// A 1D field interpolated by a local cubic through four samples.
///
/// The cubic on cell `j` (from node `j` to node `j + 1`) is built from the
/// samples at `j - 1 ..= j + 2` with the Catmull-Rom formula, in the cell
/// fraction `w = (x - r_j) / dr`:
///
/// ```text
/// v(w) = c3 w^3 + c2 w^2 + c1 w + v_j
/// ```
///
/// No global solve is involved, so changing one sample only re-derives
/// the coefficients of the four cells whose stencil contains it.
/// Aperiodic stencils clamp their indices to `[0, n - 1]`.
///
/// # Examples
///
/// ```
/// use drift_field::{Boundary, CubicField, Field, Grid1D};
///
/// let grid = Grid1D::new(8, 0.0, 0.5, Boundary::Periodic).unwrap();
/// let mut field = CubicField::uniform(grid, 1.0);
/// assert!(field.set_sample(3, 2.0));
/// assert_eq!(field.evaluate(&[1.5]), 2.0);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct CubicField {
    grid: Grid1D,
    v0: Vec<f64>,
    err: Vec<f64>,
    /// `[c1, c2, c3]` per cell.
    coeffs: Vec<[f64; 3]>,
    /// Value at the upper end of the last cell.
    end: f64,
}

impl CubicField {
    /// Build a field from one sample per grid node.
    pub fn new(grid: Grid1D, samples: Vec<f64>) -> Result<Self, FieldError> {
        let n = grid.len();
        Self::with_errors(grid, samples, vec![0.0; n])
    }

    /// Build a field from samples and a per-node error column.
    pub fn with_errors(grid: Grid1D, samples: Vec<f64>, errors: Vec<f64>) -> Result<Self, FieldError> {
        if samples.len() != grid.len() {
            return Err(FieldError::LengthMismatch {
                expected: grid.len(),
                found: samples.len(),
            });
        }
        if errors.len() != grid.len() {
            return Err(FieldError::LengthMismatch {
                expected: grid.len(),
                found: errors.len(),
            });
        }
        let mut field = Self {
            coeffs: vec![[0.0; 3]; grid.len()],
            grid,
            v0: samples,
            err: errors,
            end: 0.0,
        };
        field.derive_all();
        Ok(field)
    }

    /// A field holding `value` at every node.
    pub fn uniform(grid: Grid1D, value: f64) -> Self {
        let n = grid.len();
        Self {
            grid,
            v0: vec![value; n],
            err: vec![0.0; n],
            coeffs: vec![[0.0; 3]; n],
            end: value,
        }
    }

    /// A field sampling `f` at every node position.
    pub fn from_fn(grid: Grid1D, f: impl Fn(f64) -> f64) -> Self {
        let samples = (0..grid.len()).map(|j| f(grid.node_position(j))).collect();
        let n = grid.len();
        let mut field = Self {
            coeffs: vec![[0.0; 3]; n],
            grid,
            v0: samples,
            err: vec![0.0; n],
            end: 0.0,
        };
        field.derive_all();
        field
    }

    /// Grid geometry.
    pub fn grid(&self) -> &Grid1D {
        &self.grid
    }

    /// Lower end of the domain.
    pub fn r0(&self) -> f64 {
        self.grid.r0()
    }

    /// Upper end of the domain.
    pub fn r1(&self) -> f64 {
        self.grid.r1()
    }

    /// Node spacing.
    pub fn dr(&self) -> f64 {
        self.grid.dr()
    }

    fn derive(&mut self, j: usize) {
        let g = &self.grid;
        let a = self.v0[g.wrap_index(j as i64 - 1)];
        let b = self.v0[j];
        let c = self.v0[g.wrap_index(j as i64 + 1)];
        let d = self.v0[g.wrap_index(j as i64 + 2)];
        self.coeffs[j] = [
            0.5 * (-a + c),
            0.5 * (2.0 * a - 5.0 * b + 4.0 * c - d),
            0.5 * (-a + 3.0 * b - 3.0 * c + d),
        ];
    }

    fn update_end(&mut self) {
        let last = self.grid.len() - 1;
        let [c1, c2, c3] = self.coeffs[last];
        self.end = c3 + c2 + c1 + self.v0[last];
    }

    fn derive_all(&mut self) {
        for j in 0..self.grid.len() {
            self.derive(j);
        }
        self.update_end();
    }

    /// Cubic coefficients `[c1, c2, c3]` of cell `j`.
    pub fn coefficients(&self, j: usize) -> Option<[f64; 3]> {
        self.coeffs.get(j).copied()
    }

    /// Home cell and cell fraction for `x`; outside an aperiodic domain
    /// the error carries the boundary value instead.
    fn locate(&self, x: f64) -> Result<(usize, f64), f64> {
        let g = &self.grid;
        let x = g.wrap(x);
        let t = (x - g.r0()) / g.dr();
        let home = t.floor();
        if g.is_periodic() {
            let home = (home as i64).clamp(0, g.len() as i64 - 1) as usize;
            return Ok((home, t - home as f64));
        }
        if home < 0.0 {
            Err(self.v0[0])
        } else if home >= g.len() as f64 {
            Err(self.end)
        } else {
            Ok((home as usize, t - home))
        }
    }

    /// Value and derivative at `x`.
    ///
    /// Outside an aperiodic domain the boundary value is returned with a
    /// zero derivative.
    pub fn value_gradient_at(&self, x: f64) -> (f64, f64) {
        match self.locate(x) {
            Ok((home, w)) => {
                let [c1, c2, c3] = self.coeffs[home];
                let w2 = w * w;
                let val = c3 * w * w2 + c2 * w2 + c1 * w + self.v0[home];
                let grad = (3.0 * c3 * w2 + 2.0 * c2 * w + c1) / self.grid.dr();
                (val, grad)
            }
            Err(edge) => (edge, 0.0),
        }
    }

    /// Value at `x`.
    pub fn value_at(&self, x: f64) -> f64 {
        self.value_gradient_at(x).0
    }

    /// Nodes `j - 3 ..= j + 3`.
    pub fn neighbors_wide(&self, j: usize) -> NodeList {
        self.grid.window(j, -3, 3)
    }

    /// Exact integral of the cubic over the whole of cell `j`.
    fn cell_integral(&self, j: usize) -> f64 {
        let [c1, c2, c3] = self.coeffs[j];
        self.grid.dr() * (0.25 * c3 + c2 / 3.0 + 0.5 * c1 + self.v0[j])
    }

    /// Exact integral of the cubic of cell `j` from node `j` to `x`.
    fn partial_integral(&self, j: usize, x: f64) -> f64 {
        let [c1, c2, c3] = self.coeffs[j];
        let dr = self.grid.dr();
        let w = (x - self.grid.node_position(j)) / dr;
        let w2 = w * w;
        dr * (0.25 * c3 * w2 * w2 + c2 / 3.0 * w2 * w + 0.5 * c1 * w2 + self.v0[j] * w)
    }

    /// Definite integral from `a` to `b`.
    ///
    /// Limits are clamped to `[r0, r1]`; reversed limits flip the sign.
    pub fn integral(&self, a: f64, b: f64) -> f64 {
        if a > b {
            return -self.integral(b, a);
        }
        let g = &self.grid;
        let (r0, r1) = (g.r0(), g.r1());
        if a == b || b < r0 || a > r1 {
            return 0.0;
        }
        let a = a.max(r0);
        let b = b.min(r1);
        let last = g.len() - 1;
        let j0 = (((a - r0) / g.dr()).floor() as usize).min(last);
        let j1 = (((b - r0) / g.dr()).floor() as usize).min(last);

        if j0 == j1 {
            return self.partial_integral(j0, b) - self.partial_integral(j0, a);
        }
        let mut total = self.cell_integral(j0) - self.partial_integral(j0, a);
        for j in j0 + 1..j1 {
            total += self.cell_integral(j);
        }
        total + self.partial_integral(j1, b)
    }

    /// Sum of the exact per-cell integrals over the whole domain.
    pub fn total_cell_integral(&self) -> f64 {
        (0..self.grid.len()).map(|j| self.cell_integral(j)).sum()
    }

    /// Multiply every sample by `factor`.
    pub fn scale(&mut self, factor: f64) {
        for v in &mut self.v0 {
            *v *= factor;
        }
        for c in &mut self.coeffs {
            for k in c.iter_mut() {
                *k *= factor;
            }
        }
        self.end *= factor;
    }

    /// Set every sample to `value`.
    pub fn fill(&mut self, value: f64) {
        self.v0.iter_mut().for_each(|v| *v = value);
        self.coeffs.iter_mut().for_each(|c| *c = [0.0; 3]);
        self.end = value;
    }

    /// Replace all samples at once.
    pub fn reset(&mut self, samples: &[f64]) -> Result<(), FieldError> {
        if samples.len() != self.v0.len() {
            return Err(FieldError::LengthMismatch {
                expected: self.v0.len(),
                found: samples.len(),
            });
        }
        self.v0.copy_from_slice(samples);
        self.derive_all();
        Ok(())
    }

    /// Resample `src` onto this field's nodes.
    ///
    /// The error column is taken from the source node nearest each node.
    pub fn map_from(&self, src: &dyn Field) -> Result<Self, FieldError> {
        if !self.spanned_by(src)? {
            return Err(FieldError::NotSpanned {
                reason: format!(
                    "source [{}, {}) does not cover [{}, {})",
                    src.bounds(0).0,
                    src.bounds(0).1,
                    self.r0(),
                    self.r1()
                ),
            });
        }
        let mut out = self.clone();
        for j in 0..self.grid.len() {
            let x = [self.grid.node_position(j)];
            out.v0[j] = src.evaluate(&x);
            out.err[j] = src.errors()[src.nearest_node(&x)];
        }
        out.derive_all();
        Ok(out)
    }

    /// Running integral `scale * integral(r0, centre_j)` at every cell
    /// centre, shifted so its minimum is zero.
    ///
    /// Integrating a mean force this way yields a potential of mean force.
    pub fn integral_profile(&self, scale: f64) -> Vec<(f64, f64)> {
        let g = &self.grid;
        let centres: Vec<f64> = (0..g.len())
            .map(|j| g.node_position(j) + 0.5 * g.dr())
            .collect();
        let values: Vec<f64> = centres
            .iter()
            .map(|&c| scale * self.integral(g.r0(), c))
            .collect();
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        centres
            .into_iter()
            .zip(values)
            .map(|(c, v)| (c, v - min))
            .collect()
    }

    /// `scale * ln(v)` at every node position.
    pub fn log_profile(&self, scale: f64) -> Vec<(f64, f64)> {
        self.v0
            .iter()
            .enumerate()
            .map(|(j, &v)| (self.grid.node_position(j), scale * v.ln()))
            .collect()
    }
}

impl Field for CubicField {
    fn kind(&self) -> FieldKind {
        FieldKind::Cubic
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
        if node >= self.grid.len() {
            return false;
        }
        self.v0[node] = value;
        // Cells j-2..=j+1 read sample j.
        for j in self.grid.window(node, -2, 1) {
            self.derive(j);
        }
        self.update_end();
        true
    }

    fn value_gradient(&self, _axis: usize, pos: &[f64]) -> (f64, f64) {
        self.value_gradient_at(pos[0])
    }

    fn neighbors(&self, node: usize) -> NodeList {
        self.grid.window(node, -2, 1)
    }

    fn neighbors_minimal(&self, node: usize) -> NodeList {
        self.grid.window(node, -2, 1)
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
