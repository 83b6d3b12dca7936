//! 2D bicubic field over raw samples.

use crate::boundary::Boundary;
use crate::error::FieldError;
use crate::field::{Field, FieldKind};
use crate::grid1d::Grid1D;
use crate::span::check_span;
use drift_core::NodeList;

/// Catmull-Rom mix of four equally spaced values at fraction `w` of the
/// interval between the middle two. Returns value and `d/dw`.
fn mix(g: [f64; 4], w: f64) -> (f64, f64) {
    let a3 = 0.5 * (-g[0] + 3.0 * g[1] - 3.0 * g[2] + g[3]);
    let a2 = 0.5 * (2.0 * g[0] - 5.0 * g[1] + 4.0 * g[2] - g[3]);
    let a1 = 0.5 * (-g[0] + g[2]);
    let w2 = w * w;
    (
        a3 * w * w2 + a2 * w2 + a1 * w + g[1],
        3.0 * a3 * w2 + 2.0 * a2 * w + a1,
    )
}

/// A 2D field interpolated by two sequential cubic mixes.
///
/// Node `(ix, iy)` has flat index `iy + ny * ix`. Nothing is cached: each
/// query gathers the 4x4 stencil around its cell, mixes along x for each
/// of the four rows, then mixes the four results along y. Aperiodic
/// queries are clamped to the node range `[x0, x_last] x [y0, y_last]`.
#[derive(Clone, Debug, PartialEq)]
pub struct BicubicField {
    x: Grid1D,
    y: Grid1D,
    v0: Vec<f64>,
    err: Vec<f64>,
}

impl BicubicField {
    /// Build a field from `nx * ny` samples in flat index order.
    ///
    /// Both axes must share one boundary behavior.
    pub fn new(x: Grid1D, y: Grid1D, samples: Vec<f64>) -> Result<Self, FieldError> {
        let n = x.len() * y.len();
        Self::with_errors(x, y, samples, vec![0.0; n])
    }

    /// Build a field from samples and a per-node error column.
    pub fn with_errors(
        x: Grid1D,
        y: Grid1D,
        samples: Vec<f64>,
        errors: Vec<f64>,
    ) -> Result<Self, FieldError> {
        if x.boundary() != y.boundary() {
            return Err(FieldError::InvalidSpacing {
                reason: "both axes of a bicubic field must share one boundary".to_string(),
            });
        }
        let n = x.len() * y.len();
        for found in [samples.len(), errors.len()] {
            if found != n {
                return Err(FieldError::LengthMismatch { expected: n, found });
            }
        }
        Ok(Self {
            x,
            y,
            v0: samples,
            err: errors,
        })
    }

    /// A field holding `value` at every node.
    pub fn uniform(x: Grid1D, y: Grid1D, value: f64) -> Result<Self, FieldError> {
        let n = x.len() * y.len();
        Self::new(x, y, vec![value; n])
    }

    /// A field sampling `f(x, y)` at every node.
    pub fn from_fn(x: Grid1D, y: Grid1D, f: impl Fn(f64, f64) -> f64) -> Result<Self, FieldError> {
        let mut samples = Vec::with_capacity(x.len() * y.len());
        for ix in 0..x.len() {
            for iy in 0..y.len() {
                samples.push(f(x.node_position(ix), y.node_position(iy)));
            }
        }
        Self::new(x, y, samples)
    }

    /// Geometry along x.
    pub fn x_axis(&self) -> &Grid1D {
        &self.x
    }

    /// Geometry along y.
    pub fn y_axis(&self) -> &Grid1D {
        &self.y
    }

    fn axis(&self, axis: usize) -> &Grid1D {
        if axis == 0 {
            &self.x
        } else {
            &self.y
        }
    }

    /// Flat index of node `(ix, iy)`.
    pub fn index(&self, ix: usize, iy: usize) -> usize {
        iy + self.y.len() * ix
    }

    /// `(ix, iy)` of flat node `j`.
    pub fn split(&self, j: usize) -> (usize, usize) {
        (j / self.y.len(), j % self.y.len())
    }

    /// Gather the 4x4 stencil of the cell containing `(x, y)` and the cell
    /// fractions. `g[ix][iy]` runs from one node before the home node to
    /// two nodes after it along each axis.
    fn stencil(&self, x: f64, y: f64) -> ([[f64; 4]; 4], f64, f64) {
        let rx = self.x.wrap_to_nodes(x);
        let ry = self.y.wrap_to_nodes(y);
        let tx = (rx - self.x.r0()) / self.x.dr();
        let ty = (ry - self.y.r0()) / self.y.dr();
        let hx = tx.floor();
        let hy = ty.floor();

        let mut g = [[0.0; 4]; 4];
        for (ix, row) in g.iter_mut().enumerate() {
            let jx = self.x.wrap_index(hx as i64 + ix as i64 - 1);
            for (iy, v) in row.iter_mut().enumerate() {
                let jy = self.y.wrap_index(hy as i64 + iy as i64 - 1);
                *v = self.v0[self.index(jx, jy)];
            }
        }
        (g, tx - hx, ty - hy)
    }

    /// Value and derivative along `axis` at `(x, y)`.
    pub fn value_gradient_at(&self, axis: usize, x: f64, y: f64) -> (f64, f64) {
        let (g, wx, wy) = self.stencil(x, y);
        let mut rows = [0.0; 4];
        let mut slopes = [0.0; 4];
        for iy in 0..4 {
            let (v, d) = mix([g[0][iy], g[1][iy], g[2][iy], g[3][iy]], wx);
            rows[iy] = v;
            slopes[iy] = d;
        }
        let (val, dval) = mix(rows, wy);
        let grad = if axis == 0 {
            mix(slopes, wy).0 / self.x.dr()
        } else {
            dval / self.y.dr()
        };
        (val, grad)
    }

    /// Value at `(x, y)`.
    pub fn value_at(&self, x: f64, y: f64) -> f64 {
        self.value_gradient_at(0, x, y).0
    }

    fn window(&self, j: usize, lo: i64, hi: i64) -> NodeList {
        let (jx, jy) = self.split(j);
        let xs = self.x.window(jx, lo, hi);
        let ys = self.y.window(jy, lo, hi);
        let mut out = NodeList::new();
        for &kx in &xs {
            for &ky in &ys {
                out.push(self.index(kx, ky));
            }
        }
        out
    }

    /// Neighbor of `j` one step back along `axis`, if any.
    pub fn prev_index(&self, j: usize, axis: usize) -> Option<usize> {
        let (jx, jy) = self.split(j);
        match axis {
            0 => self.x.prev_index(jx).map(|kx| self.index(kx, jy)),
            1 => self.y.prev_index(jy).map(|ky| self.index(jx, ky)),
            _ => None,
        }
    }

    /// Neighbor of `j` one step forward along `axis`, if any.
    pub fn next_index(&self, j: usize, axis: usize) -> Option<usize> {
        let (jx, jy) = self.split(j);
        match axis {
            0 => self.x.next_index(jx).map(|kx| self.index(kx, jy)),
            1 => self.y.next_index(jy).map(|ky| self.index(jx, ky)),
            _ => None,
        }
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
        if src.kind() != FieldKind::Bicubic {
            return Err(FieldError::KindMismatch {
                expected: FieldKind::Bicubic,
                found: src.kind(),
            });
        }
        if !self.spanned_by(src)? {
            return Err(FieldError::NotSpanned {
                reason: "source grid does not cover the destination node range".to_string(),
            });
        }
        let mut out = self.clone();
        for j in 0..self.v0.len() {
            let (ix, iy) = self.split(j);
            let r = [self.x.node_position(ix), self.y.node_position(iy)];
            out.v0[j] = src.evaluate(&r);
            out.err[j] = src.errors()[src.nearest_node(&r)];
        }
        Ok(out)
    }
}

impl Field for BicubicField {
    fn kind(&self) -> FieldKind {
        FieldKind::Bicubic
    }

    fn len(&self) -> usize {
        self.v0.len()
    }

    fn boundary(&self) -> Boundary {
        self.x.boundary()
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

    fn value_gradient(&self, axis: usize, pos: &[f64]) -> (f64, f64) {
        self.value_gradient_at(axis, pos[0], pos[1])
    }

    fn neighbors(&self, node: usize) -> NodeList {
        self.window(node, -2, 2)
    }

    fn neighbors_minimal(&self, node: usize) -> NodeList {
        self.window(node, -2, 1)
    }

    fn nearest_node(&self, pos: &[f64]) -> usize {
        self.index(self.x.nearest_node(pos[0]), self.y.nearest_node(pos[1]))
    }

    fn enclosing_node(&self, pos: &[f64]) -> usize {
        self.index(self.x.enclosing_node(pos[0]), self.y.enclosing_node(pos[1]))
    }

    fn node_position(&self, node: usize, axis: usize) -> f64 {
        let (ix, iy) = self.split(node);
        if axis == 0 {
            self.x.node_position(ix)
        } else {
            self.y.node_position(iy)
        }
    }

    fn spacing(&self, axis: usize) -> f64 {
        self.axis(axis).dr()
    }

    fn bounds(&self, axis: usize) -> (f64, f64) {
        let g = self.axis(axis);
        (g.r0(), g.last_node_position())
    }

    fn spanned_by(&self, src: &dyn Field) -> Result<bool, FieldError> {
        check_span(self, src)
    }
}
