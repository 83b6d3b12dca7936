//! The [`Field`] capability trait and [`FieldKind`] tags.

use crate::boundary::Boundary;
use crate::error::FieldError;
use drift_core::NodeList;
use std::fmt;

/// The closed set of field variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// 1D local cubic interpolation with cached coefficients.
    Cubic,
    /// 1D nearest-sample interpolation.
    Zero,
    /// 2D bicubic interpolation over raw samples.
    Bicubic,
}

impl FieldKind {
    /// Number of coordinate axes of this kind.
    pub fn dimensions(self) -> usize {
        match self {
            Self::Cubic | Self::Zero => 1,
            Self::Bicubic => 2,
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cubic => write!(f, "local cubic"),
            Self::Zero => write!(f, "zero-order"),
            Self::Bicubic => write!(f, "bicubic"),
        }
    }
}

/// A scalar function sampled on a uniform grid plus an interpolation rule.
///
/// Node indices are flat: `0..len()`. Coordinates are passed as slices
/// holding at least [`dimensions()`](Field::dimensions) entries; extra
/// entries are ignored.
///
/// # Object Safety
///
/// The trait is object safe so the solver and the cost models can work
/// against `&dyn Field`. The variant set is closed; see
/// [`AnyField`](crate::AnyField) for the tagged union used for storage.
pub trait Field: Send + Sync + fmt::Debug {
    /// Which variant this is.
    fn kind(&self) -> FieldKind;

    /// Number of coordinate axes.
    fn dimensions(&self) -> usize {
        self.kind().dimensions()
    }

    /// Number of nodes.
    fn len(&self) -> usize;

    /// Always `false`: every constructor rejects empty grids.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Boundary behavior along every axis.
    fn boundary(&self) -> Boundary;

    /// Whether the field wraps.
    fn is_periodic(&self) -> bool {
        self.boundary().is_periodic()
    }

    /// Node samples in flat index order.
    fn samples(&self) -> &[f64];

    /// Per-node uncertainty column, zero when not loaded from a file.
    fn errors(&self) -> &[f64];

    /// Sample at `node`, or `None` if out of range.
    fn sample(&self, node: usize) -> Option<f64> {
        self.samples().get(node).copied()
    }

    /// Replace the sample at `node`, re-deriving whatever interpolation
    /// state depends on it. Returns `false` if `node` is out of range.
    fn set_sample(&mut self, node: usize, value: f64) -> bool;

    /// Interpolated value at `pos`.
    fn evaluate(&self, pos: &[f64]) -> f64 {
        self.value_gradient(0, pos).0
    }

    /// Derivative of the interpolant along `axis` at `pos`.
    fn gradient(&self, axis: usize, pos: &[f64]) -> f64 {
        self.value_gradient(axis, pos).1
    }

    /// Value and derivative along `axis` from one stencil gather.
    fn value_gradient(&self, axis: usize, pos: &[f64]) -> (f64, f64);

    /// Every node whose interpolation stencil can be affected by a change
    /// of `node`, plus a safety margin.
    fn neighbors(&self, node: usize) -> NodeList;

    /// The nodes whose interpolation stencil includes `node`.
    fn neighbors_minimal(&self, node: usize) -> NodeList;

    /// Node closest to `pos`.
    fn nearest_node(&self, pos: &[f64]) -> usize;

    /// Home node of the cell containing `pos` (all coordinates at or below).
    fn enclosing_node(&self, pos: &[f64]) -> usize;

    /// Coordinate of `node` along `axis`.
    fn node_position(&self, node: usize, axis: usize) -> f64;

    /// Grid spacing along `axis`.
    fn spacing(&self, axis: usize) -> f64;

    /// Lower and upper bound of the domain along `axis`.
    fn bounds(&self, axis: usize) -> (f64, f64);

    /// Definite integral of the interpolant from `a` to `b`.
    ///
    /// `None` for fields with more than one axis.
    fn integrate(&self, _a: f64, _b: f64) -> Option<f64> {
        None
    }

    /// Whether `src` covers this field's domain less one cell on every
    /// boundary. Fails if `src` has a different number of axes.
    fn spanned_by(&self, src: &dyn Field) -> Result<bool, FieldError>;
}
