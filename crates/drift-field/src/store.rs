//! Tagged storage for the closed set of field variants.

use crate::bicubic::BicubicField;
use crate::boundary::Boundary;
use crate::cubic::CubicField;
use crate::error::FieldError;
use crate::field::{Field, FieldKind};
use crate::grid1d::Grid1D;
use crate::zero::ZeroField;
use drift_core::{FieldId, NodeList};

/// One field of any variant.
///
/// Delegates the [`Field`] trait to the wrapped value. Cost models match
/// on the variant once when they are constructed and report a typed
/// error for the wrong kind.
#[derive(Clone, Debug, PartialEq)]
pub enum AnyField {
    /// 1D local cubic.
    Cubic(CubicField),
    /// 1D nearest-sample.
    Zero(ZeroField),
    /// 2D bicubic.
    Bicubic(BicubicField),
}

macro_rules! delegate {
    ($self:ident, $f:ident => $body:expr) => {
        match $self {
            AnyField::Cubic($f) => $body,
            AnyField::Zero($f) => $body,
            AnyField::Bicubic($f) => $body,
        }
    };
}

impl AnyField {
    /// Borrow as a trait object.
    pub fn as_field(&self) -> &dyn Field {
        match self {
            Self::Cubic(f) => f,
            Self::Zero(f) => f,
            Self::Bicubic(f) => f,
        }
    }

    /// The cubic field, if this is one.
    pub fn as_cubic(&self) -> Option<&CubicField> {
        match self {
            Self::Cubic(f) => Some(f),
            _ => None,
        }
    }

    /// The zero-order field, if this is one.
    pub fn as_zero(&self) -> Option<&ZeroField> {
        match self {
            Self::Zero(f) => Some(f),
            _ => None,
        }
    }

    /// The bicubic field, if this is one.
    pub fn as_bicubic(&self) -> Option<&BicubicField> {
        match self {
            Self::Bicubic(f) => Some(f),
            _ => None,
        }
    }

    /// 1D grid geometry, if this is a 1D field.
    pub fn grid1d(&self) -> Option<&Grid1D> {
        match self {
            Self::Cubic(f) => Some(f.grid()),
            Self::Zero(f) => Some(f.grid()),
            Self::Bicubic(_) => None,
        }
    }

    /// Multiply every sample by `factor`.
    pub fn scale(&mut self, factor: f64) {
        delegate!(self, f => f.scale(factor))
    }

    /// Set every sample to `value`.
    pub fn fill(&mut self, value: f64) {
        delegate!(self, f => f.fill(value))
    }

    /// Resample `src` onto this field's nodes, keeping this field's kind.
    pub fn map_from(&self, src: &dyn Field) -> Result<AnyField, FieldError> {
        Ok(match self {
            Self::Cubic(f) => Self::Cubic(f.map_from(src)?),
            Self::Zero(f) => Self::Zero(f.map_from(src)?),
            Self::Bicubic(f) => Self::Bicubic(f.map_from(src)?),
        })
    }
}

impl Field for AnyField {
    fn kind(&self) -> FieldKind {
        delegate!(self, f => f.kind())
    }

    fn len(&self) -> usize {
        delegate!(self, f => f.len())
    }

    fn boundary(&self) -> Boundary {
        delegate!(self, f => f.boundary())
    }

    fn samples(&self) -> &[f64] {
        delegate!(self, f => f.samples())
    }

    fn errors(&self) -> &[f64] {
        delegate!(self, f => f.errors())
    }

    fn set_sample(&mut self, node: usize, value: f64) -> bool {
        delegate!(self, f => f.set_sample(node, value))
    }

    fn evaluate(&self, pos: &[f64]) -> f64 {
        delegate!(self, f => f.evaluate(pos))
    }

    fn gradient(&self, axis: usize, pos: &[f64]) -> f64 {
        delegate!(self, f => f.gradient(axis, pos))
    }

    fn value_gradient(&self, axis: usize, pos: &[f64]) -> (f64, f64) {
        delegate!(self, f => f.value_gradient(axis, pos))
    }

    fn neighbors(&self, node: usize) -> NodeList {
        delegate!(self, f => f.neighbors(node))
    }

    fn neighbors_minimal(&self, node: usize) -> NodeList {
        delegate!(self, f => f.neighbors_minimal(node))
    }

    fn nearest_node(&self, pos: &[f64]) -> usize {
        delegate!(self, f => f.nearest_node(pos))
    }

    fn enclosing_node(&self, pos: &[f64]) -> usize {
        delegate!(self, f => f.enclosing_node(pos))
    }

    fn node_position(&self, node: usize, axis: usize) -> f64 {
        delegate!(self, f => f.node_position(node, axis))
    }

    fn spacing(&self, axis: usize) -> f64 {
        delegate!(self, f => f.spacing(axis))
    }

    fn bounds(&self, axis: usize) -> (f64, f64) {
        delegate!(self, f => f.bounds(axis))
    }

    fn integrate(&self, a: f64, b: f64) -> Option<f64> {
        delegate!(self, f => f.integrate(a, b))
    }

    fn spanned_by(&self, src: &dyn Field) -> Result<bool, FieldError> {
        delegate!(self, f => f.spanned_by(src))
    }
}

impl From<CubicField> for AnyField {
    fn from(f: CubicField) -> Self {
        Self::Cubic(f)
    }
}

impl From<ZeroField> for AnyField {
    fn from(f: ZeroField) -> Self {
        Self::Zero(f)
    }
}

impl From<BicubicField> for AnyField {
    fn from(f: BicubicField) -> Self {
        Self::Bicubic(f)
    }
}

/// Ordered owner of the fields of one fitting run.
///
/// `FieldId(n)` addresses the n-th pushed field.
#[derive(Clone, Debug, Default)]
pub struct FieldStore {
    fields: Vec<AnyField>,
}

impl FieldStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field and return its id.
    pub fn push(&mut self, field: impl Into<AnyField>) -> FieldId {
        let id = FieldId(self.fields.len() as u32);
        self.fields.push(field.into());
        id
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The field with `id`.
    pub fn get(&self, id: FieldId) -> Option<&AnyField> {
        self.fields.get(id.index())
    }

    /// Mutable access to the field with `id`.
    pub fn get_mut(&mut self, id: FieldId) -> Option<&mut AnyField> {
        self.fields.get_mut(id.index())
    }

    /// Set one sample. Returns `false` for an unknown field or node.
    pub fn set_sample(&mut self, id: FieldId, node: usize, value: f64) -> bool {
        self.get_mut(id).is_some_and(|f| f.set_sample(node, value))
    }

    /// Iterate over `(id, field)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (FieldId, &AnyField)> {
        self.fields
            .iter()
            .enumerate()
            .map(|(i, f)| (FieldId(i as u32), f))
    }
}

impl std::ops::Index<FieldId> for FieldStore {
    type Output = AnyField;

    fn index(&self, id: FieldId) -> &AnyField {
        &self.fields[id.index()]
    }
}

impl std::ops::IndexMut<FieldId> for FieldStore {
    fn index_mut(&mut self, id: FieldId) -> &mut AnyField {
        &mut self.fields[id.index()]
    }
}
