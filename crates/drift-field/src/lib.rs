//! Interpolated scalar fields on uniform grids.
//!
//! A field is a set of node samples plus a rule for evaluating between
//! them. Every variant implements the object-safe [`Field`] trait, which
//! is how the cost engine and solver see them.
//!
//! # Variants
//!
//! - [`CubicField`]: 1D local cubic through the samples
//! - [`ZeroField`]: 1D nearest-sample step function
//! - [`BicubicField`]: 2D bicubic over a rectangular lattice
//!
//! [`AnyField`] closes the set for storage in a [`FieldStore`], addressed
//! by [`FieldId`](drift_core::FieldId).
//!
//! # Files
//!
//! Tabulated `position value [error]` tables ([`parse_tabulated`]),
//! volumetric grids ([`parse_volumetric`]) and multi-frame bias histories
//! ([`BiasHistory`]) are read and written here.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod bicubic;
pub mod boundary;
pub mod cubic;
pub mod error;
pub mod field;
pub mod grid1d;
pub mod history;
mod span;
pub mod store;
pub mod tabulated;
pub mod volumetric;
pub mod zero;

#[cfg(test)]
pub(crate) mod compliance;

pub use bicubic::BicubicField;
pub use boundary::Boundary;
pub use cubic::CubicField;
pub use error::FieldError;
pub use field::{Field, FieldKind};
pub use grid1d::Grid1D;
pub use history::BiasHistory;
pub use store::{AnyField, FieldStore};
pub use tabulated::{parse_tabulated, read_tabulated, write_profile, write_tabulated, Tabulated};
pub use volumetric::{parse_volumetric, read_volumetric, write_volumetric, Volumetric};
pub use zero::ZeroField;
