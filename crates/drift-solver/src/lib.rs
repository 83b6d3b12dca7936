//! Finite-difference propagation of transition densities.
//!
//! [`CrankNicolson`] evolves a density on a [`Grid1D`](drift_field::Grid1D)
//! under the Smoluchowski equation with position-dependent diffusivity and
//! force, both read through the [`Field`](drift_field::Field) trait.
//! Aperiodic grids reflect at their ends; periodic grids wrap.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod crank_nicolson;
pub mod error;
mod tridiag;

pub use crank_nicolson::{CrankNicolson, CrankNicolsonBuilder};
pub use error::InvalidDensity;
