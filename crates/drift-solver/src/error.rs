//! Errors from density propagation.

use std::error::Error;
use std::fmt;

/// A propagated density that cannot be used as a probability.
#[derive(Clone, Debug, PartialEq)]
pub enum InvalidDensity {
    /// A node came out negative (or NaN) beyond the tolerance.
    Negative {
        /// Node the density was started from.
        origin: usize,
        /// First offending node.
        node: usize,
        /// Value found there.
        value: f64,
    },
    /// The total mass was zero, negative or not finite.
    NoMass {
        /// Node the density was started from.
        origin: usize,
        /// Mass found before normalization.
        total: f64,
    },
}

impl fmt::Display for InvalidDensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Negative {
                origin,
                node,
                value,
            } => write!(
                f,
                "density from node {origin} has negative probability {value} at node {node}"
            ),
            Self::NoMass { origin, total } => {
                write!(f, "density from node {origin} has unusable total mass {total}")
            }
        }
    }
}

impl Error for InvalidDensity {}
