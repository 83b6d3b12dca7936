//! Error types for event construction.

use std::error::Error;
use std::fmt;

/// Errors arising when turning sampled trajectory rows into events.
#[derive(Clone, Debug, PartialEq)]
pub enum EventError {
    /// A variable slot beyond [`VAR_MAX`](crate::VAR_MAX) was addressed.
    TooManyVariables {
        /// Number of variables requested.
        requested: usize,
        /// Maximum supported.
        max: usize,
    },
    /// A sample row has a different width than the first row.
    RaggedRow {
        /// Zero-based row index.
        row: usize,
        /// Width of the first row.
        expected: usize,
        /// Width of the offending row.
        found: usize,
    },
    /// The lag stride must be at least one sample.
    ZeroStride,
    /// Not enough rows to form a single transition.
    TooFewRows {
        /// Rows supplied.
        rows: usize,
        /// Stride requested.
        stride: usize,
    },
}

impl fmt::Display for EventError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooManyVariables { requested, max } => {
                write!(f, "{requested} event variables requested, at most {max} supported")
            }
            Self::RaggedRow {
                row,
                expected,
                found,
            } => write!(
                f,
                "sample row {row} has {found} columns, expected {expected}"
            ),
            Self::ZeroStride => write!(f, "lag stride must be at least 1"),
            Self::TooFewRows { rows, stride } => write!(
                f,
                "{rows} sample rows cannot form a transition with stride {stride}"
            ),
        }
    }
}

impl Error for EventError {}
