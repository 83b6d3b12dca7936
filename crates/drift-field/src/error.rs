//! Error types for field construction, parsing and mapping.

use std::error::Error;
use std::fmt;

use crate::field::FieldKind;

/// Errors arising from field construction, file parsing or field mapping.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldError {
    /// Attempted to construct a field with zero nodes.
    EmptyField,
    /// Grid spacing or origin is not usable.
    InvalidSpacing {
        /// What went wrong.
        reason: String,
    },
    /// Sample and error columns have different lengths than the grid.
    LengthMismatch {
        /// Nodes in the grid.
        expected: usize,
        /// Values supplied.
        found: usize,
    },
    /// A line of a text file could not be parsed.
    Parse {
        /// One-based line number.
        line: usize,
        /// What went wrong.
        reason: String,
    },
    /// Tabulated positions are not evenly spaced.
    UnevenSpacing {
        /// One-based line number of the first offending row.
        line: usize,
        /// Spacing inferred from the first two rows.
        expected: f64,
        /// Spacing found at the offending row.
        found: f64,
    },
    /// A volumetric grid header is missing a required line.
    MissingHeader {
        /// Which header entry is missing.
        entry: &'static str,
    },
    /// A volumetric grid declares a different number of values than it holds.
    SizeMismatch {
        /// Values declared by the header.
        declared: usize,
        /// Values present.
        found: usize,
    },
    /// Two fields of incompatible kinds were combined.
    KindMismatch {
        /// Kind required by the operation.
        expected: FieldKind,
        /// Kind supplied.
        found: FieldKind,
    },
    /// A node index is outside the field.
    NodeOutOfRange {
        /// Offending node.
        node: usize,
        /// Number of nodes in the field.
        len: usize,
    },
    /// A source field does not cover this field's domain.
    NotSpanned {
        /// Human-readable description of the uncovered boundary.
        reason: String,
    },
    /// Reading or writing failed.
    Io {
        /// Underlying I/O error message.
        reason: String,
    },
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyField => write!(f, "field must have at least one node"),
            Self::InvalidSpacing { reason } => write!(f, "invalid grid spacing: {reason}"),
            Self::LengthMismatch { expected, found } => {
                write!(f, "expected {expected} values, found {found}")
            }
            Self::Parse { line, reason } => write!(f, "line {line}: {reason}"),
            Self::UnevenSpacing {
                line,
                expected,
                found,
            } => write!(
                f,
                "line {line}: spacing {found} differs from inferred spacing {expected}"
            ),
            Self::MissingHeader { entry } => {
                write!(f, "volumetric grid header is missing `{entry}`")
            }
            Self::SizeMismatch { declared, found } => write!(
                f,
                "volumetric grid declares {declared} values but contains {found}"
            ),
            Self::KindMismatch { expected, found } => {
                write!(f, "expected a {expected} field, found a {found} field")
            }
            Self::NodeOutOfRange { node, len } => {
                write!(f, "node {node} out of range [0, {len})")
            }
            Self::NotSpanned { reason } => write!(f, "domain not spanned: {reason}"),
            Self::Io { reason } => write!(f, "i/o error: {reason}"),
        }
    }
}

impl Error for FieldError {}

impl From<std::io::Error> for FieldError {
    fn from(e: std::io::Error) -> Self {
        Self::Io {
            reason: e.to_string(),
        }
    }
}
