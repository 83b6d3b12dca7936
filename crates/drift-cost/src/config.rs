//! Engine configuration, validation, and error types.
//!
//! [`CostConfig`] carries the settings shared by every cost model.
//! [`ConfigError`] is returned by every construction-time check; runtime
//! numeric trouble is reported through infinite costs instead.

use std::error::Error;
use std::fmt;

use drift_core::FieldId;
use drift_field::{FieldError, FieldKind};

// ── LagTolerance ───────────────────────────────────────────────────

/// Relative tolerances on the spread of event time lags.
///
/// Finite-difference models solve once per lag, so all of their events
/// must share it. Deviation is measured relative to the first event.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LagTolerance {
    /// Deviation above which construction fails. Default: 0.1.
    pub fatal: f64,
    /// Deviation above which a warning is logged. Default: 1e-6.
    pub warn: f64,
}

impl Default for LagTolerance {
    fn default() -> Self {
        Self {
            fatal: 0.1,
            warn: 1e-6,
        }
    }
}

impl LagTolerance {
    /// Check `lag` of event `event` against `reference`.
    pub fn check(&self, reference: f64, lag: f64, event: usize) -> Result<(), ConfigError> {
        let deviation = ((reference - lag) / reference).abs();
        if !(deviation <= self.fatal) {
            return Err(ConfigError::LagMismatch {
                event,
                reference,
                found: lag,
            });
        }
        if deviation > self.warn {
            log::warn!(
                "event {event} lag {lag} deviates from {reference} by {deviation:.3e} (relative)"
            );
        }
        Ok(())
    }
}

// ── CostConfig ─────────────────────────────────────────────────────

/// Settings shared by every cost model.
#[derive(Clone, Debug, PartialEq)]
pub struct CostConfig {
    /// Thermal energy in the units of the force fields. Default: 1.
    pub kt: f64,
    /// Time-lag consistency thresholds.
    pub lag: LagTolerance,
    /// Abort on the first NaN event cost. Default: false.
    ///
    /// When off, a NaN flows into the summed cost unchecked.
    pub nan_check: bool,
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            kt: 1.0,
            lag: LagTolerance::default(),
            nan_check: false,
        }
    }
}

impl CostConfig {
    /// Inverse thermal energy.
    pub fn beta(&self) -> f64 {
        1.0 / self.kt
    }

    /// Check that every setting is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.kt > 0.0) || !self.kt.is_finite() {
            return Err(ConfigError::InvalidParameter {
                name: "kt",
                reason: format!("must be finite and > 0, got {}", self.kt),
            });
        }
        let lag = &self.lag;
        if !(lag.warn >= 0.0) || !(lag.fatal >= lag.warn) {
            return Err(ConfigError::InvalidParameter {
                name: "lag",
                reason: format!(
                    "need 0 <= warn <= fatal, got warn {} and fatal {}",
                    lag.warn, lag.fatal
                ),
            });
        }
        Ok(())
    }
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected while constructing a cost engine.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// The model was given the wrong number of fields.
    FieldCount {
        /// Model name.
        model: &'static str,
        /// Fields the model takes.
        expected: usize,
        /// Fields supplied.
        found: usize,
    },
    /// A field has the wrong kind for its role.
    FieldKind {
        /// Model name.
        model: &'static str,
        /// Role of the field within the model.
        role: &'static str,
        /// Description of what the role accepts.
        expected: &'static str,
        /// Kind supplied.
        found: FieldKind,
    },
    /// A field id is not present in the store.
    UnknownField {
        /// The missing id.
        id: FieldId,
    },
    /// Coupled fields disagree on their node count.
    GridMismatch {
        /// Model name.
        model: &'static str,
        /// Role of the mismatched field.
        role: &'static str,
        /// Nodes in the reference field.
        expected: usize,
        /// Nodes in the mismatched field.
        found: usize,
    },
    /// Coupled fields have equal node counts but different positions.
    GridGeometry {
        /// Model name.
        model: &'static str,
        /// Role of the mismatched field.
        role: &'static str,
        /// Axis along which the grids differ.
        axis: usize,
    },
    /// An event-variable name is not known to the model.
    UnknownEventVar {
        /// The name given.
        name: String,
        /// Names the model accepts.
        options: Vec<&'static str>,
    },
    /// The event list is empty.
    NoEvents,
    /// An event's time lag differs too much from the first event's.
    LagMismatch {
        /// Offending event.
        event: usize,
        /// Lag of the first event.
        reference: f64,
        /// Lag of the offending event.
        found: f64,
    },
    /// A numeric or structural parameter is out of range.
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// What is wrong with it.
        reason: String,
    },
    /// An event's lag is too short for the solver timestep.
    TooFewSteps {
        /// Offending event.
        event: usize,
        /// Steps the lag yields.
        steps: usize,
        /// Minimum steps required.
        min: usize,
    },
    /// An event selects a bias frame but no bias history was given.
    MissingBias {
        /// Offending event.
        event: usize,
    },
    /// A field operation failed during construction.
    Field(FieldError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FieldCount {
                model,
                expected,
                found,
            } => write!(f, "{model} takes {expected} fields, got {found}"),
            Self::FieldKind {
                model,
                role,
                expected,
                found,
            } => write!(f, "{model} {role} must be a {expected}, got a {found} field"),
            Self::UnknownField { id } => write!(f, "field {id} is not in the store"),
            Self::GridMismatch {
                model,
                role,
                expected,
                found,
            } => write!(
                f,
                "{model} {role} has {found} nodes but the reference field has {expected}"
            ),
            Self::GridGeometry { model, role, axis } => write!(
                f,
                "{model} {role} lies on a different grid than the reference field along axis {axis}"
            ),
            Self::UnknownEventVar { name, options } => write!(
                f,
                "unrecognized event variable `{name}`; options are: {}",
                options.join(" ")
            ),
            Self::NoEvents => write!(f, "no events to evaluate"),
            Self::LagMismatch {
                event,
                reference,
                found,
            } => write!(
                f,
                "event {event} lag {found} differs from first event lag {reference}; \
                 all events must share one lag"
            ),
            Self::InvalidParameter { name, reason } => write!(f, "{name}: {reason}"),
            Self::TooFewSteps { event, steps, min } => write!(
                f,
                "event {event} gives {steps} solver steps, need at least {min}; reduce the timestep"
            ),
            Self::MissingBias { event } => {
                write!(f, "event {event} selects a bias frame but no bias history was given")
            }
            Self::Field(e) => write!(f, "field: {e}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Field(e) => Some(e),
            _ => None,
        }
    }
}

impl From<FieldError> for ConfigError {
    fn from(e: FieldError) -> Self {
        Self::Field(e)
    }
}
