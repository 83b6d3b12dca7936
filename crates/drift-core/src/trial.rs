//! Single-node perturbation proposed by an optimizer driver.

use crate::id::FieldId;

/// A proposed change of one field sample.
///
/// Lives for one optimizer iteration: the driver writes `trial_value`
/// into the field, asks the cost engine for the cost difference, and
/// either commits or writes `last_value` back and reverts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrialMove {
    /// Field being perturbed.
    pub field: FieldId,
    /// Flat node index within that field.
    pub node: usize,
    /// Value under trial.
    pub trial_value: f64,
    /// Value before the trial.
    pub last_value: f64,
}

impl TrialMove {
    /// Describe a move of `field[node]` from `last_value` to `trial_value`.
    pub fn new(field: FieldId, node: usize, last_value: f64, trial_value: f64) -> Self {
        Self {
            field,
            node,
            trial_value,
            last_value,
        }
    }

    /// Size of the proposed step.
    pub fn step(&self) -> f64 {
        self.trial_value - self.last_value
    }
}
