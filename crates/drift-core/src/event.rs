//! Sampled transitions of a trajectory.
//!
//! An [`Event`] is one observed transition: for each generic variable
//! slot it records the value before the transition, the change over the
//! lag (`del`) and the change over the preceding lag (`del0`). Which slot
//! means "time", "position" or "bias force" is decided by the cost model
//! through its named variable bindings, not by the event itself.

use crate::error::EventError;

/// Maximum number of variable slots carried by one event.
pub const VAR_MAX: usize = 8;

/// One observed transition.
///
/// Events are built once from parsed trajectory data and shared
/// read-only by every cost model afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct Event {
    /// Value of each variable at the start of the transition.
    pub var: [f64; VAR_MAX],
    /// Change of each variable over the transition.
    pub del: [f64; VAR_MAX],
    /// Change of each variable over the preceding transition.
    pub del0: [f64; VAR_MAX],
    /// Source-order serial id.
    pub serial: usize,
    /// Bias frame selector, if the trajectory was biased.
    pub bias: Option<usize>,
    /// Group tag.
    pub group: u32,
}

impl Event {
    /// An event with every slot zeroed, no bias and group 0.
    pub fn new(serial: usize) -> Self {
        Self {
            var: [0.0; VAR_MAX],
            del: [0.0; VAR_MAX],
            del0: [0.0; VAR_MAX],
            serial,
            bias: None,
            group: 0,
        }
    }

    /// Fill one variable slot.
    ///
    /// # Panics
    ///
    /// Panics if `slot >= VAR_MAX`.
    pub fn with_var(mut self, slot: usize, value: f64, delta: f64, prev_delta: f64) -> Self {
        self.var[slot] = value;
        self.del[slot] = delta;
        self.del0[slot] = prev_delta;
        self
    }

    /// Attach a bias frame selector.
    pub fn with_bias(mut self, frame: usize) -> Self {
        self.bias = Some(frame);
        self
    }

    /// Attach a group tag.
    pub fn with_group(mut self, group: u32) -> Self {
        self.group = group;
        self
    }

    /// Value of `slot` at the end of the transition.
    pub fn end(&self, slot: usize) -> f64 {
        self.var[slot] + self.del[slot]
    }
}

/// Build events from equally spaced trajectory samples.
///
/// Each row holds one sample of up to [`VAR_MAX`] variables. Row `t`
/// produces an event when `t + stride` exists: `var = row[t]`,
/// `del = row[t + stride] - row[t]` and `del0 = row[t] - row[t - stride]`
/// (zero for the first `stride` rows). Serial ids are row indices.
pub fn events_from_samples(
    rows: &[Vec<f64>],
    stride: usize,
    group: u32,
) -> Result<Vec<Event>, EventError> {
    if stride == 0 {
        return Err(EventError::ZeroStride);
    }
    if rows.len() <= stride {
        return Err(EventError::TooFewRows {
            rows: rows.len(),
            stride,
        });
    }
    let width = rows[0].len();
    if width > VAR_MAX {
        return Err(EventError::TooManyVariables {
            requested: width,
            max: VAR_MAX,
        });
    }
    for (row, r) in rows.iter().enumerate() {
        if r.len() != width {
            return Err(EventError::RaggedRow {
                row,
                expected: width,
                found: r.len(),
            });
        }
    }

    let events = (0..rows.len() - stride)
        .map(|t| {
            let mut event = Event::new(t).with_group(group);
            for k in 0..width {
                let prev_delta = if t >= stride {
                    rows[t][k] - rows[t - stride][k]
                } else {
                    0.0
                };
                event = event.with_var(k, rows[t][k], rows[t + stride][k] - rows[t][k], prev_delta);
            }
            event
        })
        .collect();
    Ok(events)
}
