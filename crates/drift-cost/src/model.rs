//! The [`CostModel`] trait and the pieces every model shares.
//!
//! A model supplies the per-event likelihood formula, names its field
//! roles and event variables, and may keep derived state (for example
//! solved transition densities) that the engine asks it to refresh
//! around a perturbed node.

use indexmap::IndexMap;

use drift_core::{Event, FieldId, NodeList, VAR_MAX};
use drift_field::{AnyField, Field, FieldStore};

use crate::config::{ConfigError, CostConfig};
use crate::engine::LocalCost;

// ── EventCost ──────────────────────────────────────────────────────

/// Mean-corrected displacement and variance of a Gaussian event.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Residual {
    /// Displacement minus its predicted mean.
    pub numer: f64,
    /// Predicted variance of the displacement.
    pub variance: f64,
}

impl Residual {
    /// The standardized residual `numer / sqrt(variance)`.
    pub fn standardized(&self) -> f64 {
        self.numer / self.variance.sqrt()
    }
}

/// Cost of one event plus whatever diagnostics its model produces.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EventCost {
    /// Negative log-likelihood. `+inf` marks an invalid configuration.
    pub cost: f64,
    /// Gaussian residual, for models that have one.
    pub residual: Option<Residual>,
}

impl EventCost {
    /// A cost with no diagnostics.
    pub fn plain(cost: f64) -> Self {
        Self {
            cost,
            residual: None,
        }
    }

    /// A cost with a Gaussian residual.
    pub fn gaussian(cost: f64, numer: f64, variance: f64) -> Self {
        Self {
            cost,
            residual: Some(Residual { numer, variance }),
        }
    }

    /// The rejection signal.
    pub fn invalid() -> Self {
        Self::plain(f64::INFINITY)
    }
}

// ── VarSlots ───────────────────────────────────────────────────────

/// Named event variables of a model and the event slot each reads.
///
/// Variables keep the order the model declares them in, so a model can
/// look slots up by position on the hot path.
///
/// ```
/// use drift_cost::VarSlots;
///
/// let mut vars = VarSlots::new(&[("time", 1), ("pos", 0)]);
/// vars.bind("time", 3).unwrap();
/// assert_eq!(vars.slot(0), 3);
/// assert!(vars.bind("speed", 2).is_err());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct VarSlots {
    slots: IndexMap<&'static str, usize>,
}

impl VarSlots {
    /// Variables with their default slots, in declaration order.
    pub fn new(defaults: &[(&'static str, usize)]) -> Self {
        Self {
            slots: defaults.iter().copied().collect(),
        }
    }

    /// Point variable `name` at event slot `slot`.
    pub fn bind(&mut self, name: &str, slot: usize) -> Result<(), ConfigError> {
        if slot >= VAR_MAX {
            return Err(ConfigError::InvalidParameter {
                name: "event slot",
                reason: format!("slot {slot} for `{name}` exceeds the {VAR_MAX} event slots"),
            });
        }
        match self.slots.get_mut(name) {
            Some(s) => {
                log::debug!("event variable `{name}` bound to slot {slot}");
                *s = slot;
                Ok(())
            }
            None => Err(ConfigError::UnknownEventVar {
                name: name.to_string(),
                options: self.names(),
            }),
        }
    }

    /// Slot of the variable declared at position `var`.
    ///
    /// # Panics
    ///
    /// Panics if `var` is not a declared position.
    pub fn slot(&self, var: usize) -> usize {
        self.slots[var]
    }

    /// Slot of the variable called `name`.
    pub fn get(&self, name: &str) -> Option<usize> {
        self.slots.get(name).copied()
    }

    /// Name of the variable declared at position `var`.
    pub fn name(&self, var: usize) -> Option<&'static str> {
        self.slots.get_index(var).map(|(k, _)| *k)
    }

    /// All variable names in declaration order.
    pub fn names(&self) -> Vec<&'static str> {
        self.slots.keys().copied().collect()
    }

    /// Number of variables.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the model reads no variables.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

// ── BindContext ────────────────────────────────────────────────────

/// What a model sees when it is bound to its data.
pub struct BindContext<'a> {
    /// All fields.
    pub fields: &'a FieldStore,
    /// All events.
    pub events: &'a [Event],
    /// Field whose nodes own the events.
    pub reference: FieldId,
    /// Per-reference-node event bindings.
    pub local: &'a [LocalCost],
    /// Shared settings.
    pub config: &'a CostConfig,
}

// ── CostModel ──────────────────────────────────────────────────────

/// A per-event likelihood formula with its field and variable layout.
///
/// Implementations must be `Send + Sync`: the engine evaluates events
/// from many threads at once through `&self`.
pub trait CostModel: Send + Sync {
    /// Model name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Role names of the fields, in the order of [`fields`](Self::fields).
    fn field_roles(&self) -> &'static [&'static str];

    /// Field ids filling each role.
    fn fields(&self) -> &[FieldId];

    /// Event variable bindings.
    fn event_vars(&self) -> &VarSlots;

    /// Mutable event variable bindings, for setup.
    fn event_vars_mut(&mut self) -> &mut VarSlots;

    /// Cost of one event under the current fields.
    fn event_cost(&self, fields: &FieldStore, event: &Event) -> EventCost;

    /// Validate field kinds and prepare derived state.
    ///
    /// Called once, after events are bound and before any cost is taken.
    fn bind(&mut self, ctx: &BindContext<'_>) -> Result<(), ConfigError> {
        let _ = ctx;
        Ok(())
    }

    /// Whether the field in role `role` must share the reference grid.
    fn on_reference_grid(&self, role: usize) -> bool {
        let _ = role;
        true
    }

    /// Reference nodes whose cached cost depends on the sample at `node`.
    fn region(&self, reference: &AnyField, node: usize) -> NodeList {
        reference.neighbors(node)
    }

    /// Recompute all derived state from the current fields.
    fn refresh_all(&mut self, fields: &FieldStore) {
        let _ = fields;
    }

    /// Recompute derived state after a sample change at `node`.
    ///
    /// `region` is what [`region`](Self::region) returned for `node`; every
    /// piece of derived state refreshed here must be read only by events
    /// of nodes in `region`.
    fn refresh_region(&mut self, fields: &FieldStore, node: usize, region: &[usize]) {
        let _ = (fields, node, region);
    }
}

/// Look up `id` and check that it has `dims` axes.
pub(crate) fn require<'a>(
    fields: &'a FieldStore,
    model: &'static str,
    role: &'static str,
    id: FieldId,
    dims: usize,
) -> Result<&'a AnyField, ConfigError> {
    let field = fields.get(id).ok_or(ConfigError::UnknownField { id })?;
    if field.dimensions() != dims {
        return Err(ConfigError::FieldKind {
            model,
            role,
            expected: if dims == 1 { "1D field" } else { "2D field" },
            found: field.kind(),
        });
    }
    Ok(field)
}

/// Require every role field to have `dims` axes.
pub(crate) fn require_all(
    model: &dyn CostModel,
    fields: &FieldStore,
    dims: usize,
) -> Result<(), ConfigError> {
    for (&id, &role) in model.fields().iter().zip(model.field_roles()) {
        require(fields, model.name(), role, id, dims)?;
    }
    Ok(())
}
