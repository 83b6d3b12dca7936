//! Incremental trajectory cost evaluation.
//!
//! [`CostEngine`] binds every event once to the enclosing node of a
//! reference field and caches, per node, the summed cost of its events.
//! A single-sample perturbation then only re-evaluates the events of the
//! nodes whose interpolation stencil contains the sample.
//!
//! The driver protocol for one trial is:
//!
//! 1. [`apply`](CostEngine::apply) (or mutate the field and call
//!    [`delta_cost`](CostEngine::delta_cost)) to get the cost change;
//! 2. on acceptance, [`clone_last`](CostEngine::clone_last);
//! 3. on rejection, [`restore`](CostEngine::restore) (or restore the
//!    sample and call [`revert`](CostEngine::revert)).

use std::sync::Arc;

use rayon::prelude::*;

use drift_core::{Event, FieldId, NodeList, TrialMove};
use drift_field::{AnyField, Field, FieldStore};

use crate::config::{ConfigError, CostConfig};
use crate::model::{BindContext, CostModel, EventCost};

/// Cached cost of the events bound to one reference node.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LocalCost {
    /// Indices of the events bound to this node. Fixed after construction.
    pub events: Vec<usize>,
    /// Cost under the current field values.
    pub curr: f64,
    /// Cost at the last commit, or before the last trial.
    pub last: f64,
}

/// A cost model bound to its fields and events.
pub struct CostEngine<M: CostModel> {
    model: M,
    fields: FieldStore,
    events: Arc<[Event]>,
    reference: FieldId,
    local: Vec<LocalCost>,
    config: CostConfig,
}

/// Relative tolerance, in node spacings, on grid positions of coupled fields.
const GEOMETRY_TOLERANCE: f64 = 1e-9;

fn same_axis(a: &AnyField, b: &AnyField, axis: usize) -> bool {
    let tol = GEOMETRY_TOLERANCE * a.spacing(axis).abs();
    let ((a0, a1), (b0, b1)) = (a.bounds(axis), b.bounds(axis));
    (a.spacing(axis) - b.spacing(axis)).abs() <= tol
        && (a0 - b0).abs() <= tol
        && (a1 - b1).abs() <= tol
}

impl<M: CostModel> CostEngine<M> {
    /// Bind `model` to `fields` and `events`, computing the initial costs.
    ///
    /// Events are assigned to the reference node enclosing their first
    /// `d` variables, where `d` is the reference field's dimension.
    pub fn new(
        mut model: M,
        fields: FieldStore,
        events: impl Into<Arc<[Event]>>,
        reference: FieldId,
        config: CostConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let events: Arc<[Event]> = events.into();
        if events.is_empty() {
            return Err(ConfigError::NoEvents);
        }
        let ref_field = fields
            .get(reference)
            .ok_or(ConfigError::UnknownField { id: reference })?;
        let dims = ref_field.dimensions();
        let nodes = ref_field.len();

        if model.fields().len() != model.field_roles().len() {
            return Err(ConfigError::FieldCount {
                model: model.name(),
                expected: model.field_roles().len(),
                found: model.fields().len(),
            });
        }
        for (i, (&id, &role)) in model.fields().iter().zip(model.field_roles()).enumerate() {
            let field = fields.get(id).ok_or(ConfigError::UnknownField { id })?;
            if field.dimensions() != dims {
                return Err(ConfigError::FieldKind {
                    model: model.name(),
                    role,
                    expected: if dims == 1 { "1D field" } else { "2D field" },
                    found: field.kind(),
                });
            }
            if !model.on_reference_grid(i) {
                continue;
            }
            if field.len() != nodes {
                return Err(ConfigError::GridMismatch {
                    model: model.name(),
                    role,
                    expected: nodes,
                    found: field.len(),
                });
            }
            if let Some(axis) = (0..dims).find(|&a| !same_axis(ref_field, field, a)) {
                return Err(ConfigError::GridGeometry {
                    model: model.name(),
                    role,
                    axis,
                });
            }
        }

        let mut local = vec![LocalCost::default(); nodes];
        for (e, event) in events.iter().enumerate() {
            let node = ref_field.enclosing_node(&event.var[..dims]);
            local[node].events.push(e);
        }

        model.bind(&BindContext {
            fields: &fields,
            events: &events,
            reference,
            local: &local,
            config: &config,
        })?;

        let mut engine = Self {
            model,
            fields,
            events,
            reference,
            local,
            config,
        };
        let total = engine.update_local();
        engine.clone_last();
        log::info!(
            "{}: {} events on {} reference nodes, initial cost {total}",
            engine.model.name(),
            engine.events.len(),
            nodes
        );
        Ok(engine)
    }

    fn reference_field(&self) -> &AnyField {
        &self.fields[self.reference]
    }

    fn cost_of(&self, e: usize) -> f64 {
        let cost = self.model.event_cost(&self.fields, &self.events[e]).cost;
        if self.config.nan_check && cost.is_nan() {
            self.nan_abort(e);
        }
        cost
    }

    fn nan_abort(&self, e: usize) -> ! {
        let event = &self.events[e];
        log::error!(
            "{}: NaN cost for event {e} (serial {}) var {:?} del {:?}",
            self.model.name(),
            event.serial,
            event.var,
            event.del
        );
        panic!("NaN cost for event {e} in {}", self.model.name());
    }

    fn node_cost(&self, j: usize) -> f64 {
        self.local[j].events.iter().map(|&e| self.cost_of(e)).sum()
    }

    /// Sorted, de-duplicated reference nodes affected by a change at `node`.
    fn neighborhood(&self, node: usize) -> NodeList {
        let reference = self.reference_field();
        if node >= reference.len() {
            return NodeList::new();
        }
        let mut region = self.model.region(reference, node);
        region.sort_unstable();
        region.dedup();
        region
    }

    /// Cost of event `e` with its diagnostics, or `None` if out of range.
    pub fn event_cost(&self, e: usize) -> Option<EventCost> {
        let event = self.events.get(e)?;
        let cost = self.model.event_cost(&self.fields, event);
        if self.config.nan_check && cost.cost.is_nan() {
            self.nan_abort(e);
        }
        Some(cost)
    }

    /// Sum of every event cost, computed from scratch.
    pub fn total_cost(&self) -> f64 {
        (0..self.events.len())
            .into_par_iter()
            .map(|e| self.cost_of(e))
            .sum()
    }

    /// Sum of the cached per-node costs.
    pub fn cached_cost(&self) -> f64 {
        self.local.iter().map(|l| l.curr).sum()
    }

    /// Refresh derived state and recompute every node's cached cost.
    ///
    /// Returns the new total. `last` is left alone.
    pub fn update_local(&mut self) -> f64 {
        self.model.refresh_all(&self.fields);
        let costs: Vec<f64> = (0..self.local.len())
            .into_par_iter()
            .map(|j| self.node_cost(j))
            .collect();
        for (l, c) in self.local.iter_mut().zip(&costs) {
            l.curr = *c;
        }
        costs.iter().sum()
    }

    /// Cost change from a sample already changed at `trial.node`.
    ///
    /// Each affected node's current cost is saved to `last` before being
    /// recomputed.
    pub fn delta_cost(&mut self, trial: &TrialMove) -> f64 {
        let region = self.neighborhood(trial.node);
        log::trace!("delta over {} nodes around {}", region.len(), trial.node);
        self.model.refresh_region(&self.fields, trial.node, &region);
        let fresh: Vec<f64> = region.par_iter().map(|&j| self.node_cost(j)).collect();

        let mut dc = 0.0;
        for (&j, c) in region.iter().zip(fresh) {
            let l = &mut self.local[j];
            l.last = l.curr;
            l.curr = c;
            dc += c - l.last;
        }
        dc
    }

    /// Undo [`delta_cost`](Self::delta_cost) for a sample already restored.
    pub fn revert(&mut self, trial: &TrialMove) {
        let region = self.neighborhood(trial.node);
        self.model.refresh_region(&self.fields, trial.node, &region);
        for &j in &region {
            let l = &mut self.local[j];
            l.curr = l.last;
        }
    }

    /// Commit the current cached costs.
    pub fn clone_last(&mut self) {
        self.local.par_iter_mut().for_each(|l| l.last = l.curr);
    }

    /// Set one field sample without touching cached costs.
    pub fn set_sample(&mut self, field: FieldId, node: usize, value: f64) -> bool {
        self.fields.set_sample(field, node, value)
    }

    /// Write the trial value and return the cost change.
    pub fn apply(&mut self, trial: &TrialMove) -> f64 {
        if !self.set_sample(trial.field, trial.node, trial.trial_value) {
            return 0.0;
        }
        self.delta_cost(trial)
    }

    /// Put back the prior value and cached costs of a rejected trial.
    pub fn restore(&mut self, trial: &TrialMove) {
        if self.set_sample(trial.field, trial.node, trial.last_value) {
            self.revert(trial);
        }
    }

    /// The bound model.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// All fields.
    pub fn fields(&self) -> &FieldStore {
        &self.fields
    }

    /// All events.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Id of the reference field.
    pub fn reference(&self) -> FieldId {
        self.reference
    }

    /// Shared settings.
    pub fn config(&self) -> &CostConfig {
        &self.config
    }

    /// Cached per-node costs.
    pub fn local_costs(&self) -> &[LocalCost] {
        &self.local
    }

    /// Name of the model's event variable at position `i`.
    pub fn event_var_name(&self, i: usize) -> Option<&'static str> {
        self.model.event_vars().name(i)
    }

    /// Event slot read by the model's variable at position `i`.
    pub fn event_var_slot(&self, i: usize) -> Option<usize> {
        let vars = self.model.event_vars();
        (i < vars.len()).then(|| vars.slot(i))
    }

    /// Name of the model's field role at position `i`.
    pub fn field_role_name(&self, i: usize) -> Option<&'static str> {
        self.model.field_roles().get(i).copied()
    }

    /// Consume the engine, returning its fields.
    pub fn into_fields(self) -> FieldStore {
        self.fields
    }
}

// ── TrajectoryCost ─────────────────────────────────────────────────

/// Object-safe view of a [`CostEngine`], for drivers that pick the model
/// at run time.
pub trait TrajectoryCost: Send + Sync {
    /// Model name.
    fn name(&self) -> &'static str;
    /// See [`CostEngine::total_cost`].
    fn total_cost(&self) -> f64;
    /// See [`CostEngine::cached_cost`].
    fn cached_cost(&self) -> f64;
    /// See [`CostEngine::update_local`].
    fn update_local(&mut self) -> f64;
    /// See [`CostEngine::delta_cost`].
    fn delta_cost(&mut self, trial: &TrialMove) -> f64;
    /// See [`CostEngine::revert`].
    fn revert(&mut self, trial: &TrialMove);
    /// See [`CostEngine::clone_last`].
    fn clone_last(&mut self);
    /// See [`CostEngine::event_cost`].
    fn event_cost(&self, e: usize) -> Option<EventCost>;
    /// See [`CostEngine::set_sample`].
    fn set_sample(&mut self, field: FieldId, node: usize, value: f64) -> bool;
    /// See [`CostEngine::apply`].
    fn apply(&mut self, trial: &TrialMove) -> f64;
    /// See [`CostEngine::restore`].
    fn restore(&mut self, trial: &TrialMove);
    /// See [`CostEngine::fields`].
    fn fields(&self) -> &FieldStore;
    /// See [`CostEngine::events`].
    fn events(&self) -> &[Event];
    /// See [`CostEngine::reference`].
    fn reference(&self) -> FieldId;
    /// See [`CostEngine::local_costs`].
    fn local_costs(&self) -> &[LocalCost];
    /// Field ids filling each role.
    fn role_fields(&self) -> &[FieldId];
    /// See [`CostEngine::event_var_name`].
    fn event_var_name(&self, i: usize) -> Option<&'static str>;
    /// See [`CostEngine::event_var_slot`].
    fn event_var_slot(&self, i: usize) -> Option<usize>;
    /// See [`CostEngine::field_role_name`].
    fn field_role_name(&self, i: usize) -> Option<&'static str>;
    /// Thermal energy.
    fn kt(&self) -> f64;
}

impl<M: CostModel> TrajectoryCost for CostEngine<M> {
    fn name(&self) -> &'static str {
        self.model.name()
    }

    fn total_cost(&self) -> f64 {
        CostEngine::total_cost(self)
    }

    fn cached_cost(&self) -> f64 {
        CostEngine::cached_cost(self)
    }

    fn update_local(&mut self) -> f64 {
        CostEngine::update_local(self)
    }

    fn delta_cost(&mut self, trial: &TrialMove) -> f64 {
        CostEngine::delta_cost(self, trial)
    }

    fn revert(&mut self, trial: &TrialMove) {
        CostEngine::revert(self, trial)
    }

    fn clone_last(&mut self) {
        CostEngine::clone_last(self)
    }

    fn event_cost(&self, e: usize) -> Option<EventCost> {
        CostEngine::event_cost(self, e)
    }

    fn set_sample(&mut self, field: FieldId, node: usize, value: f64) -> bool {
        CostEngine::set_sample(self, field, node, value)
    }

    fn apply(&mut self, trial: &TrialMove) -> f64 {
        CostEngine::apply(self, trial)
    }

    fn restore(&mut self, trial: &TrialMove) {
        CostEngine::restore(self, trial)
    }

    fn fields(&self) -> &FieldStore {
        CostEngine::fields(self)
    }

    fn events(&self) -> &[Event] {
        CostEngine::events(self)
    }

    fn reference(&self) -> FieldId {
        self.reference
    }

    fn local_costs(&self) -> &[LocalCost] {
        &self.local
    }

    fn role_fields(&self) -> &[FieldId] {
        self.model.fields()
    }

    fn event_var_name(&self, i: usize) -> Option<&'static str> {
        CostEngine::event_var_name(self, i)
    }

    fn event_var_slot(&self, i: usize) -> Option<usize> {
        CostEngine::event_var_slot(self, i)
    }

    fn field_role_name(&self, i: usize) -> Option<&'static str> {
        CostEngine::field_role_name(self, i)
    }

    fn kt(&self) -> f64 {
        self.config.kt
    }
}
