//! Run-time model selection.
//!
//! [`ModelSpec`] names a model and its parameters; [`CostSetup`] pairs it
//! with field roles, event-variable overrides, and settings, and builds a
//! boxed [`TrajectoryCost`] for drivers that choose the model from input.

use std::sync::Arc;

use drift_core::{Event, FieldId};
use drift_field::{BiasHistory, FieldStore};

use crate::config::{ConfigError, CostConfig};
use crate::engine::{CostEngine, TrajectoryCost};
use crate::gaussian::{Ccg, Ccg2d, CcgLog};
use crate::model::CostModel;
use crate::reflect::{Reflect, Reflect2d};
use crate::smol::{HopPolicy, SmolCrank, SmolCrankBias};

/// A cost model and its model-specific parameters.
#[derive(Clone, Debug)]
pub enum ModelSpec {
    /// Closed-form Gaussian over diffusivity and force.
    Ccg,
    /// Closed-form Gaussian over log diffusivity and force.
    CcgLog,
    /// Closed-form Gaussian over a 2D diffusivity and potential of mean force.
    Ccg2d,
    /// Gaussian with reflecting-wall images.
    Reflect,
    /// Gaussian with reflecting-wall images along one axis of a 2D domain.
    Reflect2d {
        /// Axis the walls are normal to.
        axis: usize,
    },
    /// Cached Crank-Nicolson densities per solution-grid node.
    SmolCrank {
        /// Solver timestep.
        timestep: f64,
        /// Neighborhood rule.
        hop: HopPolicy,
    },
    /// Crank-Nicolson density per event under its bias frame.
    SmolCrankBias {
        /// Solver timestep.
        timestep: f64,
        /// Neighborhood rule.
        hop: HopPolicy,
        /// Bias frames selected by [`Event::bias`].
        history: Option<BiasHistory>,
    },
}

impl ModelSpec {
    /// Model name as reported by the built engine.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ccg => "ccg",
            Self::CcgLog => "ccgLog",
            Self::Ccg2d => "ccg2d",
            Self::Reflect => "reflect",
            Self::Reflect2d { .. } => "reflect2d",
            Self::SmolCrank { .. } => "smolCrank",
            Self::SmolCrankBias { .. } => "smolCrankBias",
        }
    }

    /// Number of fields the model takes.
    pub fn field_count(&self) -> usize {
        match self {
            Self::SmolCrank { .. } => 3,
            _ => 2,
        }
    }

    /// Build with default event variables.
    ///
    /// `reference` defaults to the first role field.
    pub fn build(
        self,
        store: FieldStore,
        roles: &[FieldId],
        events: impl Into<Arc<[Event]>>,
        reference: Option<FieldId>,
        config: CostConfig,
    ) -> Result<Box<dyn TrajectoryCost>, ConfigError> {
        let mut setup = CostSetup::new(self).fields(roles).config(config);
        if let Some(r) = reference {
            setup = setup.reference(r);
        }
        setup.build(store, events)
    }
}

/// Builder pairing a [`ModelSpec`] with its fields and settings.
///
/// ```
/// use drift_core::Event;
/// use drift_cost::{CostSetup, ModelSpec};
/// use drift_field::{Boundary, CubicField, FieldStore, Grid1D};
///
/// let grid = Grid1D::new(10, 0.0, 1.0, Boundary::Periodic).unwrap();
/// let mut store = FieldStore::new();
/// let d = store.push(CubicField::uniform(grid, 1.0));
/// let f = store.push(CubicField::uniform(grid, 0.0));
/// let events = vec![Event::new(0).with_var(0, 2.5, 0.1, 0.0).with_var(3, 0.0, 0.01, 0.0)];
///
/// let cost = CostSetup::new(ModelSpec::Ccg)
///     .fields(&[d, f])
///     .bind_var("time", 3)
///     .build(store, events)
///     .unwrap();
/// assert!(cost.total_cost().is_finite());
/// ```
#[derive(Clone, Debug)]
pub struct CostSetup {
    spec: ModelSpec,
    fields: Vec<FieldId>,
    reference: Option<FieldId>,
    vars: Vec<(String, usize)>,
    config: CostConfig,
}

impl CostSetup {
    /// Start a setup for `spec`.
    pub fn new(spec: ModelSpec) -> Self {
        Self {
            spec,
            fields: Vec::new(),
            reference: None,
            vars: Vec::new(),
            config: CostConfig::default(),
        }
    }

    /// Field ids in the model's role order.
    pub fn fields(mut self, fields: &[FieldId]) -> Self {
        self.fields = fields.to_vec();
        self
    }

    /// Field whose nodes own the events. Default: the first role field.
    pub fn reference(mut self, id: FieldId) -> Self {
        self.reference = Some(id);
        self
    }

    /// Read event variable `name` from event slot `slot`.
    pub fn bind_var(mut self, name: impl Into<String>, slot: usize) -> Self {
        self.vars.push((name.into(), slot));
        self
    }

    /// Shared settings.
    pub fn config(mut self, config: CostConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the engine over `store` and `events`.
    pub fn build(
        self,
        store: FieldStore,
        events: impl Into<Arc<[Event]>>,
    ) -> Result<Box<dyn TrajectoryCost>, ConfigError> {
        let expected = self.spec.field_count();
        if self.fields.len() != expected {
            return Err(ConfigError::FieldCount {
                model: self.spec.name(),
                expected,
                found: self.fields.len(),
            });
        }
        let f = &self.fields;
        let reference = self.reference.unwrap_or(f[0]);
        let parts = Parts {
            vars: self.vars,
            store,
            events: events.into(),
            reference,
            config: self.config,
        };
        match self.spec {
            ModelSpec::Ccg => parts.finish(Ccg::new(f[0], f[1])),
            ModelSpec::CcgLog => parts.finish(CcgLog::new(f[0], f[1])),
            ModelSpec::Ccg2d => parts.finish(Ccg2d::new(f[0], f[1])),
            ModelSpec::Reflect => parts.finish(Reflect::new(f[0], f[1])),
            ModelSpec::Reflect2d { axis } => parts.finish(Reflect2d::new(f[0], f[1], axis)?),
            ModelSpec::SmolCrank { timestep, hop } => {
                parts.finish(SmolCrank::new(f[0], f[1], f[2], timestep, hop))
            }
            ModelSpec::SmolCrankBias {
                timestep,
                hop,
                history,
            } => parts.finish(SmolCrankBias::new(f[0], f[1], timestep, hop, history)),
        }
    }
}

struct Parts {
    vars: Vec<(String, usize)>,
    store: FieldStore,
    events: Arc<[Event]>,
    reference: FieldId,
    config: CostConfig,
}

impl Parts {
    fn finish<M: CostModel + 'static>(
        self,
        mut model: M,
    ) -> Result<Box<dyn TrajectoryCost>, ConfigError> {
        for (name, slot) in &self.vars {
            model.event_vars_mut().bind(name, *slot)?;
        }
        let engine = CostEngine::new(model, self.store, self.events, self.reference, self.config)?;
        Ok(Box::new(engine))
    }
}
