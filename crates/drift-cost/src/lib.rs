//! Trajectory likelihood with incremental per-node cost caching.
//!
//! A [`CostModel`] scores one observed transition (an
//! [`Event`](drift_core::Event)) against diffusivity and force fields. A
//! [`CostEngine`] binds every event to a node of a reference field and
//! caches each node's summed cost, so a single-sample perturbation costs
//! only a neighborhood's worth of re-evaluation.
//!
//! # Models
//!
//! - [`Ccg`], [`CcgLog`], [`Ccg2d`]: closed-form short-lag Gaussian
//! - [`Reflect`], [`Reflect2d`]: Gaussian with reflecting-wall images
//! - [`SmolCrank`], [`SmolCrankBias`]: Crank-Nicolson transition densities
//!
//! [`ModelSpec`] and [`CostSetup`] pick a model at run time and return a
//! boxed [`TrajectoryCost`].
//!
//! # Invalid configurations
//!
//! A field state that makes an event physically impossible (such as a
//! non-positive diffusivity) costs `f64::INFINITY`. Drivers reject such
//! trials; nothing panics unless [`CostConfig::nan_check`] is set and a
//! cost comes out NaN.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod engine;
pub mod gaussian;
pub mod model;
pub mod reflect;
pub mod registry;
pub mod smol;

pub use config::{ConfigError, CostConfig, LagTolerance};
pub use engine::{CostEngine, LocalCost, TrajectoryCost};
pub use gaussian::{gaussian_cost, Ccg, Ccg2d, CcgLog};
pub use model::{BindContext, CostModel, EventCost, Residual, VarSlots};
pub use reflect::{reflect_cost, Reflect, Reflect2d};
pub use registry::{CostSetup, ModelSpec};
pub use smol::{HopPolicy, SmolCrank, SmolCrankBias, MIN_BIAS_STEPS};
