//! Drift: infer diffusivity and force profiles from sampled trajectories.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all drift sub-crates. For most users, adding `drift` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use drift::prelude::*;
//!
//! // Guess fields on a periodic 10-node grid.
//! let grid = Grid1D::new(10, 0.0, 1.0, Boundary::Periodic).unwrap();
//! let mut store = FieldStore::new();
//! let d = store.push(CubicField::uniform(grid, 1.0));
//! let f = store.push(CubicField::uniform(grid, 0.0));
//!
//! // Position in slot 0, time in slot 1.
//! let rows: Vec<Vec<f64>> = [2.0, 2.1, 1.9, 2.3, 2.2]
//!     .iter()
//!     .enumerate()
//!     .map(|(t, &x)| vec![x, t as f64 * 0.01])
//!     .collect();
//! let events = events_from_samples(&rows, 1, 0).unwrap();
//!
//! let mut cost = ModelSpec::Ccg
//!     .build(store, &[d, f], events, None, CostConfig::default())
//!     .unwrap();
//!
//! // One Metropolis trial on the diffusivity at node 2.
//! let trial = TrialMove::new(d, 2, 1.0, 1.2);
//! let dc = cost.apply(&trial);
//! if dc <= 0.0 {
//!     cost.clone_last();
//! } else {
//!     cost.restore(&trial);
//! }
//! assert!(cost.total_cost().is_finite());
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `drift-core` | Field ids, events, trial moves |
//! | [`field`] | `drift-field` | Grids, interpolated fields, file formats |
//! | [`solver`] | `drift-solver` | Crank-Nicolson Smoluchowski propagator |
//! | [`cost`] | `drift-cost` | Cost models and the incremental engine |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Field ids, events, and trial moves (`drift-core`).
pub use drift_core as types;

/// Grids, interpolated fields, and file formats (`drift-field`).
///
/// [`field::CubicField`], [`field::ZeroField`] and
/// [`field::BicubicField`] implement the [`field::Field`] trait.
pub use drift_field as field;

/// Crank-Nicolson Smoluchowski propagator (`drift-solver`).
pub use drift_solver as solver;

/// Cost models and the incremental engine (`drift-cost`).
///
/// [`cost::CostEngine`] for a statically chosen model,
/// [`cost::ModelSpec`] for one picked at run time.
pub use drift_cost as cost;

/// Common imports for typical drift usage.
///
/// ```rust
/// use drift::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use drift_core::{events_from_samples, Event, FieldId, TrialMove};

    // Fields
    pub use drift_field::{
        AnyField, BiasHistory, BicubicField, Boundary, CubicField, Field, FieldStore, Grid1D,
        ZeroField,
    };

    // Errors
    pub use drift_core::EventError;
    pub use drift_cost::ConfigError;
    pub use drift_field::FieldError;

    // Cost
    pub use drift_cost::{
        CostConfig, CostEngine, CostModel, CostSetup, HopPolicy, ModelSpec, TrajectoryCost,
    };
}
