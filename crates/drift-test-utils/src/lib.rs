//! Test utilities for drift development.
//!
//! Provides canned grids and fields, a handful of hand-placed events, and
//! a seeded Euler-Maruyama sampler ([`fixtures::simulate`]) that produces
//! synthetic trajectories whose true diffusivity and force are known.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

pub use fixtures::{
    clamped_grid, events_from_trajectory, periodic_grid, simulate, sine_store, three_events,
    Langevin, SineStore,
};
