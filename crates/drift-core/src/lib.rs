//! Core types for the drift diffusion-inference engine.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the identifiers, the immutable [`Event`] records sampled from a
//! trajectory, and the transient [`TrialMove`] a driver proposes on
//! every optimizer iteration.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod event;
pub mod id;
pub mod trial;

pub use error::EventError;
pub use event::{events_from_samples, Event, VAR_MAX};
pub use id::{FieldId, NodeList};
pub use trial::TrialMove;
