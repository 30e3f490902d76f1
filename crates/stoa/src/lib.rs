//! Stoa: a rental price feature pipeline.
//!
//! Turns raw listing and session-event tables into a model-ready feature
//! table with identical semantics at training and inference time. The
//! umbrella crate re-exports the sub-crates and composes them into the
//! end-to-end dataset build in [`pipeline`].

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod pipeline;

// Re-export main types from sub-crates
pub use stoa_data as data;
pub use stoa_features as features;
pub use stoa_preprocess as preprocess;
pub use stoa_serve as serve;

pub use pipeline::{build_dataset, build_dataset_with, training_features};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
