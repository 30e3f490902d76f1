//! Feature derivation for the Stoa pricing pipeline.
//!
//! Turns the raw listing table and the session event log into the merged,
//! noise-labeled feature table the preprocessor consumes:
//!
//! - [`listings`]: per-listing attribute derivation (categories, sentiment,
//!   amenity flags, distance to the city centre, percentage/flag decoding)
//! - [`sessions`]: trailing-window behavioral aggregates per listing
//! - [`merge`]: left join of the two derived tables with zero-fill
//! - [`noise`]: maturity/activity labeling of unreliable training rows
//! - [`target`]: price parsing and the invertible log transform
//! - [`text`]: text normalization and the pluggable sentiment seam

#![forbid(unsafe_code)]

pub mod error;
pub mod listings;
pub mod merge;
pub mod noise;
pub mod sessions;
pub mod target;
pub mod text;

pub use error::{FeatureError, Result};
pub use listings::ListingFeatureExtractor;
pub use merge::merge_features;
pub use noise::label_training_samples;
pub use sessions::SessionAggregator;
pub use text::{LexiconSentiment, SentimentModel};
