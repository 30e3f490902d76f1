//! Columnar preprocessing for the Stoa pricing pipeline.
//!
//! A two-phase encoder: [`Preprocessor::fit`] learns a column partition,
//! imputation values and category vocabularies from one training table and
//! returns a [`FittedPreprocessor`]; `transform` then applies exactly that
//! fitted scheme to any table, whether the full training set or a single
//! inference row, producing a fixed-width numeric matrix with a column
//! layout frozen at fit time. Calling transform before fit is unrepresentable: only the
//! fitted type has a transform method.

#![forbid(unsafe_code)]

pub mod error;
pub mod partition;
pub mod preprocessor;

pub use error::{PreprocessError, Result};
pub use partition::ColumnPartition;
pub use preprocessor::{FittedPreprocessor, Preprocessor};
