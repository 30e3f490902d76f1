//! Error types for feature derivation.

use thiserror::Error;

/// Result type for feature derivation.
pub type Result<T> = std::result::Result<T, FeatureError>;

/// Errors that can occur while deriving features.
#[derive(Debug, Error)]
pub enum FeatureError {
    /// Source schema failure, propagated from table validation.
    #[error(transparent)]
    Data(#[from] stoa_data::DataError),

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),
}
