//! Error types for preprocessing.

use thiserror::Error;

/// Result type for preprocessing operations.
pub type Result<T> = std::result::Result<T, PreprocessError>;

/// Errors that can occur while fitting or applying the preprocessor.
#[derive(Debug, Error)]
pub enum PreprocessError {
    /// A column the fitted scheme requires is absent from the input table.
    #[error("required column missing from input table: {column}")]
    MissingColumn {
        /// Name of the absent column.
        column: String,
    },

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// Artifact serialization error
    #[error("artifact serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
