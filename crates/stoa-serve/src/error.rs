//! Error types for the serving boundary.

use thiserror::Error;

/// Result type for serving operations.
pub type Result<T> = std::result::Result<T, ServeError>;

/// Errors that can occur while serving predictions.
#[derive(Debug, Error)]
pub enum ServeError {
    /// An artifact could not be loaded at startup. Fatal: the service must
    /// not start without its preprocessor and models.
    #[error("artifact load error: {0}")]
    Artifact(String),

    /// A request field violated its range constraint. Client error.
    #[error("invalid request field {field}: {reason}")]
    Validation {
        /// Name of the offending field.
        field: &'static str,
        /// What the constraint was.
        reason: String,
    },

    /// A feature the model requires is absent from the transformed row.
    #[error("model input missing feature: {column}")]
    MissingFeature {
        /// Name of the absent feature column.
        column: String,
    },

    /// Preprocessing error
    #[error(transparent)]
    Preprocess(#[from] stoa_preprocess::PreprocessError),

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// Audit log serialization error
    #[error("audit log error: {0}")]
    Csv(#[from] csv::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
