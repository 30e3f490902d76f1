//! Error types for data operations.

use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur while loading or validating source tables.
#[derive(Debug, Error)]
pub enum DataError {
    /// A column the pipeline requires is absent from the source table.
    #[error("required column missing from source table: {column}")]
    MissingColumn {
        /// Name of the absent column.
        column: String,
    },

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
