//! CSV readers for the raw listing and session tables.
//!
//! Everything is read with schema inference; currency, percentage and
//! truth-token columns come out as strings and stay that way until the
//! feature extractor decodes them. Column presence is validated here so a
//! schema failure aborts before any partial output exists.

use std::path::Path;

use polars::prelude::*;

use crate::error::{DataError, Result};
use crate::schema;

/// Validate that every required column is present in the frame.
///
/// Returns the first missing column by name so the failure message tells
/// the operator exactly what the source file lacks.
pub fn require_columns(df: &DataFrame, required: &[&str]) -> Result<()> {
    let present: Vec<String> = df
        .get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .collect();

    for column in required {
        if !present.iter().any(|name| name == column) {
            return Err(DataError::MissingColumn {
                column: (*column).to_string(),
            });
        }
    }
    Ok(())
}

/// Read any CSV table with header and schema inference.
pub fn read_table(path: &Path) -> Result<DataFrame> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(1000))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;
    Ok(df)
}

/// Read the listing source table and validate its schema.
pub fn read_listings(path: &Path) -> Result<DataFrame> {
    let df = read_table(path)?;
    require_columns(&df, &schema::listing_source_columns())?;
    Ok(df)
}

/// Read the session event log and validate its schema.
pub fn read_sessions(path: &Path) -> Result<DataFrame> {
    let df = read_table(path)?;
    require_columns(&df, schema::SESSION_COLUMNS)?;
    Ok(df)
}
