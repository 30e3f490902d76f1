//! Column-role partition learned at fit time.
//!
//! Binary columns are detected from the training table's actual values;
//! the zero-fill pair, the one-hot pair and the ordinal column are declared
//! roles. Everything numeric that is neither binary nor zero-filled becomes
//! a median-imputed column; anything else is dropped.

use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{PreprocessError, Result};

/// The label column; never part of the feature partition.
pub const LABEL_COLUMN: &str = "price";

/// Training-sample marker from the noise labeler. It exists so training can
/// filter rows; it is not a model feature and inference requests do not
/// carry it, so it never enters the partition.
pub const TRAINING_FLAG_COLUMN: &str = "is_training_sample";

/// Columns always zero-imputed regardless of their statistics: zero is the
/// domain value for "no booking activity", not a guess at missing data.
pub const ZERO_FILL_COLUMNS: &[&str] = &["average_lead_time", "average_booking_duration"];

/// Categorical columns one-hot encoded with a vocabulary learned at fit.
pub const ONE_HOT_COLUMNS: &[&str] = &["property_type", "room_type"];

/// The ordinal column, encoded through a fixed category order.
pub const ORDINAL_COLUMN: &str = "host_response_time";

/// Fixed order of the ordinal categories, slowest first.
pub const RESPONSE_TIME_ORDER: &[&str] = &[
    "a few days or more",
    "within a day",
    "within a few hours",
    "within an hour",
];

/// Sentinel for an ordinal category never seen in the fixed order.
pub const UNSEEN_ORDINAL: f64 = -1.0;

fn is_numeric(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Does the column take only values in {0, 1}, ignoring nulls?
fn is_binary(series: &Series) -> Result<bool> {
    let unique = series.cast(&DataType::Float64)?.drop_nulls().unique()?;
    if unique.len() > 2 {
        return Ok(false);
    }
    let values = unique.f64()?;
    let all_flags = values
        .into_iter()
        .flatten()
        .all(|value| value == 0.0 || value == 1.0);
    Ok(all_flags)
}

/// The column partition the preprocessor derives once from a training table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnPartition {
    /// Binary {0,1} columns, most-frequent imputed, in table order.
    pub binary: Vec<String>,
    /// Always-zero-imputed columns.
    pub zero_filled: Vec<String>,
    /// Remaining numeric columns, median imputed, sorted by name.
    pub numeric: Vec<String>,
    /// One-hot encoded categorical columns.
    pub one_hot: Vec<String>,
    /// Ordinal categorical columns.
    pub ordinal: Vec<String>,
}

impl ColumnPartition {
    /// Partition the training table's feature columns by role.
    ///
    /// Fails when the label column is absent; a training table without its
    /// label is a schema error, not something to impute around.
    pub fn from_training(df: &DataFrame) -> Result<Self> {
        let names: Vec<String> = df
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect();
        let declared = std::iter::once(LABEL_COLUMN)
            .chain(ZERO_FILL_COLUMNS.iter().copied())
            .chain(ONE_HOT_COLUMNS.iter().copied())
            .chain(std::iter::once(ORDINAL_COLUMN));
        for column in declared {
            if !names.iter().any(|name| name == column) {
                return Err(PreprocessError::MissingColumn {
                    column: column.to_string(),
                });
            }
        }

        let mut binary = Vec::new();
        let mut numeric = Vec::new();
        for name in &names {
            if name == LABEL_COLUMN
                || name == TRAINING_FLAG_COLUMN
                || ZERO_FILL_COLUMNS.contains(&name.as_str())
                || ONE_HOT_COLUMNS.contains(&name.as_str())
                || name == ORDINAL_COLUMN
            {
                continue;
            }
            let series = df.column(name)?.as_materialized_series();
            if !is_numeric(series.dtype()) {
                continue;
            }
            if is_binary(series)? {
                binary.push(name.clone());
            } else {
                numeric.push(name.clone());
            }
        }
        numeric.sort();

        Ok(Self {
            binary,
            zero_filled: ZERO_FILL_COLUMNS.iter().map(|s| s.to_string()).collect(),
            numeric,
            one_hot: ONE_HOT_COLUMNS.iter().map(|s| s.to_string()).collect(),
            ordinal: vec![ORDINAL_COLUMN.to_string()],
        })
    }

    /// Every input column the fitted scheme will read at transform time.
    pub fn required_columns(&self) -> impl Iterator<Item = &str> {
        self.binary
            .iter()
            .chain(&self.zero_filled)
            .chain(&self.numeric)
            .chain(&self.one_hot)
            .chain(&self.ordinal)
            .map(String::as_str)
    }
}
