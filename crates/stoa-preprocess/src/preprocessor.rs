//! Fit-once/apply-many preprocessor.
//!
//! `fit` learns imputation values and category vocabularies on top of the
//! column partition; the resulting [`FittedPreprocessor`] is an immutable
//! value that `transform` reads through `&self`, so concurrent inference
//! requests share one fitted state without synchronization. The fitted
//! state serializes to JSON so the training run and the serving process
//! exchange it as an artifact.

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::path::Path;

use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{PreprocessError, Result};
use crate::partition::{ColumnPartition, LABEL_COLUMN, RESPONSE_TIME_ORDER, UNSEEN_ORDINAL};

/// Most frequent non-null value of a numeric column; ties break toward the
/// smaller value, absence of data toward zero.
fn most_frequent_f64(series: &Series) -> Result<f64> {
    let values = series.cast(&DataType::Float64)?;
    let mut counts: HashMap<u64, (f64, usize)> = HashMap::new();
    for value in values.f64()?.into_iter().flatten() {
        let entry = counts.entry(value.to_bits()).or_insert((value, 0));
        entry.1 += 1;
    }
    let best = counts
        .into_values()
        .max_by(|(a_value, a_count), (b_value, b_count)| {
            a_count
                .cmp(b_count)
                .then_with(|| b_value.total_cmp(a_value))
        })
        .map(|(value, _)| value);
    Ok(best.unwrap_or(0.0))
}

/// Most frequent non-null value of a string column; ties break toward the
/// lexicographically smaller value.
fn most_frequent_str(series: &Series) -> Result<Option<String>> {
    let values = series.str()?;
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for value in values.into_iter().flatten() {
        *counts.entry(value).or_insert(0) += 1;
    }
    let best = counts
        .into_iter()
        .max_by(|(a_value, a_count), (b_value, b_count)| {
            a_count.cmp(b_count).then_with(|| b_value.cmp(a_value))
        })
        .map(|(value, _)| value.to_string());
    Ok(best)
}

/// The unfit phase of the preprocessor. Fitting is its only operation;
/// everything applicable lives on [`FittedPreprocessor`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Preprocessor;

impl Preprocessor {
    /// Learn the full preprocessing scheme from a training table.
    ///
    /// The training table must carry the label column; its absence is a
    /// schema error. Everything learned here is frozen into the returned
    /// value.
    pub fn fit(df: &DataFrame) -> Result<FittedPreprocessor> {
        let partition = ColumnPartition::from_training(df)?;

        let mut binary_fill = BTreeMap::new();
        for column in &partition.binary {
            let series = df.column(column)?.as_materialized_series();
            binary_fill.insert(column.clone(), most_frequent_f64(series)?);
        }

        let mut median_fill = BTreeMap::new();
        for column in &partition.numeric {
            let series = df.column(column)?.as_materialized_series();
            let median = series.cast(&DataType::Float64)?.median().unwrap_or(0.0);
            median_fill.insert(column.clone(), median);
        }

        let mut categorical_fill = BTreeMap::new();
        let mut vocabularies = BTreeMap::new();
        for column in partition.one_hot.iter().chain(&partition.ordinal) {
            let series = df.column(column)?.as_materialized_series();
            let fill = most_frequent_str(series)?.unwrap_or_default();
            categorical_fill.insert(column.clone(), fill);
        }
        for column in &partition.one_hot {
            let series = df.column(column)?.as_materialized_series();
            let unique = series.unique()?;
            let mut vocabulary: Vec<String> = unique
                .str()?
                .into_iter()
                .flatten()
                .map(str::to_string)
                .collect();
            vocabulary.sort();
            vocabularies.insert(column.clone(), vocabulary);
        }

        let fitted = FittedPreprocessor {
            partition,
            binary_fill,
            median_fill,
            categorical_fill,
            vocabularies,
            ordinal_order: RESPONSE_TIME_ORDER.iter().map(|s| s.to_string()).collect(),
        };
        Ok(fitted)
    }
}

/// A fitted preprocessing scheme: the column partition plus everything
/// learned from the training table. Immutable after fit; shared read-only
/// across transform calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedPreprocessor {
    partition: ColumnPartition,
    binary_fill: BTreeMap<String, f64>,
    median_fill: BTreeMap<String, f64>,
    categorical_fill: BTreeMap<String, String>,
    vocabularies: BTreeMap<String, Vec<String>>,
    ordinal_order: Vec<String>,
}

impl FittedPreprocessor {
    /// The output column names, in the exact order `transform` emits them.
    pub fn output_columns(&self) -> Vec<String> {
        let mut names = Vec::new();
        for column in &self.partition.binary {
            names.push(format!("bin__{column}"));
        }
        for column in &self.partition.zero_filled {
            names.push(format!("zero__{column}"));
        }
        for column in &self.partition.numeric {
            names.push(format!("num__{column}"));
        }
        for column in &self.partition.one_hot {
            if let Some(vocabulary) = self.vocabularies.get(column) {
                for category in vocabulary {
                    names.push(format!("ohe__{column}_{category}"));
                }
            }
        }
        for column in &self.partition.ordinal {
            names.push(format!("ord__{column}"));
        }
        names
    }

    /// The column partition frozen at fit time.
    pub const fn partition(&self) -> &ColumnPartition {
        &self.partition
    }

    /// Apply the fitted scheme to a table.
    ///
    /// Output columns come in the order fixed at fit time regardless of the
    /// input's column order; extra input columns are dropped; a partitioned
    /// column missing from the input is an error naming it. When the input
    /// carries the label column it passes through unchanged as the last
    /// output column.
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        let present: Vec<String> = df
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect();
        for column in self.partition.required_columns() {
            if !present.iter().any(|name| name == column) {
                return Err(PreprocessError::MissingColumn {
                    column: column.to_string(),
                });
            }
        }

        let mut exprs: Vec<Expr> = Vec::new();
        for column in &self.partition.binary {
            let fill = self.binary_fill.get(column).copied().unwrap_or(0.0);
            exprs.push(
                col(column.as_str())
                    .cast(DataType::Float64)
                    .fill_null(lit(fill))
                    .alias(format!("bin__{column}")),
            );
        }
        for column in &self.partition.zero_filled {
            exprs.push(
                col(column.as_str())
                    .cast(DataType::Float64)
                    .fill_null(lit(0.0))
                    .alias(format!("zero__{column}")),
            );
        }
        for column in &self.partition.numeric {
            let fill = self.median_fill.get(column).copied().unwrap_or(0.0);
            exprs.push(
                col(column.as_str())
                    .cast(DataType::Float64)
                    .fill_null(lit(fill))
                    .alias(format!("num__{column}")),
            );
        }
        for column in &self.partition.one_hot {
            let fill = self
                .categorical_fill
                .get(column)
                .cloned()
                .unwrap_or_default();
            let filled = col(column.as_str()).fill_null(lit(fill));
            if let Some(vocabulary) = self.vocabularies.get(column) {
                for category in vocabulary {
                    // A category outside the vocabulary leaves every
                    // indicator at zero; never an error.
                    exprs.push(
                        when(filled.clone().eq(lit(category.as_str())))
                            .then(lit(1.0))
                            .otherwise(lit(0.0))
                            .alias(format!("ohe__{column}_{category}")),
                    );
                }
            }
        }
        for column in &self.partition.ordinal {
            let fill = self
                .categorical_fill
                .get(column)
                .cloned()
                .unwrap_or_default();
            let filled = col(column.as_str()).fill_null(lit(fill));
            let mut encoded = lit(UNSEEN_ORDINAL);
            for (rank, category) in self.ordinal_order.iter().enumerate() {
                encoded = when(filled.clone().eq(lit(category.as_str())))
                    .then(lit(rank as f64))
                    .otherwise(encoded);
            }
            exprs.push(encoded.alias(format!("ord__{column}")));
        }

        if present.iter().any(|name| name == LABEL_COLUMN) {
            exprs.push(col(LABEL_COLUMN));
        }

        Ok(df.clone().lazy().select(exprs).collect()?)
    }

    /// Persist the fitted state as a JSON artifact.
    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Load a fitted state from a JSON artifact.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(file)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn training_frame() -> DataFrame {
        DataFrame::new(vec![
            Column::new("is_luxury".into(), vec![Some(1i64), Some(0), Some(0), None]),
            Column::new(
                "accommodates".into(),
                vec![Some(2i64), Some(4), None, Some(6)],
            ),
            Column::new("average_lead_time".into(), vec![Some(3.0f64), None, Some(7.5), Some(0.0)]),
            Column::new(
                "average_booking_duration".into(),
                vec![Some(2.0f64), Some(0.0), None, Some(4.0)],
            ),
            Column::new(
                "property_type".into(),
                vec![Some("condo"), Some("home"), Some("condo"), None],
            ),
            Column::new(
                "room_type".into(),
                &[
                    "Entire home/apt",
                    "Private room",
                    "Private room",
                    "Private room",
                ],
            ),
            Column::new(
                "host_response_time".into(),
                vec![
                    Some("within an hour"),
                    Some("within a day"),
                    None,
                    Some("within an hour"),
                ],
            ),
            Column::new("price".into(), &[4.7f64, 5.1, 4.2, 4.9]),
        ])
        .unwrap()
    }

    fn f64_at(df: &DataFrame, column: &str, row: usize) -> f64 {
        df.column(column)
            .unwrap()
            .as_materialized_series()
            .f64()
            .unwrap()
            .get(row)
            .unwrap()
    }

    #[test]
    fn test_output_columns_fixed_at_fit() {
        let fitted = Preprocessor::fit(&training_frame()).unwrap();
        let expected = vec![
            "bin__is_luxury",
            "zero__average_lead_time",
            "zero__average_booking_duration",
            "num__accommodates",
            "ohe__property_type_condo",
            "ohe__property_type_home",
            "ohe__room_type_Entire home/apt",
            "ohe__room_type_Private room",
            "ord__host_response_time",
        ];
        assert_eq!(fitted.output_columns(), expected);

        let out = fitted.transform(&training_frame()).unwrap();
        let mut names: Vec<String> = out
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect();
        // Label passthrough comes last.
        assert_eq!(names.pop().as_deref(), Some("price"));
        assert_eq!(names, expected);
    }

    #[test]
    fn test_imputation_values() {
        let fitted = Preprocessor::fit(&training_frame()).unwrap();
        let out = fitted.transform(&training_frame()).unwrap();
        // Null luxury flag -> most frequent (0).
        assert_relative_eq!(f64_at(&out, "bin__is_luxury", 3), 0.0);
        // Null accommodates -> median of {2, 4, 6}.
        assert_relative_eq!(f64_at(&out, "num__accommodates", 2), 4.0);
        // Null lead time -> zero, not median.
        assert_relative_eq!(f64_at(&out, "zero__average_lead_time", 1), 0.0);
        // Null property type -> most frequent (condo).
        assert_relative_eq!(f64_at(&out, "ohe__property_type_condo", 3), 1.0);
        // Null response time -> most frequent (within an hour -> rank 3).
        assert_relative_eq!(f64_at(&out, "ord__host_response_time", 2), 3.0);
    }

    #[test]
    fn test_ordinal_ranks() {
        let fitted = Preprocessor::fit(&training_frame()).unwrap();
        let out = fitted.transform(&training_frame()).unwrap();
        assert_relative_eq!(f64_at(&out, "ord__host_response_time", 0), 3.0);
        assert_relative_eq!(f64_at(&out, "ord__host_response_time", 1), 1.0);
    }

    #[test]
    fn test_unseen_one_hot_category_all_zero() {
        let fitted = Preprocessor::fit(&training_frame()).unwrap();
        let mut row = training_frame().head(Some(1));
        row.with_column(Column::new("property_type".into(), &["castle"]))
            .unwrap();
        let out = fitted.transform(&row).unwrap();
        assert_relative_eq!(f64_at(&out, "ohe__property_type_condo", 0), 0.0);
        assert_relative_eq!(f64_at(&out, "ohe__property_type_home", 0), 0.0);
    }

    #[test]
    fn test_unseen_ordinal_maps_to_sentinel() {
        let fitted = Preprocessor::fit(&training_frame()).unwrap();
        let mut row = training_frame().head(Some(1));
        row.with_column(Column::new("host_response_time".into(), &["instantly"]))
            .unwrap();
        let out = fitted.transform(&row).unwrap();
        assert_relative_eq!(f64_at(&out, "ord__host_response_time", 0), UNSEEN_ORDINAL);
    }

    #[test]
    fn test_column_order_and_extras_irrelevant() {
        let fitted = Preprocessor::fit(&training_frame()).unwrap();
        let reference = fitted.transform(&training_frame()).unwrap();

        let mut shuffled = training_frame()
            .select([
                "price",
                "host_response_time",
                "room_type",
                "property_type",
                "average_booking_duration",
                "average_lead_time",
                "accommodates",
                "is_luxury",
            ])
            .unwrap();
        shuffled
            .with_column(Column::new("extra".into(), &[9i64, 9, 9, 9]))
            .unwrap();

        let out = fitted.transform(&shuffled).unwrap();
        assert!(out.equals_missing(&reference));
    }

    #[test]
    fn test_transform_without_label_omits_it() {
        let fitted = Preprocessor::fit(&training_frame()).unwrap();
        let features = training_frame().drop("price").unwrap();
        let out = fitted.transform(&features).unwrap();
        assert_eq!(
            out.get_column_names().len(),
            fitted.output_columns().len()
        );
    }

    #[test]
    fn test_missing_partitioned_column_fails() {
        let fitted = Preprocessor::fit(&training_frame()).unwrap();
        let broken = training_frame().drop("accommodates").unwrap();
        let err = fitted.transform(&broken).unwrap_err();
        assert!(err.to_string().contains("accommodates"));
    }

    #[test]
    fn test_fit_without_label_is_fatal() {
        let df = training_frame().drop("price").unwrap();
        assert!(Preprocessor::fit(&df).is_err());
    }

    #[test]
    fn test_artifact_round_trip() {
        let fitted = Preprocessor::fit(&training_frame()).unwrap();
        let file = tempfile::NamedTempFile::new().unwrap();
        fitted.save(file.path()).unwrap();
        let restored = FittedPreprocessor::load(file.path()).unwrap();
        assert_eq!(fitted, restored);

        let a = fitted.transform(&training_frame()).unwrap();
        let b = restored.transform(&training_frame()).unwrap();
        assert!(a.equals_missing(&b));
    }
}
