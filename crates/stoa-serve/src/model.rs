//! Fitted regression models over preprocessed feature rows.
//!
//! Models are fitted offline and loaded here as JSON artifacts. The serving
//! path only needs scoring, so the trait surface is one method; the linear
//! form covers both the base and the challenger artifact, which differ in
//! coefficients, not shape.

use std::fs::File;
use std::path::Path;

use ndarray::aview1;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ServeError};

/// A fitted model scoring one preprocessed feature row in label space
/// (log1p of price).
pub trait Regressor: Send + Sync {
    /// Name recorded in the audit log for each routed prediction.
    fn name(&self) -> &str;

    /// Score a single-row feature table.
    fn predict(&self, features: &DataFrame) -> Result<f64>;
}

impl std::fmt::Debug for dyn Regressor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Regressor({})", self.name())
    }
}

/// A linear model: dot product over named feature columns plus intercept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    name: String,
    feature_names: Vec<String>,
    weights: Vec<f64>,
    intercept: f64,
}

impl LinearModel {
    /// Build a model in memory. Fails when the weight vector and the
    /// feature name list disagree in length.
    pub fn new(
        name: impl Into<String>,
        feature_names: Vec<String>,
        weights: Vec<f64>,
        intercept: f64,
    ) -> Result<Self> {
        let name = name.into();
        if feature_names.len() != weights.len() {
            return Err(ServeError::Artifact(format!(
                "model {name}: {} feature names but {} weights",
                feature_names.len(),
                weights.len()
            )));
        }
        Ok(Self {
            name,
            feature_names,
            weights,
            intercept,
        })
    }

    /// Load a model from a JSON artifact. Any failure is fatal at startup.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .map_err(|e| ServeError::Artifact(format!("{}: {e}", path.display())))?;
        let model: Self = serde_json::from_reader(file)
            .map_err(|e| ServeError::Artifact(format!("{}: {e}", path.display())))?;
        if model.feature_names.len() != model.weights.len() {
            return Err(ServeError::Artifact(format!(
                "{}: {} feature names but {} weights",
                path.display(),
                model.feature_names.len(),
                model.weights.len()
            )));
        }
        Ok(model)
    }

    /// Persist the model as a JSON artifact.
    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self)
            .map_err(|e| ServeError::Artifact(format!("{}: {e}", path.display())))?;
        Ok(())
    }

    /// The feature columns this model reads, in scoring order.
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }
}

impl Regressor for LinearModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn predict(&self, features: &DataFrame) -> Result<f64> {
        let mut row = Vec::with_capacity(self.feature_names.len());
        for column in &self.feature_names {
            let series = features
                .column(column.as_str())
                .map_err(|_| ServeError::MissingFeature {
                    column: column.clone(),
                })?
                .as_materialized_series()
                .cast(&DataType::Float64)?;
            let value = series.f64()?.get(0).ok_or_else(|| ServeError::MissingFeature {
                column: column.clone(),
            })?;
            row.push(value);
        }
        Ok(aview1(&row).dot(&aview1(&self.weights)) + self.intercept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn feature_row() -> DataFrame {
        DataFrame::new(vec![
            Column::new("num__accommodates".into(), &[4.0f64]),
            Column::new("bin__is_luxury".into(), &[1.0f64]),
        ])
        .unwrap()
    }

    #[test]
    fn test_linear_prediction() {
        let model = LinearModel::new(
            "base",
            vec!["num__accommodates".to_string(), "bin__is_luxury".to_string()],
            vec![0.5, 2.0],
            1.0,
        )
        .unwrap();
        let prediction = model.predict(&feature_row()).unwrap();
        assert_relative_eq!(prediction, 0.5 * 4.0 + 2.0 * 1.0 + 1.0);
    }

    #[test]
    fn test_missing_feature_named_in_error() {
        let model = LinearModel::new(
            "base",
            vec!["num__bedrooms".to_string()],
            vec![1.0],
            0.0,
        )
        .unwrap();
        let err = model.predict(&feature_row()).unwrap_err();
        assert!(err.to_string().contains("num__bedrooms"));
    }

    #[test]
    fn test_weight_length_mismatch_rejected() {
        let result = LinearModel::new("base", vec!["a".to_string()], vec![1.0, 2.0], 0.0);
        assert!(result.is_err());
    }

    #[test]
    fn test_artifact_round_trip() {
        let model = LinearModel::new(
            "advanced",
            vec!["num__accommodates".to_string()],
            vec![0.25],
            -0.5,
        )
        .unwrap();
        let file = tempfile::NamedTempFile::new().unwrap();
        model.save(file.path()).unwrap();
        let restored = LinearModel::load(file.path()).unwrap();
        assert_eq!(model, restored);
    }
}
