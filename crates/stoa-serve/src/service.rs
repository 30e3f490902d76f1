//! The prediction service itself.
//!
//! Composes the fitted preprocessor, the two deployed models, the A/B
//! selector and the audit log. All of it is loaded once at startup; a load
//! failure there is fatal. Per-request work reads the shared state through
//! `&self` only.

use std::path::Path;

use polars::prelude::DataFrame;

use stoa_features::target;
use stoa_preprocess::FittedPreprocessor;

use crate::audit::{AuditLog, AuditRecord};
use crate::error::{Result, ServeError};
use crate::model::{LinearModel, Regressor};
use crate::request::PredictionRequest;
use crate::router::{ModelChoice, ModelSelector, UniformSplit};

/// A served prediction: which model answered and the price it predicted.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// Name of the model that answered.
    pub model: String,
    /// Predicted price in currency units.
    pub price: f64,
}

/// The request-serving facade.
#[derive(Debug)]
pub struct PredictionService {
    preprocessor: FittedPreprocessor,
    base: Box<dyn Regressor>,
    advanced: Box<dyn Regressor>,
    selector: Box<dyn ModelSelector>,
    audit: AuditLog,
}

impl PredictionService {
    /// Assemble a service from already-loaded parts.
    pub fn new(
        preprocessor: FittedPreprocessor,
        base: Box<dyn Regressor>,
        advanced: Box<dyn Regressor>,
        selector: Box<dyn ModelSelector>,
        audit: AuditLog,
    ) -> Self {
        Self {
            preprocessor,
            base,
            advanced,
            selector,
            audit,
        }
    }

    /// Load every artifact and open the audit log. Any failure here is
    /// fatal; the service never starts partially configured.
    pub fn from_artifacts(
        preprocessor_path: &Path,
        base_path: &Path,
        advanced_path: &Path,
        audit_path: &Path,
        base_share: f64,
    ) -> Result<Self> {
        let preprocessor = FittedPreprocessor::load(preprocessor_path).map_err(|e| {
            ServeError::Artifact(format!("{}: {e}", preprocessor_path.display()))
        })?;
        let base = LinearModel::load(base_path)?;
        let advanced = LinearModel::load(advanced_path)?;
        let audit = AuditLog::open(audit_path)?;
        Ok(Self::new(
            preprocessor,
            Box::new(base),
            Box::new(advanced),
            Box::new(UniformSplit::new(base_share)),
            audit,
        ))
    }

    fn model_for(&self, choice: ModelChoice) -> &dyn Regressor {
        match choice {
            ModelChoice::Base => self.base.as_ref(),
            ModelChoice::Advanced => self.advanced.as_ref(),
        }
    }

    /// Serve one request.
    ///
    /// Validation and transform failures return before any model runs and
    /// leave no audit record; only answered requests are logged.
    pub fn predict(&self, request: &PredictionRequest) -> Result<Prediction> {
        request.validate()?;
        let row = request.to_dataframe()?;
        let features = self.transform(&row)?;

        let choice = self.selector.choose();
        let model = self.model_for(choice);
        let log_price = model.predict(&features)?;
        let price = target::inverse_scalar(log_price);

        self.audit
            .append(&AuditRecord::served(model.name(), price, request.price))?;
        log::info!(
            "served prediction: model={} price={price:.2}",
            model.name()
        );
        Ok(Prediction {
            model: model.name().to_string(),
            price,
        })
    }

    fn transform(&self, row: &DataFrame) -> Result<DataFrame> {
        Ok(self.preprocessor.transform(row)?)
    }
}
