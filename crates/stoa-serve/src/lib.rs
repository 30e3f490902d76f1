//! Serving boundary for the Stoa pricing pipeline.
//!
//! Wraps one fitted preprocessor and two fitted models behind a
//! single-record prediction contract: validate the request, transform it
//! through the table-fitted preprocessing state, route to a model by
//! randomized A/B split, invert the target transform, and append one audit
//! record. All shared state is established at startup and read-only
//! afterwards; artifact load failure is fatal then, never per-request.

#![forbid(unsafe_code)]

pub mod audit;
pub mod error;
pub mod model;
pub mod request;
pub mod router;
pub mod service;

pub use audit::{AuditLog, AuditRecord};
pub use error::{Result, ServeError};
pub use model::{LinearModel, Regressor};
pub use request::PredictionRequest;
pub use router::{ModelChoice, ModelSelector, UniformSplit};
pub use service::{Prediction, PredictionService};
