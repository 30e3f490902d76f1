//! Append-only CSV audit log of served predictions.
//!
//! One row per answered request: when, which model, what it predicted, and
//! the ground-truth price when the client supplied one. The file is created
//! with its header once; appends are serialized through a mutex so
//! concurrent requests interleave whole rows.

use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::error::Result;

/// One served prediction, as written to the audit log.
#[derive(Debug, Clone, Serialize)]
pub struct AuditRecord {
    /// Log level; always `INFO` for served predictions.
    pub level: String,
    /// UTC timestamp of the response, RFC 3339 to the second.
    pub timestamp: String,
    /// Name of the model that produced the prediction.
    pub model: String,
    /// Predicted price in currency units.
    pub prediction: f64,
    /// Ground-truth price when the client supplied one.
    pub real: Option<f64>,
}

impl AuditRecord {
    /// Record a prediction served now.
    pub fn served(model: &str, prediction: f64, real: Option<f64>) -> Self {
        Self {
            level: "INFO".to_string(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            model: model.to_string(),
            prediction,
            real,
        }
    }
}

/// The audit log file, shared across request handlers.
#[derive(Debug)]
pub struct AuditLog {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl AuditLog {
    /// Open the log at `path`, creating it with a header row when absent.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => {
                let mut writer = csv::Writer::from_writer(file);
                writer.write_record(["level", "timestamp", "model", "prediction", "real"])?;
                writer.flush()?;
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {}
            Err(e) => return Err(e.into()),
        }
        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    /// Append one record.
    pub fn append(&self, record: &AuditRecord) -> Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let file = OpenOptions::new().append(true).open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer.serialize(record)?;
        writer.flush()?;
        Ok(())
    }

    /// Path of the underlying CSV file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
