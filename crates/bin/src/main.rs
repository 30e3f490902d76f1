//! Stoa CLI binary.
//!
//! Drives the pipeline end to end: build the feature dataset from the raw
//! sources, fit and apply the preprocessor, and serve one-off predictions
//! from saved artifacts.

use std::fs::File;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use polars::prelude::*;
use serde_json::json;

use stoa::preprocess::Preprocessor;
use stoa::serve::{PredictionRequest, PredictionService};
use stoa::{build_dataset, training_features};
use stoa_data::loader;

#[derive(Parser)]
#[command(name = "stoa")]
#[command(about = "Stoa: rental price feature pipeline", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the feature dataset from raw listing and session CSVs
    BuildDataset {
        /// Raw listings CSV
        listings: PathBuf,

        /// Raw session event log CSV
        sessions: PathBuf,

        /// Output dataset CSV
        #[arg(long, default_value = "dataset.csv")]
        output: PathBuf,
    },

    /// Fit the preprocessor on a built dataset and save it as an artifact
    Preprocess {
        /// Built dataset CSV (output of build-dataset)
        dataset: PathBuf,

        /// Fitted preprocessor artifact path
        #[arg(long, default_value = "preprocessor.json")]
        artifact: PathBuf,

        /// Optional CSV output of the transformed training rows
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Serve one prediction from saved artifacts
    Predict {
        /// JSON file with one prediction request
        request: PathBuf,

        /// Fitted preprocessor artifact
        #[arg(long, default_value = "preprocessor.json")]
        preprocessor: PathBuf,

        /// Base model artifact
        #[arg(long, default_value = "model_base.json")]
        base_model: PathBuf,

        /// Challenger model artifact
        #[arg(long, default_value = "model_advanced.json")]
        advanced_model: PathBuf,

        /// Audit log CSV path
        #[arg(long, default_value = "predictions.csv")]
        audit_log: PathBuf,

        /// Share of requests routed to the base model
        #[arg(long, default_value = "0.5")]
        base_share: f64,
    },
}

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::BuildDataset {
            listings,
            sessions,
            output,
        } => {
            build_dataset_command(&listings, &sessions, &output)?;
        }
        Commands::Preprocess {
            dataset,
            artifact,
            output,
        } => {
            preprocess_command(&dataset, &artifact, output.as_deref())?;
        }
        Commands::Predict {
            request,
            preprocessor,
            base_model,
            advanced_model,
            audit_log,
            base_share,
        } => {
            predict_command(
                &request,
                &preprocessor,
                &base_model,
                &advanced_model,
                &audit_log,
                base_share,
            )?;
        }
    }

    Ok(())
}

fn write_csv(df: &mut DataFrame, path: &std::path::Path) -> Result<(), Box<dyn std::error::Error>> {
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file).finish(df)?;
    Ok(())
}

fn build_dataset_command(
    listings: &std::path::Path,
    sessions: &std::path::Path,
    output: &std::path::Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let listings = loader::read_listings(listings)?;
    let sessions = loader::read_sessions(sessions)?;
    log::info!(
        "building dataset from {} listings and {} session events",
        listings.height(),
        sessions.height()
    );

    let mut dataset = build_dataset(&listings, &sessions)?;
    write_csv(&mut dataset, output)?;
    log::info!("wrote {} rows to {}", dataset.height(), output.display());
    Ok(())
}

fn preprocess_command(
    dataset: &std::path::Path,
    artifact: &std::path::Path,
    output: Option<&std::path::Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let dataset = loader::read_table(dataset)?;
    let training = training_features(&dataset)?;
    log::info!(
        "fitting preprocessor on {} of {} rows",
        training.height(),
        dataset.height()
    );

    let fitted = Preprocessor::fit(&training)?;
    fitted.save(artifact)?;
    log::info!("saved preprocessor artifact to {}", artifact.display());

    if let Some(output) = output {
        let mut transformed = fitted.transform(&training)?;
        write_csv(&mut transformed, output)?;
        log::info!(
            "wrote {} transformed rows to {}",
            transformed.height(),
            output.display()
        );
    }
    Ok(())
}

fn predict_command(
    request: &std::path::Path,
    preprocessor: &std::path::Path,
    base_model: &std::path::Path,
    advanced_model: &std::path::Path,
    audit_log: &std::path::Path,
    base_share: f64,
) -> Result<(), Box<dyn std::error::Error>> {
    // Loaded before the request is read: artifact problems must surface
    // even when the request itself is malformed.
    let service = PredictionService::from_artifacts(
        preprocessor,
        base_model,
        advanced_model,
        audit_log,
        base_share,
    )?;

    let file = File::open(request)?;
    let request: PredictionRequest = serde_json::from_reader(file)?;
    let prediction = service.predict(&request)?;

    println!(
        "{}",
        json!({
            "model": prediction.model,
            "price": prediction.price,
        })
    );
    Ok(())
}
