//! End-to-end dataset construction.
//!
//! Composes the four feature stages in their only valid order: listing
//! extraction, session aggregation, merge, noise labeling, then the target
//! transform. The output is the final feature table; the listing key is
//! dropped here because nothing downstream joins on it.

use polars::prelude::*;

use stoa_features::error::Result;
use stoa_features::{
    label_training_samples, merge_features, target, ListingFeatureExtractor, SessionAggregator,
};

/// Build the model-ready feature table from the two raw sources.
///
/// The result carries one row per listing, the log-transformed `price`
/// label, and the `is_training_sample` marker. Rows with an unparseable
/// price keep a null label; filtering them is the trainer's decision.
pub fn build_dataset(listings: &DataFrame, sessions: &DataFrame) -> Result<DataFrame> {
    build_dataset_with(&ListingFeatureExtractor::default(), listings, sessions)
}

/// [`build_dataset`] with a caller-provided extractor, for swapping in a
/// different sentiment scorer.
pub fn build_dataset_with(
    extractor: &ListingFeatureExtractor,
    listings: &DataFrame,
    sessions: &DataFrame,
) -> Result<DataFrame> {
    let listing_features = extractor.extract(listings)?;
    let session_aggregates = SessionAggregator::default().aggregate(sessions)?;
    let merged = merge_features(&listing_features, &session_aggregates)?;
    let mut dataset = label_training_samples(sessions, &merged)?;

    let label = target::forward(dataset.column("price")?.as_materialized_series())?;
    dataset.with_column(label)?;
    let _ = dataset.drop_in_place("id")?;
    Ok(dataset)
}

/// The training view of a built dataset: reliable rows only, marker removed.
pub fn training_features(dataset: &DataFrame) -> Result<DataFrame> {
    let mut filtered = dataset
        .clone()
        .lazy()
        .filter(col("is_training_sample").eq(lit(1i64)))
        .collect()?;
    let _ = filtered.drop_in_place("is_training_sample")?;
    Ok(filtered)
}
