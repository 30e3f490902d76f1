//! Training-sample labeling.
//!
//! Immature listings (onboarded less than 180 days before the latest
//! session event) and never-engaged listings carry prices that demand has
//! not validated; training wants to filter them without recomputing the
//! rule. The label stays in the table as `is_training_sample`; the helper
//! booleans and the onboarding date are analysis intermediates and are
//! dropped.

use chrono::Duration;
use polars::prelude::*;

use crate::error::Result;

/// Days a host must have been onboarded before the latest session event.
pub const MATURITY_DAYS: i64 = 180;

/// View-count threshold for the activity rule.
pub const ACTIVITY_VIEWS: i64 = 30;

/// Conversion-rate threshold for the activity rule.
pub const ACTIVITY_CONVERSION: f64 = 0.005;

// The format is pinned: with inference, a column whose values are all
// unparsable is a ComputeError instead of nulls.
fn lenient_datetime() -> StrptimeOptions {
    StrptimeOptions {
        format: Some("%Y-%m-%d %H:%M:%S".into()),
        strict: false,
        ..Default::default()
    }
}

fn lenient_date() -> StrptimeOptions {
    StrptimeOptions {
        format: Some("%Y-%m-%d".into()),
        strict: false,
        ..Default::default()
    }
}

/// Append `is_training_sample` to the merged feature table.
///
/// A row qualifies when the listing is both mature (onboarded at least
/// [`MATURITY_DAYS`] before the latest session timestamp) and active
/// (views above [`ACTIVITY_VIEWS`] or conversion above
/// [`ACTIVITY_CONVERSION`]). An unparsable onboarding date counts as not
/// mature. `host_since` is consumed here and removed from the output.
pub fn label_training_samples(sessions: &DataFrame, merged: &DataFrame) -> Result<DataFrame> {
    let parsed = sessions
        .clone()
        .lazy()
        .select([col("timestamp").str().to_datetime(
            Some(TimeUnit::Microseconds),
            None,
            lenient_datetime(),
            lit("raise"),
        )])
        .collect()?;
    let latest_us = parsed
        .column("timestamp")?
        .as_materialized_series()
        .datetime()?
        .max();

    let maturity_threshold = latest_us
        .and_then(chrono::DateTime::from_timestamp_micros)
        .map(|latest| latest.date_naive() - Duration::days(MATURITY_DAYS));

    // No session activity at all means no anchor date, so nothing is mature.
    let mature = match maturity_threshold {
        Some(threshold) => col("host_since")
            .str()
            .to_date(lenient_date())
            .lt_eq(lit(threshold)),
        None => lit(false),
    };

    let labeled = merged
        .clone()
        .lazy()
        .with_columns([
            mature.fill_null(lit(false)).alias("is_mature"),
            col("listing_views_ltm")
                .gt(lit(ACTIVITY_VIEWS))
                .or(col("conversion_rate_ltm").gt(lit(ACTIVITY_CONVERSION)))
                .fill_null(lit(false))
                .alias("is_active"),
        ])
        .with_columns([col("is_mature")
            .and(col("is_active"))
            .cast(DataType::Int64)
            .alias("is_training_sample")])
        .drop(["is_mature", "is_active", "host_since"])
        .collect()?;

    Ok(labeled)
}
