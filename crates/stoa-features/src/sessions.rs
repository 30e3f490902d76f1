//! Trailing-window behavioral aggregates from the session event log.
//!
//! The log is filtered once into an immutable snapshot (informational
//! actions only, lenient timestamp parsing, 365 days back from the latest
//! observed event) and all five aggregates are computed from that same
//! snapshot. The latest observed timestamp, not wall clock, anchors the
//! window so historical runs reproduce exactly.

use polars::prelude::*;
use stoa_data::loader::require_columns;
use stoa_data::schema;

use crate::error::Result;

/// Aggregate column names in output order, after the listing key.
pub const AGGREGATE_COLUMNS: &[&str] = &[
    "listing_views_ltm",
    "unique_viewers_ltm",
    "conversion_rate_ltm",
    "average_lead_time",
    "average_booking_duration",
];

/// Event action that carries no listing association.
const BROWSE_ACTION: &str = "browse_listings";
/// View event action.
const VIEW_ACTION: &str = "view_listing";
/// Booking event action.
const BOOK_ACTION: &str = "book_listing";

const MICROS_PER_DAY: i64 = 86_400_000_000;

/// Event timestamp format in the session log.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
/// Booking date format in the session log.
const DATE_FORMAT: &str = "%Y-%m-%d";

// The format is pinned: with inference, a column whose values are all
// unparsable is a ComputeError instead of nulls.
fn lenient_datetime() -> StrptimeOptions {
    StrptimeOptions {
        format: Some(TIMESTAMP_FORMAT.into()),
        strict: false,
        ..Default::default()
    }
}

fn lenient_date() -> StrptimeOptions {
    StrptimeOptions {
        format: Some(DATE_FORMAT.into()),
        strict: false,
        ..Default::default()
    }
}

/// Derives per-listing aggregates over a trailing window of the event log.
#[derive(Debug, Clone)]
pub struct SessionAggregator {
    /// Trailing window length in days.
    window_days: i64,
}

impl Default for SessionAggregator {
    fn default() -> Self {
        Self { window_days: 365 }
    }
}

impl SessionAggregator {
    /// Create an aggregator with a custom trailing window.
    pub const fn new(window_days: i64) -> Self {
        Self { window_days }
    }

    /// Compute the session aggregate table.
    ///
    /// One row per listing id that appears anywhere in the filtered log;
    /// listings with events but no views still report zero views. The input
    /// log is never mutated.
    pub fn aggregate(&self, sessions: &DataFrame) -> Result<DataFrame> {
        require_columns(sessions, schema::SESSION_COLUMNS)?;

        let filtered = sessions
            .clone()
            .lazy()
            .filter(col("action").neq(lit(BROWSE_ACTION)))
            .with_columns([
                col("timestamp").str().to_datetime(
                    Some(TimeUnit::Microseconds),
                    None,
                    lenient_datetime(),
                    lit("raise"),
                ),
                col("booking_date").str().to_date(lenient_date()),
            ])
            .collect()?;

        // The window anchor is the maximum parsed timestamp. Unparsable
        // timestamps became null above and fall out of the window filter.
        let max_us = filtered
            .column("timestamp")?
            .as_materialized_series()
            .datetime()?
            .max();
        let threshold = max_us
            .map(|max| max - self.window_days * MICROS_PER_DAY)
            .unwrap_or(i64::MIN);

        let window = filtered
            .lazy()
            .filter(col("timestamp").cast(DataType::Int64).gt_eq(lit(threshold)))
            .collect()?;

        let base = window
            .clone()
            .lazy()
            .filter(col("listing_id").is_not_null())
            .select([col("listing_id")])
            .unique(None, UniqueKeepStrategy::First);

        let view_events = col("action")
            .eq(lit(VIEW_ACTION))
            .and(col("listing_id").is_not_null());
        let book_events = col("action")
            .eq(lit(BOOK_ACTION))
            .and(col("listing_id").is_not_null());

        let views = window
            .clone()
            .lazy()
            .filter(view_events.clone())
            .group_by([col("listing_id")])
            .agg([len().alias("listing_views_ltm")]);

        let viewers = window
            .clone()
            .lazy()
            .filter(view_events)
            .group_by([col("listing_id")])
            .agg([col("user_id").n_unique().alias("unique_viewers_ltm")]);

        let bookings = window
            .clone()
            .lazy()
            .filter(book_events.clone())
            .group_by([col("listing_id")])
            .agg([len().alias("bookings_ltm")]);

        let lead_times = window
            .clone()
            .lazy()
            .filter(book_events.clone().and(col("booking_date").is_not_null()))
            .with_columns([(col("booking_date").cast(DataType::Int32)
                - col("timestamp").cast(DataType::Date).cast(DataType::Int32))
            .cast(DataType::Float64)
            .alias("lead_time_days")])
            .group_by([col("listing_id")])
            .agg([col("lead_time_days").mean().alias("average_lead_time")]);

        let durations = window
            .lazy()
            .filter(book_events.and(col("booking_duration").is_not_null()))
            .group_by([col("listing_id")])
            .agg([col("booking_duration")
                .cast(DataType::Float64)
                .mean()
                .alias("average_booking_duration")]);

        let left_join = |left: LazyFrame, right: LazyFrame| {
            left.join(
                right,
                [col("listing_id")],
                [col("listing_id")],
                JoinArgs::new(JoinType::Left),
            )
        };

        let mut joined = base;
        for table in [views, viewers, bookings, lead_times, durations] {
            joined = left_join(joined, table);
        }

        let result = joined
            .with_columns([
                col("listing_views_ltm").fill_null(lit(0)).cast(DataType::Int64),
                col("unique_viewers_ltm").fill_null(lit(0)).cast(DataType::Int64),
                col("bookings_ltm").fill_null(lit(0)).cast(DataType::Int64),
                col("average_lead_time").fill_null(lit(0.0)),
                col("average_booking_duration").fill_null(lit(0.0)),
            ])
            .with_columns([when(col("listing_views_ltm").gt(lit(0)))
                .then(
                    col("bookings_ltm").cast(DataType::Float64)
                        / col("listing_views_ltm").cast(DataType::Float64),
                )
                .otherwise(lit(0.0))
                .fill_nan(lit(0.0))
                .alias("conversion_rate_ltm")])
            .select(
                std::iter::once(col("listing_id"))
                    .chain(AGGREGATE_COLUMNS.iter().map(|name| col(*name)))
                    .collect::<Vec<_>>(),
            )
            .collect()?;

        Ok(result)
    }
}
