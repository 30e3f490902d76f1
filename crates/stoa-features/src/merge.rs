//! Merge of listing-derived and session-derived feature tables.
//!
//! Listing rows are authoritative: a left join on listing identity keeps
//! exactly one output row per listing. Session aggregate columns are filled
//! with zero right after the join because "no session activity" is a real
//! domain value for these fields, not missing data for the imputer.

use polars::prelude::*;

use crate::error::Result;

/// Session aggregate columns zero-filled as integers after the join.
const ZERO_FILL_COUNTS: &[&str] = &["listing_views_ltm", "unique_viewers_ltm"];

/// Session aggregate columns zero-filled as floats after the join.
const ZERO_FILL_RATES: &[&str] = &[
    "conversion_rate_ltm",
    "average_lead_time",
    "average_booking_duration",
];

/// Left-join listing features with session aggregates on `id == listing_id`.
///
/// Every listing survives exactly once; the listing key `id` is retained for
/// the noise labeler and dropped by the pipeline once the table is final.
pub fn merge_features(
    listing_features: &DataFrame,
    session_aggregates: &DataFrame,
) -> Result<DataFrame> {
    let mut fills: Vec<Expr> = Vec::new();
    for column in ZERO_FILL_COUNTS {
        fills.push(col(*column).fill_null(lit(0)).cast(DataType::Int64));
    }
    for column in ZERO_FILL_RATES {
        fills.push(col(*column).fill_null(lit(0.0)));
    }

    let merged = listing_features
        .clone()
        .lazy()
        .join(
            session_aggregates.clone().lazy(),
            [col("id")],
            [col("listing_id")],
            JoinArgs::new(JoinType::Left),
        )
        .with_columns(fills)
        .collect()?;

    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing_features() -> DataFrame {
        DataFrame::new(vec![
            Column::new("id".into(), &["L1", "L2", "L3"]),
            Column::new("accommodates".into(), &[2i64, 4, 3]),
        ])
        .unwrap()
    }

    fn session_aggregates() -> DataFrame {
        DataFrame::new(vec![
            Column::new("listing_id".into(), &["L1"]),
            Column::new("listing_views_ltm".into(), &[12i64]),
            Column::new("unique_viewers_ltm".into(), &[7i64]),
            Column::new("conversion_rate_ltm".into(), &[0.25f64]),
            Column::new("average_lead_time".into(), &[3.5f64]),
            Column::new("average_booking_duration".into(), &[2.0f64]),
        ])
        .unwrap()
    }

    #[test]
    fn test_one_row_per_listing() {
        let merged = merge_features(&listing_features(), &session_aggregates()).unwrap();
        assert_eq!(merged.height(), 3);
        let ids = merged.column("id").unwrap().as_materialized_series().clone();
        assert_eq!(ids.n_unique().unwrap(), 3);
    }

    #[test]
    fn test_unmatched_listings_zero_filled() {
        let merged = merge_features(&listing_features(), &session_aggregates()).unwrap();
        let row = merged
            .clone()
            .lazy()
            .filter(col("id").eq(lit("L2")))
            .collect()
            .unwrap();
        let views = row.column("listing_views_ltm").unwrap().as_materialized_series().clone();
        assert_eq!(views.i64().unwrap().get(0), Some(0));
        let rate = row.column("conversion_rate_ltm").unwrap().as_materialized_series().clone();
        assert_eq!(rate.f64().unwrap().get(0), Some(0.0));
        let lead = row.column("average_lead_time").unwrap().as_materialized_series().clone();
        assert_eq!(lead.f64().unwrap().get(0), Some(0.0));
    }

    #[test]
    fn test_matched_listing_keeps_aggregates() {
        let merged = merge_features(&listing_features(), &session_aggregates()).unwrap();
        let row = merged
            .clone()
            .lazy()
            .filter(col("id").eq(lit("L1")))
            .collect()
            .unwrap();
        let views = row.column("listing_views_ltm").unwrap().as_materialized_series().clone();
        assert_eq!(views.i64().unwrap().get(0), Some(12));
    }
}
