//! Per-listing attribute derivation.
//!
//! Turns the whitelisted raw listing columns into the fixed listing feature
//! schema: normalized property category plus luxury flag, bathroom count and
//! shared-bathroom flag, sentiment scores for the two free-text columns,
//! binary amenity flags with a distinct-amenity count, percentage and
//! truth-token decoding, and the great-circle distance to the city centre.
//! Raw coordinates and the processed text/list columns are dropped from the
//! output so only derived values reach the model.

use polars::prelude::*;
use stoa_data::loader::require_columns;
use stoa_data::schema;

use crate::error::Result;
use crate::text::{clean_for_sentiment, normalize_text, LexiconSentiment, SentimentModel};

/// Reference point for the distance feature: the city centre.
pub const CENTRE_LAT: f64 = 37.9755;
/// Longitude of the reference point.
pub const CENTRE_LON: f64 = 23.7349;

/// Mean earth radius in kilometres.
const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Percentage-formatted columns decoded to `[0, 1]`.
const PERCENTAGE_COLUMNS: &[&str] = &["host_response_rate", "host_acceptance_rate"];

/// Single-character truth-token columns decoded to `{0, 1}`.
const TRUTH_TOKEN_COLUMNS: &[&str] = &[
    "host_is_superhost",
    "host_identity_verified",
    "instant_bookable",
];

/// Source columns consumed by a derivation and dropped from the output.
const PROCESSED_COLUMNS: &[&str] = &[
    "latitude",
    "longitude",
    "bathrooms_text",
    "description",
    "neighborhood_overview",
    "amenities",
];

/// Feature column name for an amenity vocabulary entry, derived
/// deterministically so the serving schema can be generated once.
pub fn amenity_column_name(entry: &str) -> String {
    format!(
        "amenity_{}",
        normalize_text(entry).replace(' ', "_").replace('/', "_")
    )
}

/// Great-circle distance between two coordinate pairs in kilometres.
fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();
    let a = (dlat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
}

/// Map normalized property-type text to the bounded category set.
fn map_property_type(normalized: &str) -> &'static str {
    if normalized.contains("rental unit") {
        "rental_unit"
    } else if normalized.contains("condo") {
        "condo"
    } else if normalized.contains("home") || normalized.contains("house") {
        "home"
    } else if normalized.contains("hotel") || normalized.contains("hostel") {
        "hotel"
    } else {
        "other"
    }
}

/// Luxury keyword set, disjoint from the category mapping and evaluated on
/// the same normalized text.
fn is_luxury(normalized: &str) -> bool {
    normalized.contains("loft") || normalized.contains("villa") || normalized.contains("boutique hotel")
}

/// Derives the per-listing feature table from the raw listing source.
pub struct ListingFeatureExtractor {
    scorer: Box<dyn SentimentModel>,
}

impl std::fmt::Debug for ListingFeatureExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListingFeatureExtractor").finish_non_exhaustive()
    }
}

impl Default for ListingFeatureExtractor {
    fn default() -> Self {
        Self::new(Box::new(LexiconSentiment))
    }
}

impl ListingFeatureExtractor {
    /// Create an extractor with the given sentiment scorer.
    pub fn new(scorer: Box<dyn SentimentModel>) -> Self {
        Self { scorer }
    }

    /// Derive the listing feature table.
    ///
    /// Fails when a whitelisted column is absent; every malformed scalar is
    /// recovered locally per the field policies documented on the helpers.
    /// The operation has no side effects on the input and is idempotent.
    pub fn extract(&self, listings: &DataFrame) -> Result<DataFrame> {
        require_columns(listings, &schema::listing_source_columns())?;
        let mut df = listings.select(schema::listing_source_columns())?;

        add_distance_to_centre(&mut df)?;
        derive_property_type(&mut df)?;
        add_sentiment(&mut df, "description", self.scorer.as_ref())?;
        add_sentiment(&mut df, "neighborhood_overview", self.scorer.as_ref())?;
        add_amenity_features(&mut df)?;

        let lf = df
            .lazy()
            .with_columns([bathrooms_expr(), bathroom_shared_expr()])
            .with_columns(percentage_exprs())
            .with_columns(truth_token_exprs())
            .drop(PROCESSED_COLUMNS.iter().copied());
        Ok(lf.collect()?)
    }
}

/// Haversine distance to the centre; null when either coordinate is null.
/// Coordinates are dropped afterwards so exact geolocation never reaches
/// the model.
fn add_distance_to_centre(df: &mut DataFrame) -> Result<()> {
    let lat = df
        .column("latitude")?
        .as_materialized_series()
        .cast(&DataType::Float64)?;
    let lon = df
        .column("longitude")?
        .as_materialized_series()
        .cast(&DataType::Float64)?;

    let distances: Vec<Option<f64>> = lat
        .f64()?
        .into_iter()
        .zip(lon.f64()?)
        .map(|(lat, lon)| match (lat, lon) {
            (Some(lat), Some(lon)) => Some(haversine_km(lat, lon, CENTRE_LAT, CENTRE_LON)),
            _ => None,
        })
        .collect();

    df.with_column(Column::new("distance_to_centre".into(), distances))?;
    Ok(())
}

/// Category mapping and luxury flag from one shared normalization of the
/// property-type text. Null input yields null for both.
fn derive_property_type(df: &mut DataFrame) -> Result<()> {
    let series = df
        .column("property_type")?
        .as_materialized_series()
        .clone();
    let values = series.str()?;

    let mut categories: Vec<Option<&'static str>> = Vec::with_capacity(values.len());
    let mut luxury: Vec<Option<i64>> = Vec::with_capacity(values.len());
    for value in values {
        match value {
            Some(text) => {
                let normalized = normalize_text(text);
                categories.push(Some(map_property_type(&normalized)));
                luxury.push(Some(i64::from(is_luxury(&normalized))));
            }
            None => {
                categories.push(None);
                luxury.push(None);
            }
        }
    }

    df.with_column(Column::new("property_type".into(), categories))?;
    df.with_column(Column::new("is_luxury".into(), luxury))?;
    Ok(())
}

/// Polarity score for a free-text column; null text stays null.
fn add_sentiment(df: &mut DataFrame, column: &str, scorer: &dyn SentimentModel) -> Result<()> {
    let series = df.column(column)?.as_materialized_series().clone();
    let values = series.str()?;

    let scores: Vec<Option<f64>> = values
        .into_iter()
        .map(|text| text.map(|text| scorer.score(&clean_for_sentiment(text))))
        .collect();

    df.with_column(Column::new(format!("{column}_sentiment").into(), scores))?;
    Ok(())
}

/// Parse a serialized amenity list. Anything that is not a well-formed list
/// yields the empty set rather than an error.
fn parse_amenity_list(raw: &str) -> Vec<String> {
    let trimmed = raw.trim();
    if !trimmed.starts_with('[') {
        return Vec::new();
    }
    serde_json::from_str::<Vec<String>>(trimmed).unwrap_or_default()
}

/// Distinct amenity count plus one binary column per vocabulary entry.
/// Presence is tested on normalized tokens, so ordering and punctuation
/// variants in the raw list do not change the output.
fn add_amenity_features(df: &mut DataFrame) -> Result<()> {
    use std::collections::HashSet;

    let series = df.column("amenities")?.as_materialized_series().clone();
    let values = series.str()?;

    let mut counts: Vec<i64> = Vec::with_capacity(values.len());
    let mut normalized: Vec<HashSet<String>> = Vec::with_capacity(values.len());
    for value in values {
        match value {
            Some(raw) => {
                let parsed = parse_amenity_list(raw);
                let distinct: HashSet<String> = parsed
                    .iter()
                    .map(|amenity| amenity.trim().to_lowercase())
                    .collect();
                counts.push(distinct.len() as i64);
                normalized.push(parsed.iter().map(|amenity| normalize_text(amenity)).collect());
            }
            None => {
                counts.push(0);
                normalized.push(HashSet::new());
            }
        }
    }

    df.with_column(Column::new("amenity_count".into(), counts))?;
    for entry in schema::AMENITY_VOCABULARY {
        let key = normalize_text(entry);
        let flags: Vec<i64> = normalized
            .iter()
            .map(|set| i64::from(set.contains(&key)))
            .collect();
        df.with_column(Column::new(amenity_column_name(entry).into(), flags))?;
    }
    Ok(())
}

/// Structured bathroom count when present, otherwise the leading decimal
/// parsed out of the free-text description. Neither present leaves null;
/// imputation is the preprocessor's job, not this derivation's.
fn bathrooms_expr() -> Expr {
    when(col("bathrooms").is_not_null())
        .then(col("bathrooms").cast(DataType::Float64))
        .otherwise(
            col("bathrooms_text")
                .str()
                .extract(lit(r"(\d+\.?\d*)"), 1)
                .cast(DataType::Float64),
        )
        .alias("bathrooms")
}

/// Shared-bathroom flag from the free-text description; absent text means
/// not shared.
fn bathroom_shared_expr() -> Expr {
    col("bathrooms_text")
        .str()
        .to_lowercase()
        .str()
        .contains(lit("shared"), false)
        .fill_null(lit(false))
        .cast(DataType::Int64)
        .alias("is_bathroom_shared")
}

/// `"95%"` style strings to `[0, 1]`; null stays null.
fn percentage_exprs() -> Vec<Expr> {
    PERCENTAGE_COLUMNS
        .iter()
        .map(|column| {
            (col(*column).str().strip_chars(lit("%")).cast(DataType::Float64) / lit(100.0))
                .alias(*column)
        })
        .collect()
}

/// `t`/other truth tokens to `{0, 1}`; null stays null.
fn truth_token_exprs() -> Vec<Expr> {
    TRUTH_TOKEN_COLUMNS
        .iter()
        .map(|column| {
            when(col(*column).is_null())
                .then(lit(NULL))
                .otherwise(
                    when(col(*column).eq(lit("t")))
                        .then(lit(1i64))
                        .otherwise(lit(0i64)),
                )
                .cast(DataType::Int64)
                .alias(*column)
        })
        .collect()
}
