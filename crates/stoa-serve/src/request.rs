//! Inference request schema.
//!
//! One flat record whose field set is exactly the post-extraction feature
//! schema, plus the optional ground-truth price for audit logging. Range
//! constraints are validated here and rejected as client errors before any
//! transform runs; categorical values outside the fitted vocabulary are
//! deliberately not validated; the preprocessor absorbs them.

use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ServeError};

/// A single price-prediction request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionRequest {
    /// Normalized property category; unknown values are absorbed downstream.
    pub property_type: String,
    /// Room type category; unknown values are absorbed downstream.
    pub room_type: String,
    /// Guest capacity.
    pub accommodates: i64,
    /// Bathroom count.
    pub bathrooms: f64,
    /// Bedroom count.
    pub bedrooms: i64,
    /// Bed count.
    pub beds: i64,
    /// Host response-time category; unknown values map to the sentinel.
    pub host_response_time: String,
    /// Host response rate in `[0, 1]`.
    pub host_response_rate: f64,
    /// Host acceptance rate in `[0, 1]`.
    pub host_acceptance_rate: f64,
    /// Superhost flag in `{0, 1}`.
    pub host_is_superhost: i64,
    /// Identity-verified flag in `{0, 1}`.
    pub host_identity_verified: i64,
    /// Review score in `[0, 5]`.
    pub review_scores_rating: f64,
    /// Review count.
    pub number_of_reviews: i64,
    /// Minimum stay in nights.
    pub minimum_nights: i64,
    /// Maximum stay in nights.
    pub maximum_nights: i64,
    /// Instant-booking flag in `{0, 1}`.
    pub instant_bookable: i64,
    /// Distance to the city centre in kilometres.
    pub distance_to_centre: f64,
    /// Luxury flag in `{0, 1}`.
    pub is_luxury: i64,
    /// Shared-bathroom flag in `{0, 1}`.
    pub is_bathroom_shared: i64,
    /// Dishwasher amenity flag.
    pub amenity_dishwasher: i64,
    /// Iron amenity flag.
    pub amenity_iron: i64,
    /// Toaster amenity flag.
    pub amenity_toaster: i64,
    /// Oven amenity flag.
    pub amenity_oven: i64,
    /// Kitchen amenity flag.
    pub amenity_kitchen: i64,
    /// Microwave amenity flag.
    pub amenity_microwave: i64,
    /// Crib amenity flag.
    pub amenity_crib: i64,
    /// Dining table amenity flag.
    pub amenity_dining_table: i64,
    /// In-unit free dryer amenity flag.
    pub amenity_free_dryer_in_unit: i64,
    /// Travel crib amenity flag.
    pub amenity_pack_n_playtravel_crib: i64,
    /// Distinct amenity count.
    pub amenity_count: i64,
    /// Description sentiment in `[-1, 1]`.
    pub description_sentiment: f64,
    /// Neighborhood overview sentiment in `[-1, 1]`.
    pub neighborhood_overview_sentiment: f64,
    /// Views over the trailing year.
    pub listing_views_ltm: i64,
    /// Distinct viewers over the trailing year.
    pub unique_viewers_ltm: i64,
    /// Conversion rate over the trailing year, in `[0, 1]`.
    pub conversion_rate_ltm: f64,
    /// Mean booking lead time in days.
    pub average_lead_time: f64,
    /// Mean booking duration.
    pub average_booking_duration: f64,
    /// Ground-truth price when known, recorded in the audit log.
    #[serde(default)]
    pub price: Option<f64>,
}

fn check_binary(field: &'static str, value: i64) -> Result<()> {
    if value == 0 || value == 1 {
        Ok(())
    } else {
        Err(ServeError::Validation {
            field,
            reason: format!("expected 0 or 1, got {value}"),
        })
    }
}

fn check_range(field: &'static str, value: f64, lo: f64, hi: f64) -> Result<()> {
    if (lo..=hi).contains(&value) {
        Ok(())
    } else {
        Err(ServeError::Validation {
            field,
            reason: format!("expected a value in [{lo}, {hi}], got {value}"),
        })
    }
}

fn check_non_negative(field: &'static str, value: f64) -> Result<()> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ServeError::Validation {
            field,
            reason: format!("expected a non-negative value, got {value}"),
        })
    }
}

impl PredictionRequest {
    /// Validate every range constraint. Returns the first violation as a
    /// client error; never inspects categorical vocabulary membership.
    pub fn validate(&self) -> Result<()> {
        check_binary("host_is_superhost", self.host_is_superhost)?;
        check_binary("host_identity_verified", self.host_identity_verified)?;
        check_binary("instant_bookable", self.instant_bookable)?;
        check_binary("is_luxury", self.is_luxury)?;
        check_binary("is_bathroom_shared", self.is_bathroom_shared)?;
        check_binary("amenity_dishwasher", self.amenity_dishwasher)?;
        check_binary("amenity_iron", self.amenity_iron)?;
        check_binary("amenity_toaster", self.amenity_toaster)?;
        check_binary("amenity_oven", self.amenity_oven)?;
        check_binary("amenity_kitchen", self.amenity_kitchen)?;
        check_binary("amenity_microwave", self.amenity_microwave)?;
        check_binary("amenity_crib", self.amenity_crib)?;
        check_binary("amenity_dining_table", self.amenity_dining_table)?;
        check_binary("amenity_free_dryer_in_unit", self.amenity_free_dryer_in_unit)?;
        check_binary(
            "amenity_pack_n_playtravel_crib",
            self.amenity_pack_n_playtravel_crib,
        )?;

        check_range("host_response_rate", self.host_response_rate, 0.0, 1.0)?;
        check_range("host_acceptance_rate", self.host_acceptance_rate, 0.0, 1.0)?;
        check_range("conversion_rate_ltm", self.conversion_rate_ltm, 0.0, 1.0)?;
        check_range("review_scores_rating", self.review_scores_rating, 0.0, 5.0)?;
        check_range("description_sentiment", self.description_sentiment, -1.0, 1.0)?;
        check_range(
            "neighborhood_overview_sentiment",
            self.neighborhood_overview_sentiment,
            -1.0,
            1.0,
        )?;

        check_non_negative("accommodates", self.accommodates as f64)?;
        check_non_negative("bathrooms", self.bathrooms)?;
        check_non_negative("bedrooms", self.bedrooms as f64)?;
        check_non_negative("beds", self.beds as f64)?;
        check_non_negative("number_of_reviews", self.number_of_reviews as f64)?;
        check_non_negative("minimum_nights", self.minimum_nights as f64)?;
        check_non_negative("maximum_nights", self.maximum_nights as f64)?;
        check_non_negative("distance_to_centre", self.distance_to_centre)?;
        check_non_negative("amenity_count", self.amenity_count as f64)?;
        check_non_negative("listing_views_ltm", self.listing_views_ltm as f64)?;
        check_non_negative("unique_viewers_ltm", self.unique_viewers_ltm as f64)?;
        check_non_negative("average_lead_time", self.average_lead_time)?;
        check_non_negative("average_booking_duration", self.average_booking_duration)?;
        Ok(())
    }

    /// Materialize the request as a single-row table in the post-extraction
    /// schema, ready for the fitted preprocessor.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let mut columns = vec![
            Column::new("property_type".into(), &[self.property_type.as_str()]),
            Column::new("room_type".into(), &[self.room_type.as_str()]),
            Column::new("accommodates".into(), &[self.accommodates]),
            Column::new("bathrooms".into(), &[self.bathrooms]),
            Column::new("bedrooms".into(), &[self.bedrooms]),
            Column::new("beds".into(), &[self.beds]),
            Column::new(
                "host_response_time".into(),
                &[self.host_response_time.as_str()],
            ),
            Column::new("host_response_rate".into(), &[self.host_response_rate]),
            Column::new("host_acceptance_rate".into(), &[self.host_acceptance_rate]),
            Column::new("host_is_superhost".into(), &[self.host_is_superhost]),
            Column::new(
                "host_identity_verified".into(),
                &[self.host_identity_verified],
            ),
            Column::new("review_scores_rating".into(), &[self.review_scores_rating]),
            Column::new("number_of_reviews".into(), &[self.number_of_reviews]),
            Column::new("minimum_nights".into(), &[self.minimum_nights]),
            Column::new("maximum_nights".into(), &[self.maximum_nights]),
            Column::new("instant_bookable".into(), &[self.instant_bookable]),
            Column::new("distance_to_centre".into(), &[self.distance_to_centre]),
            Column::new("is_luxury".into(), &[self.is_luxury]),
            Column::new("is_bathroom_shared".into(), &[self.is_bathroom_shared]),
            Column::new("amenity_dishwasher".into(), &[self.amenity_dishwasher]),
            Column::new("amenity_iron".into(), &[self.amenity_iron]),
            Column::new("amenity_toaster".into(), &[self.amenity_toaster]),
            Column::new("amenity_oven".into(), &[self.amenity_oven]),
            Column::new("amenity_kitchen".into(), &[self.amenity_kitchen]),
            Column::new("amenity_microwave".into(), &[self.amenity_microwave]),
            Column::new("amenity_crib".into(), &[self.amenity_crib]),
            Column::new("amenity_dining_table".into(), &[self.amenity_dining_table]),
            Column::new(
                "amenity_free_dryer_in_unit".into(),
                &[self.amenity_free_dryer_in_unit],
            ),
            Column::new(
                "amenity_pack_n_playtravel_crib".into(),
                &[self.amenity_pack_n_playtravel_crib],
            ),
            Column::new("amenity_count".into(), &[self.amenity_count]),
            Column::new(
                "description_sentiment".into(),
                &[self.description_sentiment],
            ),
            Column::new(
                "neighborhood_overview_sentiment".into(),
                &[self.neighborhood_overview_sentiment],
            ),
            Column::new("listing_views_ltm".into(), &[self.listing_views_ltm]),
            Column::new("unique_viewers_ltm".into(), &[self.unique_viewers_ltm]),
            Column::new("conversion_rate_ltm".into(), &[self.conversion_rate_ltm]),
            Column::new("average_lead_time".into(), &[self.average_lead_time]),
            Column::new(
                "average_booking_duration".into(),
                &[self.average_booking_duration],
            ),
        ];
        if let Some(price) = self.price {
            columns.push(Column::new("price".into(), &[price]));
        }
        Ok(DataFrame::new(columns)?)
    }
}
