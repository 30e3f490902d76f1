//! Source table schemas.
//!
//! Column whitelists for the listing and session sources, the merge
//! identity, and the amenity vocabulary the extractor encodes. These are
//! the only raw columns the pipeline ever reads; everything else in the
//! source files is ignored.

/// Listing identity column, the merge key between the two derived tables.
pub const LISTING_ID: &str = "id";

/// Host onboarding date, consumed by the noise labeler and then dropped.
pub const HOST_SINCE: &str = "host_since";

/// The label column: a currency-formatted price string in the raw source.
pub const TARGET: &str = "price";

/// Accommodation attributes of the listing itself.
pub const ACCOMMODATION_COLUMNS: &[&str] = &[
    "property_type",
    "room_type",
    "accommodates",
    "bathrooms",
    "bathrooms_text",
    "bedrooms",
    "beds",
    "amenities",
];

/// Free-text columns scored for sentiment.
pub const TEXT_COLUMNS: &[&str] = &["description", "neighborhood_overview"];

/// Raw coordinates, reduced to a distance feature and then dropped.
pub const LOCATION_COLUMNS: &[&str] = &["latitude", "longitude"];

/// Host trust and responsiveness metrics.
pub const HOST_TRUST_COLUMNS: &[&str] = &[
    "host_response_time",
    "host_response_rate",
    "host_acceptance_rate",
    "host_is_superhost",
    "host_identity_verified",
    "review_scores_rating",
    "number_of_reviews",
];

/// Stay-constraint and booking-mode attributes.
pub const AVAILABILITY_COLUMNS: &[&str] = &[
    "minimum_nights",
    "maximum_nights",
    "instant_bookable",
];

/// Required columns of the session event source.
pub const SESSION_COLUMNS: &[&str] = &[
    "listing_id",
    "user_id",
    "action",
    "timestamp",
    "booking_date",
    "booking_duration",
];

/// Target amenity vocabulary. Each entry becomes one binary feature column;
/// matching happens on normalized text, so the unicode punctuation in the
/// last two entries is immaterial to lookup but kept verbatim here because
/// it is what the source data contains.
pub const AMENITY_VOCABULARY: &[&str] = &[
    "dishwasher",
    "iron",
    "toaster",
    "oven",
    "kitchen",
    "microwave",
    "crib",
    "dining table",
    "Free dryer \u{2013} In unit",
    "Pack \u{2019}n play/Travel crib",
];

/// Every raw listing column the extractor selects, in selection order.
pub fn listing_source_columns() -> Vec<&'static str> {
    let mut columns = vec![LISTING_ID, HOST_SINCE];
    columns.extend_from_slice(ACCOMMODATION_COLUMNS);
    columns.extend_from_slice(TEXT_COLUMNS);
    columns.extend_from_slice(LOCATION_COLUMNS);
    columns.extend_from_slice(HOST_TRUST_COLUMNS);
    columns.extend_from_slice(AVAILABILITY_COLUMNS);
    columns.push(TARGET);
    columns
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_source_columns_complete() {
        let columns = listing_source_columns();
        assert!(columns.contains(&"id"));
        assert!(columns.contains(&"host_since"));
        assert!(columns.contains(&"amenities"));
        assert!(columns.contains(&"price"));
        // No duplicates.
        let unique: std::collections::HashSet<_> = columns.iter().collect();
        assert_eq!(unique.len(), columns.len());
    }

    #[test]
    fn test_amenity_vocabulary_size() {
        assert_eq!(AMENITY_VOCABULARY.len(), 10);
    }
}
