//! End-to-end pipeline integration: raw sources through the built dataset
//! to a fitted preprocessing scheme.

use approx::assert_relative_eq;
use polars::prelude::*;

use stoa::preprocess::Preprocessor;
use stoa::{build_dataset, training_features};

fn raw_listings() -> DataFrame {
    DataFrame::new(vec![
        Column::new("id".into(), &[1i64, 2]),
        Column::new("host_since".into(), &["2020-01-15", "2024-05-01"]),
        Column::new(
            "property_type".into(),
            &["Entire loft in downtown", "Private rental unit"],
        ),
        Column::new("room_type".into(), &["Entire home/apt", "Private room"]),
        Column::new("accommodates".into(), &[4i64, 2]),
        Column::new("bathrooms".into(), vec![None::<f64>, Some(1.0)]),
        Column::new(
            "bathrooms_text".into(),
            vec![Some("1.5 shared baths"), None],
        ),
        Column::new("bedrooms".into(), &[2i64, 1]),
        Column::new("beds".into(), &[2i64, 1]),
        Column::new(
            "amenities".into(),
            vec![Some(r#"["Kitchen", "Dishwasher"]"#), None],
        ),
        Column::new(
            "description".into(),
            vec![Some("A great sunny place!"), None],
        ),
        Column::new("neighborhood_overview".into(), vec![Some("Quiet"), None]),
        Column::new("latitude".into(), &[37.9755f64, 37.99]),
        Column::new("longitude".into(), &[23.7349f64, 23.70]),
        Column::new(
            "host_response_time".into(),
            &["within an hour", "within a day"],
        ),
        Column::new("host_response_rate".into(), vec![Some("95%"), None]),
        Column::new("host_acceptance_rate".into(), &["90%", "80%"]),
        Column::new("host_is_superhost".into(), &["t", "f"]),
        Column::new("host_identity_verified".into(), &["t", "t"]),
        Column::new("review_scores_rating".into(), &[4.8f64, 4.2]),
        Column::new("number_of_reviews".into(), &[120i64, 3]),
        Column::new("minimum_nights".into(), &[2i64, 1]),
        Column::new("maximum_nights".into(), &[30i64, 365]),
        Column::new("instant_bookable".into(), &["t", "f"]),
        Column::new("price".into(), &["$100.00", "$85.00"]),
    ])
    .unwrap()
}

fn raw_sessions() -> DataFrame {
    let rows: Vec<(Option<i64>, &str, &str, &str, Option<&str>, Option<f64>)> = vec![
        (Some(1), "U1", "view_listing", "2024-06-01 10:00:00", None, None),
        (Some(1), "U2", "view_listing", "2024-06-02 10:00:00", None, None),
        (
            Some(1),
            "U2",
            "book_listing",
            "2024-06-03 10:00:00",
            Some("2024-06-13"),
            Some(4.0),
        ),
        (Some(1), "U3", "view_listing", "2024-06-20 12:00:00", None, None),
        (None, "U4", "browse_listings", "2024-06-10 09:00:00", None, None),
    ];
    DataFrame::new(vec![
        Column::new(
            "listing_id".into(),
            rows.iter().map(|r| r.0).collect::<Vec<_>>(),
        ),
        Column::new("user_id".into(), rows.iter().map(|r| r.1).collect::<Vec<_>>()),
        Column::new("action".into(), rows.iter().map(|r| r.2).collect::<Vec<_>>()),
        Column::new(
            "timestamp".into(),
            rows.iter().map(|r| r.3).collect::<Vec<_>>(),
        ),
        Column::new(
            "booking_date".into(),
            rows.iter().map(|r| r.4).collect::<Vec<_>>(),
        ),
        Column::new(
            "booking_duration".into(),
            rows.iter().map(|r| r.5).collect::<Vec<_>>(),
        ),
    ])
    .unwrap()
}

fn f64_at(df: &DataFrame, column: &str, row: usize) -> f64 {
    df.column(column)
        .unwrap()
        .as_materialized_series()
        .cast(&DataType::Float64)
        .unwrap()
        .f64()
        .unwrap()
        .get(row)
        .unwrap()
}

#[test]
fn test_dataset_schema_and_labels() {
    let dataset = build_dataset(&raw_listings(), &raw_sessions()).unwrap();
    assert_eq!(dataset.height(), 2);

    let names: Vec<String> = dataset
        .get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .collect();
    // Identity and analysis intermediates are gone.
    assert!(!names.iter().any(|name| name == "id"));
    assert!(!names.iter().any(|name| name == "host_since"));
    assert!(!names.iter().any(|name| name == "latitude"));
    // Derived features and the markers are present.
    for expected in [
        "distance_to_centre",
        "amenity_kitchen",
        "listing_views_ltm",
        "is_training_sample",
        "price",
    ] {
        assert!(names.iter().any(|name| name == expected), "{expected} missing");
    }

    // Mature and converting listing is a training sample; recently
    // onboarded listing with no sessions is not.
    assert_relative_eq!(f64_at(&dataset, "is_training_sample", 0), 1.0);
    assert_relative_eq!(f64_at(&dataset, "is_training_sample", 1), 0.0);

    // Label is the log-transformed parsed price.
    assert_relative_eq!(f64_at(&dataset, "price", 0), 101.0f64.ln());
    assert_relative_eq!(f64_at(&dataset, "price", 1), 86.0f64.ln());
}

#[test]
fn test_session_aggregates_reach_the_dataset() {
    let dataset = build_dataset(&raw_listings(), &raw_sessions()).unwrap();
    assert_relative_eq!(f64_at(&dataset, "listing_views_ltm", 0), 3.0);
    assert_relative_eq!(f64_at(&dataset, "unique_viewers_ltm", 0), 3.0);
    assert_relative_eq!(f64_at(&dataset, "conversion_rate_ltm", 0), 1.0 / 3.0);
    assert_relative_eq!(f64_at(&dataset, "average_lead_time", 0), 10.0);
    assert_relative_eq!(f64_at(&dataset, "average_booking_duration", 0), 4.0);

    // The listing without sessions is zero-filled, not null.
    assert_relative_eq!(f64_at(&dataset, "listing_views_ltm", 1), 0.0);
    assert_relative_eq!(f64_at(&dataset, "conversion_rate_ltm", 1), 0.0);
}

#[test]
fn test_training_view_filters_and_drops_marker() {
    let dataset = build_dataset(&raw_listings(), &raw_sessions()).unwrap();
    let training = training_features(&dataset).unwrap();
    assert_eq!(training.height(), 1);
    assert!(training.column("is_training_sample").is_err());
    assert_relative_eq!(f64_at(&training, "price", 0), 101.0f64.ln());
}

#[test]
fn test_fitted_scheme_transforms_the_training_view() {
    let dataset = build_dataset(&raw_listings(), &raw_sessions()).unwrap();
    let training = training_features(&dataset).unwrap();
    let fitted = Preprocessor::fit(&training).unwrap();
    let out = fitted.transform(&training).unwrap();

    // Every fitted output column plus the label passthrough.
    assert_eq!(out.width(), fitted.output_columns().len() + 1);
    let last = out.get_column_names().pop().unwrap().to_string();
    assert_eq!(last, "price");
}
