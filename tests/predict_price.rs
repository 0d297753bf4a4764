use property_price_predictor::{
    encode, format_price, AppConfig, EncodeWarning, FeatureSchema, PredictError,
    PredictionRequest, Predictor, AVG_METER_PRICE,
};
use std::path::Path;

const COLUMNS: [&str; 9] = [
    "area_of_apt",
    "no_of_bedrooms",
    "no_of_bathrooms",
    "avg_meter_price",
    "type_Apartment",
    "type_Villa",
    "location_R7",
    "location_R8",
    "has_pool",
];

fn write_artifacts(dir: &Path) -> AppConfig {
    let features = dir.join("features.json");
    std::fs::write(&features, serde_json::to_string(&COLUMNS).unwrap()).unwrap();

    // Two boosted stumps: one on area, one on the villa indicator.
    let model = dir.join("model.json");
    std::fs::write(
        &model,
        r#"{
            "kind": "tree_ensemble",
            "base_score": 1000000.0,
            "learning_rate": 0.5,
            "aggregation": "sum",
            "trees": [
                {"nodes": [
                    {"feature": "area_of_apt", "threshold": 150.0, "left": 1, "right": 2},
                    {"value": 2000000.0},
                    {"value": 6000000.0}
                ]},
                {"nodes": [
                    {"feature": "type_Villa", "threshold": 0.5, "left": 1, "right": 2},
                    {"value": 0.123},
                    {"value": 4000000.0}
                ]}
            ]
        }"#,
    )
    .unwrap();

    AppConfig::default()
        .with_features_path(features)
        .with_model_path(model)
}

fn reference_request() -> PredictionRequest {
    PredictionRequest::new("Apartment", "R7", 120.0, 3, 2).with_amenities(["has_pool"])
}

#[test]
fn reference_listing_encodes_as_documented() {
    let schema = FeatureSchema::new(COLUMNS).unwrap();
    let encoded = encode(&schema, &reference_request());

    let expected = [
        ("area_of_apt", 120.0),
        ("no_of_bedrooms", 3.0),
        ("no_of_bathrooms", 2.0),
        ("avg_meter_price", 6854109.6),
        ("type_Apartment", 1.0),
        ("type_Villa", 0.0),
        ("location_R7", 1.0),
        ("location_R8", 0.0),
        ("has_pool", 1.0),
    ];
    let got: Vec<(&str, f64)> = encoded.vector.iter().collect();
    assert_eq!(got.len(), expected.len());
    for ((name, value), (want_name, want_value)) in got.iter().zip(expected) {
        assert_eq!(*name, want_name);
        assert!((value - want_value).abs() < 1e-6, "{name}: {value}");
    }
    assert!(encoded.warnings.is_empty());
}

#[test]
fn predictor_loads_artifacts_and_rounds() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_artifacts(dir.path());
    let predictor = Predictor::load(&config).unwrap();

    let prediction = predictor.predict(&reference_request()).unwrap();
    // 1_000_000 + 0.5 * (2_000_000 + 0.123)
    assert_eq!(prediction.price, 2000000.06);
    assert_eq!(format_price(prediction.price, &config.currency), "2,000,000 EGP");

    let again = predictor.predict(&reference_request()).unwrap();
    assert_eq!(prediction, again);
}

#[test]
fn unrecognized_type_degrades_to_zero_indicators() {
    let dir = tempfile::tempdir().unwrap();
    let predictor = Predictor::load(&write_artifacts(dir.path())).unwrap();

    let mut request = reference_request();
    request.property_type = "Chalet".to_string();
    let prediction = predictor.predict(&request).unwrap();
    assert_eq!(
        prediction.warnings,
        vec![EncodeWarning::UnknownPropertyType("Chalet".into())]
    );

    let encoded = encode(predictor.schema(), &request);
    assert_eq!(encoded.vector.get("type_Apartment"), Some(0.0));
    assert_eq!(encoded.vector.get("type_Villa"), Some(0.0));
    assert_eq!(encoded.vector.get("location_R7"), Some(1.0));
    assert_eq!(
        encoded.vector.get("avg_meter_price"),
        Some(120.0 * AVG_METER_PRICE)
    );
}

#[test]
fn villa_branch_changes_estimate() {
    let dir = tempfile::tempdir().unwrap();
    let predictor = Predictor::load(&write_artifacts(dir.path())).unwrap();
    let request = PredictionRequest::new("Villa", "R8", 400.0, 5, 4);
    let prediction = predictor.predict(&request).unwrap();
    assert_eq!(prediction.price, 1000000.0 + 0.5 * (6000000.0 + 4000000.0));
}

#[test]
fn startup_fails_when_model_references_unknown_columns() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_artifacts(dir.path());
    std::fs::write(
        &config.model_path,
        r#"{"kind":"linear","coefficients":{"type_Penthouse":1.0}}"#,
    )
    .unwrap();

    let err = Predictor::load(&config).unwrap_err();
    assert!(matches!(err, PredictError::ModelLoad(_)), "{err}");
}

#[test]
fn blank_location_is_not_predicted() {
    let dir = tempfile::tempdir().unwrap();
    let predictor = Predictor::load(&write_artifacts(dir.path())).unwrap();
    let request = PredictionRequest::new("Apartment", "", 120.0, 3, 2);
    assert!(matches!(
        predictor.predict(&request),
        Err(PredictError::MissingField("location"))
    ));
}
