//! Turns a [`PredictionRequest`] into the single-row input the model expects.
//!
//! The vector starts zero-filled over every schema column. Numeric fields are
//! copied as-is, `avg_meter_price` is derived from the area, and categorical
//! fields become one-hot indicators. A property type or location the model
//! never saw leaves its indicator group all zero and records a warning.
//! Unknown amenities are dropped without a warning.

use crate::request::PredictionRequest;
use crate::schema::{
    FeatureSchema, AREA_COLUMN, AVG_METER_PRICE_COLUMN, BATHROOMS_COLUMN, BEDROOMS_COLUMN,
    LOCATION_PREFIX, TYPE_PREFIX,
};
use std::fmt;
use tracing::{debug, warn};

/// Mean historical price per square meter, multiplied by the area to form
/// the `avg_meter_price` feature.
// TODO: confirm whether this should be recomputed from the training data at load time.
pub const AVG_METER_PRICE: f64 = 57117.58;

/// Numeric input aligned one-to-one with a [`FeatureSchema`].
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector<'a> {
    schema: &'a FeatureSchema,
    values: Vec<f64>,
}

impl<'a> FeatureVector<'a> {
    /// Every column set to zero.
    pub fn zeros(schema: &'a FeatureSchema) -> Self {
        Self {
            schema,
            values: vec![0.0; schema.len()],
        }
    }

    /// Set `column` if the schema has it. Returns whether it was set.
    pub fn set(&mut self, column: &str, value: f64) -> bool {
        match self.schema.index_of(column) {
            Some(i) => {
                self.values[i] = value;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, column: &str) -> Option<f64> {
        self.schema.index_of(column).map(|i| self.values[i])
    }

    pub fn schema(&self) -> &'a FeatureSchema {
        self.schema
    }

    /// Values in schema column order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// `(column, value)` pairs in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.schema
            .columns()
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }
}

/// A categorical value the model was not trained on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodeWarning {
    UnknownPropertyType(String),
    UnknownLocation(String),
}

impl fmt::Display for EncodeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownPropertyType(value) => {
                write!(f, "Property type '{value}' not seen in training data.")
            }
            Self::UnknownLocation(value) => {
                write!(f, "Location '{value}' not seen in training data.")
            }
        }
    }
}

/// An encoded request plus any warnings raised while encoding it.
#[derive(Debug, Clone, PartialEq)]
pub struct Encoded<'a> {
    pub vector: FeatureVector<'a>,
    pub warnings: Vec<EncodeWarning>,
}

/// Build the feature vector for `request`.
///
/// The schema is guaranteed to contain the four numeric columns, so only the
/// categorical and amenity columns need a membership check.
pub fn encode<'a>(schema: &'a FeatureSchema, request: &PredictionRequest) -> Encoded<'a> {
    let mut vector = FeatureVector::zeros(schema);
    let mut warnings = Vec::new();

    vector.set(AREA_COLUMN, request.area);
    vector.set(BEDROOMS_COLUMN, f64::from(request.bedrooms));
    vector.set(BATHROOMS_COLUMN, f64::from(request.bathrooms));
    vector.set(AVG_METER_PRICE_COLUMN, request.area * AVG_METER_PRICE);

    let type_col = format!("{TYPE_PREFIX}{}", request.property_type);
    if !vector.set(&type_col, 1.0) {
        warn!(
            property_type = %request.property_type,
            "property type not recognized, leaving type indicators at zero"
        );
        warnings.push(EncodeWarning::UnknownPropertyType(
            request.property_type.clone(),
        ));
    }

    let loc_col = format!("{LOCATION_PREFIX}{}", request.location);
    if !vector.set(&loc_col, 1.0) {
        warn!(
            location = %request.location,
            "location not recognized, leaving location indicators at zero"
        );
        warnings.push(EncodeWarning::UnknownLocation(request.location.clone()));
    }

    for amenity in &request.amenities {
        vector.set(amenity, 1.0);
    }

    debug!(values = ?vector.values(), "encoded feature vector");
    Encoded { vector, warnings }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> FeatureSchema {
        FeatureSchema::new([
            "area_of_apt",
            "no_of_bedrooms",
            "no_of_bathrooms",
            "avg_meter_price",
            "type_Apartment",
            "type_Villa",
            "location_R7",
            "location_R8",
            "has_pool",
        ])
        .unwrap()
    }

    fn request() -> PredictionRequest {
        PredictionRequest::new("Apartment", "R7", 120.0, 3, 2).with_amenities(["has_pool"])
    }

    fn count_set(vector: &FeatureVector<'_>, prefix: &str) -> usize {
        vector
            .iter()
            .filter(|(name, value)| name.starts_with(prefix) && *value == 1.0)
            .count()
    }

    #[test]
    fn encodes_reference_listing() {
        let schema = schema();
        let encoded = encode(&schema, &request());

        assert!(encoded.warnings.is_empty());
        let expected = [120.0, 3.0, 2.0, 6854109.6, 1.0, 0.0, 1.0, 0.0, 1.0];
        assert_eq!(encoded.vector.len(), expected.len());
        for (got, want) in encoded.vector.values().iter().zip(expected) {
            assert!((got - want).abs() < 1e-6, "got {got}, want {want}");
        }
    }

    #[test]
    fn key_set_matches_schema() {
        let schema = schema();
        let encoded = encode(&schema, &request());
        let names: Vec<&str> = encoded.vector.iter().map(|(name, _)| name).collect();
        let expected: Vec<&str> = schema.columns().iter().map(String::as_str).collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn exactly_one_indicator_per_known_category() {
        let schema = schema();
        let encoded = encode(&schema, &request());
        assert_eq!(count_set(&encoded.vector, "type_"), 1);
        assert_eq!(count_set(&encoded.vector, "location_"), 1);
    }

    #[test]
    fn unknown_type_falls_back_to_zero_indicators() {
        let schema = schema();
        let mut req = request();
        req.property_type = "Chalet".to_string();

        let encoded = encode(&schema, &req);
        assert_eq!(
            encoded.warnings,
            vec![EncodeWarning::UnknownPropertyType("Chalet".to_string())]
        );
        assert_eq!(count_set(&encoded.vector, "type_"), 0);
        assert_eq!(encoded.vector.get("location_R7"), Some(1.0));
        assert_eq!(encoded.vector.get("area_of_apt"), Some(120.0));
        assert_eq!(encoded.vector.get("no_of_bedrooms"), Some(3.0));
        assert_eq!(encoded.vector.get("has_pool"), Some(1.0));
    }

    #[test]
    fn unknown_location_warns_separately() {
        let schema = schema();
        let mut req = request();
        req.property_type = "Chalet".to_string();
        req.location = "R99".to_string();

        let encoded = encode(&schema, &req);
        assert_eq!(encoded.warnings.len(), 2);
        assert_eq!(
            encoded.warnings[1].to_string(),
            "Location 'R99' not seen in training data."
        );
        assert_eq!(count_set(&encoded.vector, "location_"), 0);
    }

    #[test]
    fn unknown_amenities_are_dropped_silently() {
        let schema = schema();
        let req = request().with_amenities(["has_helipad", "type_Villa_typo"]);

        let encoded = encode(&schema, &req);
        assert!(encoded.warnings.is_empty());
        assert_eq!(encoded.vector.len(), schema.len());
        assert_eq!(encoded.vector.get("has_helipad"), None);
        assert_eq!(encoded.vector.get("type_Villa"), Some(0.0));
    }

    #[test]
    fn avg_meter_price_scales_with_area() {
        let schema = schema();
        for area in [30.0, 57.5, 999.0, 1500.0] {
            let mut req = request();
            req.area = area;
            let encoded = encode(&schema, &req);
            let derived = encoded.vector.get("avg_meter_price").unwrap();
            assert!((derived - area * AVG_METER_PRICE).abs() < 1e-6);
        }
    }
}
