//! Price prediction over an explicitly supplied schema and model.

use crate::config::AppConfig;
use crate::encoder::{encode, EncodeWarning};
use crate::error::{PredictError, Result};
use crate::model::{load_model, PriceModel};
use crate::request::PredictionRequest;
use crate::schema::FeatureSchema;
use tracing::info;

/// Label column dropped when deriving features from a training CSV.
pub const TARGET_COLUMN: &str = "price";

/// A rounded price estimate and the encoding warnings behind it.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub price: f64,
    pub warnings: Vec<EncodeWarning>,
}

/// Round to two decimal places.
pub fn round_price(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Encode `request` against `schema`, run `model`, and round the result.
///
/// Neither the schema nor the model is modified. Unknown property types and
/// locations are reported in [`Prediction::warnings`], not as errors.
pub fn predict_price<M>(
    schema: &FeatureSchema,
    model: &M,
    request: &PredictionRequest,
) -> Result<Prediction>
where
    M: PriceModel + ?Sized,
{
    let encoded = encode(schema, request);
    let raw = model.predict(&encoded.vector)?;
    if !raw.is_finite() {
        return Err(PredictError::Inference(format!(
            "model returned non-finite estimate {raw}"
        )));
    }

    Ok(Prediction {
        price: round_price(raw),
        warnings: encoded.warnings,
    })
}

/// A schema and model loaded once and shared by every request.
pub struct Predictor {
    schema: FeatureSchema,
    model: Box<dyn PriceModel>,
}

impl std::fmt::Debug for Predictor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Predictor")
            .field("columns", &self.schema.len())
            .finish_non_exhaustive()
    }
}

impl Predictor {
    /// Pair a schema with a model, failing if the model references columns
    /// the schema lacks.
    pub fn new(schema: FeatureSchema, model: Box<dyn PriceModel>) -> Result<Self> {
        model.check_schema(&schema)?;
        Ok(Self { schema, model })
    }

    /// Load the feature list and model named by `config`. A configured
    /// training CSV supplies the feature list in place of `features_path`.
    pub fn load(config: &AppConfig) -> Result<Self> {
        let schema = match &config.training_csv {
            Some(csv) => FeatureSchema::from_training_csv(csv, TARGET_COLUMN)?,
            None => FeatureSchema::load(&config.features_path)?,
        };
        let model = load_model(&config.model_path)?;
        let predictor = Self::new(schema, model)?;
        info!(
            "Predictor ready: {} property types, {} locations, {} amenities",
            predictor.schema.property_types().len(),
            predictor.schema.locations().len(),
            predictor.schema.amenity_columns().len()
        );
        Ok(predictor)
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Validate required fields, then predict.
    pub fn predict(&self, request: &PredictionRequest) -> Result<Prediction> {
        request.validate()?;
        predict_price(&self.schema, self.model.as_ref(), request)
    }
}
