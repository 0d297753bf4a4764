//! Price prediction for New Administrative Capital property listings.
//!
//! The feature list and the trained model are loaded once at startup and
//! passed explicitly into [`predict_price`] (or held by a [`Predictor`]).
//! Each request is encoded into a fresh, zero-filled feature row aligned to
//! the schema, scored by the model, and rounded to two decimals.
//!
//! ```no_run
//! use property_price_predictor::{AppConfig, PredictionRequest, Predictor};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let predictor = Predictor::load(&AppConfig::default())?;
//! let request = PredictionRequest::new("Apartment", "R7", 120.0, 3, 2)
//!     .with_amenities(["has_pool"]);
//! let prediction = predictor.predict(&request)?;
//! println!("{:.2}", prediction.price);
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod config;
pub mod encoder;
pub mod error;
pub mod format;
pub mod model;
pub mod predictor;
pub mod request;
pub mod schema;

pub use config::AppConfig;
pub use encoder::{encode, EncodeWarning, Encoded, FeatureVector, AVG_METER_PRICE};
pub use error::{PredictError, Result};
pub use format::format_price;
pub use model::{load_model, ModelArtifact, PriceModel};
pub use predictor::{predict_price, round_price, Prediction, Predictor};
pub use request::PredictionRequest;
pub use schema::FeatureSchema;
