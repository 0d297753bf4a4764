//! Error types for feature encoding and price prediction.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for predictor operations.
pub type Result<T> = std::result::Result<T, PredictError>;

/// Errors that can occur while loading artifacts or predicting a price.
#[derive(Debug, Error)]
pub enum PredictError {
    /// The feature-column list is malformed.
    #[error("invalid feature schema: {0}")]
    Schema(String),

    /// A required request field is empty.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// The model artifact could not be loaded or does not fit the schema.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// The model failed to produce a usable estimate.
    #[error("inference failed: {0}")]
    Inference(String),

    /// Batch input is missing a column or has an unusable type.
    #[error("invalid batch input: {0}")]
    Batch(String),

    /// File I/O error with path context.
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Polars(#[from] polars::error::PolarsError),
}

impl PredictError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn schema(msg: impl Into<String>) -> Self {
        Self::Schema(msg.into())
    }

    pub(crate) fn model_load(msg: impl Into<String>) -> Self {
        Self::ModelLoad(msg.into())
    }

    pub(crate) fn batch(msg: impl Into<String>) -> Self {
        Self::Batch(msg.into())
    }
}
