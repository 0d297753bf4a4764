//! Startup configuration.
//!
//! Values come from an optional JSON file; the command line and environment
//! override individual fields afterwards.

use crate::error::{PredictError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where to find the startup artifacts and how to display prices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Trained model artifact.
    pub model_path: PathBuf,

    /// Ordered feature-column list the model was trained with.
    pub features_path: PathBuf,

    /// Training CSV whose header (minus `price`) replaces `features_path`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub training_csv: Option<PathBuf>,

    /// Currency label appended to displayed prices.
    pub currency: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("model.json"),
            features_path: PathBuf::from("features.json"),
            training_csv: None,
            currency: "EGP".to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| PredictError::io(path, e))?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn with_model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.model_path = path.into();
        self
    }

    pub fn with_features_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.features_path = path.into();
        self
    }

    pub fn with_training_csv(mut self, path: impl Into<PathBuf>) -> Self {
        self.training_csv = Some(path.into());
        self
    }

    /// File the feature schema is read from.
    pub fn schema_source(&self) -> &Path {
        self.training_csv
            .as_deref()
            .unwrap_or(self.features_path.as_path())
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("predictor.json");
        std::fs::write(&path, r#"{"model_path": "/srv/models/rf.json"}"#).unwrap();

        let config = AppConfig::from_file(&path).unwrap();
        assert_eq!(config.model_path, PathBuf::from("/srv/models/rf.json"));
        assert_eq!(config.features_path, PathBuf::from("features.json"));
        assert_eq!(config.currency, "EGP");
    }

    #[test]
    fn overrides_replace_fields() {
        let config = AppConfig::default()
            .with_features_path("cols.txt")
            .with_currency("USD");
        assert_eq!(config.features_path, PathBuf::from("cols.txt"));
        assert_eq!(config.currency, "USD");
        assert_eq!(config.model_path, PathBuf::from("model.json"));
    }

    #[test]
    fn training_csv_takes_precedence_as_schema_source() {
        let config = AppConfig::default();
        assert_eq!(config.schema_source(), Path::new("features.json"));
        let config = config.with_training_csv("train.csv");
        assert_eq!(config.schema_source(), Path::new("train.csv"));
    }

    #[test]
    fn malformed_file_is_a_json_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ model_path: ").unwrap();
        assert!(matches!(
            AppConfig::from_file(&path),
            Err(PredictError::Json(_))
        ));
    }
}
