//! Trained regression models behind a single `predict` entry point.
//!
//! Models are loaded once at startup and only read afterwards. Two artifact
//! families are supported: JSON artifacts ([`ModelArtifact`]) evaluated in
//! Rust, and, with the `xgboost` feature, native XGBoost booster files.

use crate::encoder::FeatureVector;
use crate::error::{PredictError, Result};
use crate::schema::FeatureSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

/// A trained model that maps one feature row to one price estimate.
pub trait PriceModel {
    fn predict(&self, features: &FeatureVector<'_>) -> Result<f64>;

    /// Checked once when the model is paired with a schema.
    fn check_schema(&self, _schema: &FeatureSchema) -> Result<()> {
        Ok(())
    }
}

impl<M: PriceModel + ?Sized> PriceModel for Box<M> {
    fn predict(&self, features: &FeatureVector<'_>) -> Result<f64> {
        (**self).predict(features)
    }

    fn check_schema(&self, schema: &FeatureSchema) -> Result<()> {
        (**self).check_schema(schema)
    }
}

/// Ordinary least-squares style model: `intercept + Σ coefficient * value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    #[serde(default)]
    pub intercept: f64,
    pub coefficients: BTreeMap<String, f64>,
}

impl PriceModel for LinearModel {
    fn predict(&self, features: &FeatureVector<'_>) -> Result<f64> {
        let mut total = self.intercept;
        for (name, coefficient) in &self.coefficients {
            let value = features.get(name).ok_or_else(|| {
                PredictError::Inference(format!("feature '{name}' missing from input row"))
            })?;
            total += coefficient * value;
        }
        Ok(total)
    }

    fn check_schema(&self, schema: &FeatureSchema) -> Result<()> {
        match self.coefficients.keys().find(|name| !schema.contains(name)) {
            Some(name) => Err(PredictError::model_load(format!(
                "coefficient for unknown feature '{name}'"
            ))),
            None => Ok(()),
        }
    }
}

/// How per-tree outputs are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    /// Gradient boosting: `base_score + learning_rate * Σ tree`.
    Sum,
    /// Random forest: `base_score + mean(tree)`.
    Mean,
}

/// Node in a regression tree. A node without a feature is a leaf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    #[serde(default)]
    pub feature: Option<String>,
    /// Samples with `value <= threshold` go left.
    #[serde(default)]
    pub threshold: f64,
    /// Child indices; split nodes need both, leaves need neither.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<usize>,
    /// Leaf output.
    #[serde(default)]
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    pub nodes: Vec<TreeNode>,
}

impl RegressionTree {
    /// Walks from the root. Missing nodes and absent or backward children are
    /// inference errors.
    fn evaluate(&self, features: &FeatureVector<'_>) -> Result<f64> {
        let mut idx = 0usize;
        loop {
            let node = self.nodes.get(idx).ok_or_else(|| {
                PredictError::Inference(format!("tree has no node {idx}"))
            })?;
            let Some(name) = &node.feature else {
                return Ok(node.value);
            };
            let value = features.get(name).ok_or_else(|| {
                PredictError::Inference(format!("feature '{name}' missing from input row"))
            })?;
            let next = if value <= node.threshold {
                node.left
            } else {
                node.right
            };
            idx = match next {
                Some(child) if child > idx => child,
                _ => {
                    return Err(PredictError::Inference(format!(
                        "split node {idx} has no forward child"
                    )))
                }
            };
        }
    }

    /// Children must point forward, which also rules out cycles.
    fn check(&self, tree: usize, schema: &FeatureSchema) -> Result<()> {
        if self.nodes.is_empty() {
            return Err(PredictError::model_load(format!("tree {tree} has no nodes")));
        }
        for (i, node) in self.nodes.iter().enumerate() {
            let Some(name) = &node.feature else {
                continue;
            };
            if !schema.contains(name) {
                return Err(PredictError::model_load(format!(
                    "tree {tree} node {i} splits on unknown feature '{name}'"
                )));
            }
            for child in [node.left, node.right] {
                match child {
                    Some(child) if child > i && child < self.nodes.len() => {}
                    Some(child) => {
                        return Err(PredictError::model_load(format!(
                            "tree {tree} node {i} has invalid child index {child}"
                        )))
                    }
                    None => {
                        return Err(PredictError::model_load(format!(
                            "tree {tree} node {i} is a split without both children"
                        )))
                    }
                }
            }
        }
        Ok(())
    }
}

fn default_learning_rate() -> f64 {
    1.0
}

/// Ensemble of regression trees over named features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeEnsemble {
    #[serde(default)]
    pub base_score: f64,
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    pub aggregation: Aggregation,
    pub trees: Vec<RegressionTree>,
}

impl PriceModel for TreeEnsemble {
    fn predict(&self, features: &FeatureVector<'_>) -> Result<f64> {
        let mut sum = 0.0;
        for tree in &self.trees {
            sum += tree.evaluate(features)?;
        }
        Ok(match self.aggregation {
            Aggregation::Sum => self.base_score + self.learning_rate * sum,
            Aggregation::Mean => self.base_score + sum / self.trees.len() as f64,
        })
    }

    fn check_schema(&self, schema: &FeatureSchema) -> Result<()> {
        if self.trees.is_empty() {
            return Err(PredictError::model_load("tree ensemble has no trees"));
        }
        self.trees
            .iter()
            .enumerate()
            .try_for_each(|(i, tree)| tree.check(i, schema))
    }
}

/// JSON model artifact, tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    Linear(LinearModel),
    TreeEnsemble(TreeEnsemble),
}

impl ModelArtifact {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| PredictError::io(path, e))?;
        Ok(serde_json::from_str(&raw)?)
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Linear(_) => "linear",
            Self::TreeEnsemble(_) => "tree_ensemble",
        }
    }
}

impl PriceModel for ModelArtifact {
    fn predict(&self, features: &FeatureVector<'_>) -> Result<f64> {
        match self {
            Self::Linear(model) => model.predict(features),
            Self::TreeEnsemble(model) => model.predict(features),
        }
    }

    fn check_schema(&self, schema: &FeatureSchema) -> Result<()> {
        match self {
            Self::Linear(model) => model.check_schema(schema),
            Self::TreeEnsemble(model) => model.check_schema(schema),
        }
    }
}

#[cfg(feature = "xgboost")]
pub use self::xgb::XgbModel;

#[cfg(feature = "xgboost")]
mod xgb {
    use super::PriceModel;
    use crate::encoder::FeatureVector;
    use crate::error::{PredictError, Result};
    use std::path::Path;
    use xgboost::{Booster, DMatrix};

    /// Native XGBoost booster fed one dense row in schema order.
    pub struct XgbModel {
        booster: Booster,
    }

    impl XgbModel {
        pub fn load(path: impl AsRef<Path>) -> Result<Self> {
            let booster = Booster::load(path.as_ref())
                .map_err(|e| PredictError::model_load(e.to_string()))?;
            Ok(Self { booster })
        }
    }

    impl PriceModel for XgbModel {
        fn predict(&self, features: &FeatureVector<'_>) -> Result<f64> {
            let row: Vec<f32> = features.values().iter().map(|&v| v as f32).collect();
            let dmatrix = DMatrix::from_dense(&row, 1)
                .map_err(|e| PredictError::Inference(e.to_string()))?;
            let predictions = self
                .booster
                .predict(&dmatrix)
                .map_err(|e| PredictError::Inference(e.to_string()))?;
            predictions
                .first()
                .copied()
                .map(f64::from)
                .ok_or_else(|| PredictError::Inference("booster returned no output".into()))
        }
    }
}

/// Load a model artifact, choosing the format from the file extension.
///
/// `.json` files are [`ModelArtifact`]s; any other file is treated as a native
/// XGBoost booster, which needs the `xgboost` feature.
pub fn load_model(path: impl AsRef<Path>) -> Result<Box<dyn PriceModel>> {
    let path = path.as_ref();
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        let artifact = ModelArtifact::load(path)?;
        info!(
            "Loaded {} model from {}",
            artifact.kind(),
            path.display()
        );
        return Ok(Box::new(artifact));
    }

    load_native(path)
}

#[cfg(feature = "xgboost")]
fn load_native(path: &Path) -> Result<Box<dyn PriceModel>> {
    let model = XgbModel::load(path)?;
    info!("Loaded XGBoost booster from {}", path.display());
    Ok(Box::new(model))
}

#[cfg(not(feature = "xgboost"))]
fn load_native(path: &Path) -> Result<Box<dyn PriceModel>> {
    Err(PredictError::model_load(format!(
        "{} is not a JSON artifact and XGBoost support is not compiled in",
        path.display()
    )))
}
