//! The ordered list of feature columns the trained model consumes.
//!
//! A [`FeatureSchema`] is loaded once at startup and never mutated. It fixes
//! both the identity and the position of every feature, so every
//! [`FeatureVector`](crate::encoder::FeatureVector) built against it has the
//! same shape as the rows the model was trained on.

use crate::error::{PredictError, Result};
use polars::prelude::*;
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

pub const AREA_COLUMN: &str = "area_of_apt";
pub const BEDROOMS_COLUMN: &str = "no_of_bedrooms";
pub const BATHROOMS_COLUMN: &str = "no_of_bathrooms";
pub const AVG_METER_PRICE_COLUMN: &str = "avg_meter_price";

/// Columns every schema must carry.
pub const REQUIRED_COLUMNS: [&str; 4] = [
    AREA_COLUMN,
    BEDROOMS_COLUMN,
    BATHROOMS_COLUMN,
    AVG_METER_PRICE_COLUMN,
];

pub const TYPE_PREFIX: &str = "type_";
pub const LOCATION_PREFIX: &str = "location_";
const AMENITY_PREFIX: &str = "has_";
const AMENITY_MARKER: &str = "amenity";

/// Ordered, duplicate-free feature columns with O(1) name lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSchema {
    columns: Vec<String>,
    index: HashMap<String, usize>,
}

impl FeatureSchema {
    /// Build a schema, rejecting empty names, duplicates, and schemas that
    /// lack any of [`REQUIRED_COLUMNS`].
    pub fn new<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        let mut index = HashMap::with_capacity(columns.len());

        for (position, name) in columns.iter().enumerate() {
            if name.trim().is_empty() {
                return Err(PredictError::schema(format!(
                    "column {position} has an empty name"
                )));
            }
            if index.insert(name.clone(), position).is_some() {
                return Err(PredictError::schema(format!("duplicate column '{name}'")));
            }
        }

        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|required| !index.contains_key(*required))
            .collect();
        if !missing.is_empty() {
            return Err(PredictError::schema(format!(
                "missing required columns: {}",
                missing.join(", ")
            )));
        }

        Ok(Self { columns, index })
    }

    /// Load a column list from disk.
    ///
    /// `.json` files hold a JSON array of strings. Anything else is read as
    /// plain text with one column per line; blank lines and lines starting
    /// with `#` are skipped.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| PredictError::io(path, e))?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let columns: Vec<String> = if is_json {
            serde_json::from_str(&raw)?
        } else {
            raw.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#'))
                .map(str::to_string)
                .collect()
        };

        let schema = Self::new(columns)?;
        info!(
            "Loaded {} feature columns from {}",
            schema.len(),
            path.display()
        );
        Ok(schema)
    }

    /// Derive the schema from the header of an already one-hot encoded
    /// training CSV, dropping the `target` column.
    pub fn from_training_csv(path: impl AsRef<Path>, target: &str) -> Result<Self> {
        let path = path.as_ref();
        let df = CsvReader::from_path(path)?
            .has_header(true)
            .with_n_rows(Some(1))
            .finish()?;

        let columns: Vec<String> = df
            .get_column_names()
            .into_iter()
            .filter(|name| *name != target)
            .map(str::to_string)
            .collect();

        let schema = Self::new(columns)?;
        info!(
            "Derived {} feature columns from training data {}",
            schema.len(),
            path.display()
        );
        Ok(schema)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Position of `name` in the column order.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Property types known to the model, prefix stripped and sorted.
    pub fn property_types(&self) -> Vec<&str> {
        self.stripped(TYPE_PREFIX)
    }

    /// Locations known to the model, prefix stripped and sorted.
    pub fn locations(&self) -> Vec<&str> {
        self.stripped(LOCATION_PREFIX)
    }

    /// Amenity columns in schema order.
    pub fn amenity_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .map(String::as_str)
            .filter(|col| is_amenity_column(col))
            .collect()
    }

    fn stripped(&self, prefix: &str) -> Vec<&str> {
        let mut values: Vec<&str> = self
            .columns
            .iter()
            .filter_map(|col| col.strip_prefix(prefix))
            .collect();
        values.sort_unstable();
        values
    }
}

pub fn is_amenity_column(name: &str) -> bool {
    name.starts_with(AMENITY_PREFIX) || name.contains(AMENITY_MARKER)
}

/// Human-readable label for an amenity column: `has_swimming_pool` becomes
/// `Has swimming pool`.
pub fn amenity_label(column: &str) -> String {
    let spaced = column.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
