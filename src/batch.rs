//! Score many listings from a CSV file.
//!
//! Input rows use the dataset column names (`type`, `location`,
//! `area_of_apt`, `no_of_bedrooms`, `no_of_bathrooms`) plus an optional
//! `amenities` column holding `;`-separated amenity columns. The output is the
//! input frame with a `predicted_price` column appended.

use crate::error::{PredictError, Result};
use crate::predictor::Predictor;
use crate::request::PredictionRequest;
use polars::prelude::*;
use std::path::Path;
use tracing::{info, warn};

pub const PREDICTION_COLUMN: &str = "predicted_price";
const AMENITY_SEPARATOR: char = ';';

/// Counts from one batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub rows: usize,
    pub predicted: usize,
    /// Rows left without a prediction because a field was missing or invalid.
    pub skipped: usize,
    /// Unknown property types and locations across all rows.
    pub warnings: usize,
}

pub fn load_csv_file(path: impl AsRef<Path>) -> Result<DataFrame> {
    let path = path.as_ref();
    let df = CsvReader::from_path(path)?.has_header(true).finish()?;
    info!(
        "Loaded {} rows and {} columns from {}",
        df.height(),
        df.width(),
        path.display()
    );
    Ok(df)
}

fn text_column(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let series = df
        .column(name)
        .map_err(|_| PredictError::batch(format!("missing column '{name}'")))?
        .cast(&DataType::Utf8)?;
    let values = series
        .utf8()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect();
    Ok(values)
}

fn number_column(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let series = df
        .column(name)
        .map_err(|_| PredictError::batch(format!("missing column '{name}'")))?
        .cast(&DataType::Float64)?;
    let values = series.f64()?.into_iter().collect();
    Ok(values)
}

fn count(value: Option<f64>) -> Option<u32> {
    value
        .filter(|v| v.is_finite() && *v >= 0.0 && v.fract() == 0.0 && *v <= f64::from(u32::MAX))
        .map(|v| v as u32)
}

/// Predict every row of `df`, returning the frame with a prediction column.
pub fn predict_frame(predictor: &Predictor, df: &DataFrame) -> Result<(DataFrame, BatchSummary)> {
    let types = text_column(df, "type")?;
    let locations = text_column(df, "location")?;
    let areas = number_column(df, "area_of_apt")?;
    let bedrooms = number_column(df, "no_of_bedrooms")?;
    let bathrooms = number_column(df, "no_of_bathrooms")?;
    let amenities = if df.get_column_names().contains(&"amenities") {
        text_column(df, "amenities")?
    } else {
        vec![None; df.height()]
    };

    let mut summary = BatchSummary {
        rows: df.height(),
        ..BatchSummary::default()
    };
    let mut prices: Vec<Option<f64>> = Vec::with_capacity(df.height());

    for row in 0..df.height() {
        let request = match (
            &types[row],
            &locations[row],
            areas[row],
            count(bedrooms[row]),
            count(bathrooms[row]),
        ) {
            (Some(kind), Some(location), Some(area), Some(beds), Some(baths)) => {
                let listed = amenities[row].as_deref().unwrap_or_default();
                PredictionRequest::new(kind.trim(), location.trim(), area, beds, baths)
                    .with_amenities(
                        listed
                            .split(AMENITY_SEPARATOR)
                            .map(str::trim)
                            .filter(|a| !a.is_empty()),
                    )
            }
            _ => {
                warn!(row, "skipping row with missing or invalid fields");
                summary.skipped += 1;
                prices.push(None);
                continue;
            }
        };

        match predictor.predict(&request) {
            Ok(prediction) => {
                summary.predicted += 1;
                summary.warnings += prediction.warnings.len();
                prices.push(Some(prediction.price));
            }
            Err(PredictError::MissingField(field)) => {
                warn!(row, field, "skipping row with blank field");
                summary.skipped += 1;
                prices.push(None);
            }
            Err(e) => return Err(e),
        }
    }

    let mut out = df.clone();
    out.with_column(Series::new(PREDICTION_COLUMN, prices))?;
    Ok((out, summary))
}

/// Read `input`, predict every row, and write the scored frame to `output`.
pub fn predict_csv(
    predictor: &Predictor,
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
) -> Result<BatchSummary> {
    let df = load_csv_file(input)?;
    let (mut scored, summary) = predict_frame(predictor, &df)?;

    let output = output.as_ref();
    let mut file = std::fs::File::create(output).map_err(|e| PredictError::io(output, e))?;
    CsvWriter::new(&mut file).finish(&mut scored)?;

    info!(
        "Scored {} of {} rows into {} ({} skipped, {} warnings)",
        summary.predicted,
        summary.rows,
        output.display(),
        summary.skipped,
        summary.warnings
    );
    Ok(summary)
}
