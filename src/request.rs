//! User-facing property attributes and the input hints shown alongside them.

use crate::error::{PredictError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const MIN_AREA: f64 = 30.0;
pub const MAX_AREA: f64 = 1500.0;
/// Below this many square meters a listing is unlikely to be residential.
pub const SMALL_RESIDENTIAL_AREA: f64 = 50.0;

/// One prediction request. Built per user action and never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub property_type: String,
    pub location: String,
    /// Floor area in square meters.
    pub area: f64,
    pub bedrooms: u32,
    pub bathrooms: u32,
    #[serde(default)]
    pub amenities: BTreeSet<String>,
}

impl PredictionRequest {
    pub fn new(
        property_type: impl Into<String>,
        location: impl Into<String>,
        area: f64,
        bedrooms: u32,
        bathrooms: u32,
    ) -> Self {
        Self {
            property_type: property_type.into(),
            location: location.into(),
            area,
            bedrooms,
            bathrooms,
            amenities: BTreeSet::new(),
        }
    }

    pub fn with_amenities<I, S>(mut self, amenities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.amenities.extend(amenities.into_iter().map(Into::into));
        self
    }

    /// Reject requests that leave the property type or location blank.
    pub fn validate(&self) -> Result<()> {
        if self.property_type.trim().is_empty() {
            return Err(PredictError::MissingField("property type"));
        }
        if self.location.trim().is_empty() {
            return Err(PredictError::MissingField("location"));
        }
        Ok(())
    }
}

/// Advisory notes about the requested area. Never blocks a prediction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AreaNotice {
    OutOfRange(f64),
    SmallForResidential(f64),
}

impl std::fmt::Display for AreaNotice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OutOfRange(area) => write!(
                f,
                "Area {area} sqm is outside {MIN_AREA}-{MAX_AREA} sqm."
            ),
            Self::SmallForResidential(area) => write!(
                f,
                "Area {area} sqm is below {SMALL_RESIDENTIAL_AREA} sqm and may not suit a residential property."
            ),
        }
    }
}

pub fn area_notices(area: f64) -> Vec<AreaNotice> {
    let mut notices = Vec::new();
    if !(MIN_AREA..=MAX_AREA).contains(&area) {
        notices.push(AreaNotice::OutOfRange(area));
    }
    if area < SMALL_RESIDENTIAL_AREA {
        notices.push(AreaNotice::SmallForResidential(area));
    }
    notices
}

/// Typical bedroom and bathroom counts for an area bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomOptions {
    pub bedrooms: &'static [u32],
    pub bathrooms: &'static [u32],
}

impl RoomOptions {
    pub fn allows(&self, bedrooms: u32, bathrooms: u32) -> bool {
        self.bedrooms.contains(&bedrooms) && self.bathrooms.contains(&bathrooms)
    }
}

pub fn suggested_rooms(area: f64) -> RoomOptions {
    if area < 100.0 {
        RoomOptions {
            bedrooms: &[1, 2],
            bathrooms: &[1],
        }
    } else if area < 200.0 {
        RoomOptions {
            bedrooms: &[2, 3, 4],
            bathrooms: &[2, 3],
        }
    } else if area < 300.0 {
        RoomOptions {
            bedrooms: &[3, 4, 5],
            bathrooms: &[2, 3, 4],
        }
    } else {
        RoomOptions {
            bedrooms: &[3, 4, 5, 6, 7],
            bathrooms: &[2, 3, 4, 5],
        }
    }
}
