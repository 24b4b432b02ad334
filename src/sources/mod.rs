//! Positions sources API

use serde::Deserialize;

use crate::{PositionSample, TrackingError};

/// Position source
pub trait PositionsSource {
    /// Fetch the recorded positions, sorted by time
    fn fetch(&mut self) -> Result<Vec<PositionSample>, TrackingError>;
}

/// Column names of a tabular positions source
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct FieldsConfiguration {
    pub lat: String,
    pub lng: String,
    /// Combined "lat,lng" column, used when `lat`/`lng` are missing
    pub coordinates: String,
    /// RFC3339 or unix seconds
    pub time: String,
    pub accuracy: String,
    pub speed: String,
    /// The combined column is "lng,lat"
    pub flip_coordinates: bool,
}

impl Default for FieldsConfiguration {
    fn default() -> Self {
        Self {
            lat: "lat".to_string(),
            lng: "lng".to_string(),
            coordinates: "coordinates".to_string(),
            time: "time".to_string(),
            accuracy: "accuracy".to_string(),
            speed: "speed".to_string(),
            flip_coordinates: false,
        }
    }
}

mod gpx_file;
pub use gpx_file::GpxSource;

#[cfg(feature = "csv")]
mod csv_file;

#[cfg(feature = "csv")]
pub use csv_file::CsvSource;
