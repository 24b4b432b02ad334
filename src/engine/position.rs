//! Position definition

use time::OffsetDateTime;

use super::error::TrackingError;
use super::geodesic::{self, coord, Coordinate};

/// A position reported by the device
#[derive(Clone, Debug, PartialEq)]
pub struct PositionSample {
    pub coordinates: Coordinate,
    pub time: OffsetDateTime,
    /// Horizontal accuracy radius in meters
    pub accuracy: f64,
    /// Device reported speed in m/s, often missing or unreliable
    pub speed: Option<f64>,
}

impl PositionSample {
    pub fn basic(coordinates: Coordinate, time: OffsetDateTime) -> Self {
        Self {
            coordinates,
            time,
            accuracy: 0.0,
            speed: None,
        }
    }

    pub fn new(lat: f64, lng: f64, accuracy: f64, time: OffsetDateTime) -> Self {
        Self {
            coordinates: coord(lat, lng),
            time,
            accuracy,
            speed: None,
        }
    }

    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = Some(speed);
        self
    }

    pub fn lat(&self) -> f64 {
        self.coordinates.y()
    }

    pub fn lng(&self) -> f64 {
        self.coordinates.x()
    }

    /// Reject samples the engine can't reason about
    pub fn validate(&self) -> Result<(), TrackingError> {
        if !geodesic::is_valid(&self.coordinates) {
            return Err(TrackingError::validation(format!(
                "Invalid sample coordinates: lat {}, lng {}",
                self.lat(),
                self.lng()
            )));
        }

        if !self.accuracy.is_finite() || self.accuracy < 0.0 {
            return Err(TrackingError::validation(format!(
                "Invalid sample accuracy: {}",
                self.accuracy
            )));
        }

        if let Some(speed) = self.speed {
            if !speed.is_finite() {
                return Err(TrackingError::validation(format!(
                    "Invalid sample speed: {}",
                    speed
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::PositionSample;
    use crate::TrackingError;

    #[test]
    fn valid_samples() {
        let t = datetime!(2021-05-24 0:00 UTC);
        assert!(PositionSample::new(-26.31832, -48.8702222, 5.0, t).validate().is_ok());
        // Negative speeds are ignored later, not rejected
        assert!(PositionSample::new(0.0, 0.0, 0.0, t).with_speed(-1.0).validate().is_ok());
    }

    #[test]
    fn malformed_samples() {
        let t = datetime!(2021-05-24 0:00 UTC);
        let samples = [
            PositionSample::new(91.0, 0.0, 5.0, t),
            PositionSample::new(0.0, 181.0, 5.0, t),
            PositionSample::new(f64::NAN, 0.0, 5.0, t),
            PositionSample::new(0.0, 0.0, -1.0, t),
            PositionSample::new(0.0, 0.0, f64::INFINITY, t),
            PositionSample::new(0.0, 0.0, 5.0, t).with_speed(f64::NAN),
        ];

        for s in samples {
            assert!(matches!(s.validate(), Err(TrackingError::Validation(_))), "{:?}", s);
        }
    }
}
