//! Tracking configuration

use serde::Deserialize;

/// Knobs of a tracking session. Every field falls back to its default
/// when missing from the config file.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct TrackingOptions {
    /// Distance from the nearest route vertex, in meters, above which
    /// the position is reported as off-route
    pub off_route_threshold_m: f64,
    /// Movement records kept for the smoothed speed
    pub history_size: usize,
    /// Speed assumed before any movement is observed (walking pace)
    pub default_speed_mps: f64,
    /// Floor applied when the estimate is not positive
    pub min_speed_mps: f64,
}

impl TrackingOptions {
    pub fn new() -> Self {
        Self {
            off_route_threshold_m: 50.0,
            history_size: 10,
            default_speed_mps: 1.4,
            min_speed_mps: 1.0,
        }
    }

    pub fn off_route_threshold(&mut self, meters: f64) -> &mut Self {
        self.off_route_threshold_m = if meters.is_finite() && meters >= 0.0 {
            meters
        } else {
            0.0
        };

        self
    }

    pub fn history_size(&mut self, size: usize) -> &mut Self {
        self.history_size = size.max(1);

        self
    }
}

impl Default for TrackingOptions {
    fn default() -> Self {
        Self::new()
    }
}
