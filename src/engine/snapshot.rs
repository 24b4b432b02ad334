//! Trip progress snapshot

use serde::Serialize;
use time::OffsetDateTime;

/// Progress of the trip at one position sample. Built whole for every
/// accepted sample.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProgressSnapshot {
    /// Time of the sample the snapshot was computed from
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    /// Within [0, 100]
    pub progress_percentage: f64,
    pub total_distance_m: f64,
    pub traveled_distance_m: f64,
    pub remaining_distance_m: f64,
    pub remaining_time_s: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub estimated_arrival: OffsetDateTime,
    pub closest_point_index: usize,
    pub distance_to_route_m: f64,
    pub estimated_speed_mps: f64,
    pub is_off_route: bool,
    /// Direction from the position to the next route vertex, for display
    pub bearing_deg: Option<f64>,
}

impl ProgressSnapshot {
    pub fn is_complete(&self) -> bool {
        self.remaining_distance_m <= 0.0
    }
}
