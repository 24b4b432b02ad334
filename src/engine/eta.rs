//! Remaining time and arrival estimation

use time::{Duration, OffsetDateTime, PrimitiveDateTime};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Eta {
    pub remaining_time_s: f64,
    pub estimated_arrival: OffsetDateTime,
    /// Speed used for the estimate, 0 once the trip is complete
    pub speed_mps: f64,
}

/// Estimate the arrival from `now`. `speed_mps` must be positive, which
/// the speed estimator guarantees.
///
/// A crawling speed can put the arrival beyond the last representable
/// date, the arrival is then capped at that date.
pub fn estimate(remaining_m: f64, speed_mps: f64, now: OffsetDateTime) -> Eta {
    if remaining_m <= 0.0 {
        return Eta {
            remaining_time_s: 0.0,
            estimated_arrival: now,
            speed_mps: 0.0,
        };
    }

    debug_assert!(speed_mps > 0.0);

    let remaining_time_s = remaining_m / speed_mps;

    let estimated_arrival = Duration::checked_seconds_f64(remaining_time_s)
        .and_then(|d| now.checked_add(d))
        .unwrap_or_else(|| PrimitiveDateTime::MAX.assume_utc());

    Eta {
        remaining_time_s,
        estimated_arrival,
        speed_mps,
    }
}
