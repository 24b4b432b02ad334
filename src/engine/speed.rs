//! Smoothed speed estimation over a noisy position feed

use std::collections::VecDeque;

use super::geodesic;
use super::options::TrackingOptions;
use super::position::PositionSample;

/// Movement between two consecutive samples
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MovementRecord {
    pub distance_m: f64,
    pub duration_s: f64,
    pub speed_mps: f64,
}

/// Fixed capacity FIFO of movement records. Pushing on a full window
/// evicts the oldest record.
#[derive(Clone, Debug)]
pub struct MovementHistory {
    records: VecDeque<MovementRecord>,
    capacity: usize,
}

impl MovementHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, record: MovementRecord) {
        if self.records.len() == self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &MovementRecord> {
        self.records.iter()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Total distance over total duration, so short jittery segments
    /// don't weigh as much as long ones
    pub fn weighted_speed(&self) -> Option<f64> {
        let (dist, dur) = self
            .records
            .iter()
            .fold((0.0, 0.0), |(d, t), r| (d + r.distance_m, t + r.duration_s));

        if dur > 0.0 {
            Some(dist / dur)
        } else {
            None
        }
    }
}

pub struct SpeedEstimator {
    history: MovementHistory,
    previous: Option<PositionSample>,
    current: Option<f64>,
    default_speed: f64,
    min_speed: f64,
}

impl SpeedEstimator {
    pub fn new(options: &TrackingOptions) -> Self {
        Self {
            history: MovementHistory::with_capacity(options.history_size),
            previous: None,
            current: None,
            default_speed: options.default_speed_mps,
            min_speed: positive_or(options.min_speed_mps, TrackingOptions::new().min_speed_mps),
        }
    }

    /// Account the movement from the previous sample and return the
    /// new estimate
    pub fn update(&mut self, sample: &PositionSample) -> f64 {
        let mut calculated = None;

        if let Some(prev) = &self.previous {
            let distance = geodesic::distance(&prev.coordinates, &sample.coordinates);
            let duration = (sample.time - prev.time).as_seconds_f64();

            if duration > 0.0 && distance > 0.0 {
                let speed = distance / duration;
                self.history.push(MovementRecord {
                    distance_m: distance,
                    duration_s: duration,
                    speed_mps: speed,
                });
                calculated = Some(speed);
            }
        }

        self.current = match sample.speed {
            Some(s) if s > 0.0 => Some(s),
            _ => calculated,
        };
        self.previous = Some(sample.clone());

        self.estimate()
    }

    /// Smoothed speed in m/s, always positive
    pub fn estimate(&self) -> f64 {
        let speed = self
            .history
            .weighted_speed()
            .or(self.current)
            .unwrap_or(self.default_speed);

        if speed.is_finite() && speed > 0.0 {
            speed
        } else {
            self.min_speed
        }
    }

    /// Instantaneous speed of the last sample: device reported first,
    /// calculated from the last movement otherwise
    pub fn current_speed(&self) -> Option<f64> {
        self.current
    }

    pub fn history(&self) -> &MovementHistory {
        &self.history
    }

    pub fn previous(&self) -> Option<&PositionSample> {
        self.previous.as_ref()
    }

    pub fn reset(&mut self) {
        self.history.clear();
        self.previous = None;
        self.current = None;
    }
}

/// The floor must itself be a usable speed, config files can say otherwise
fn positive_or(speed: f64, fallback: f64) -> f64 {
    if speed.is_finite() && speed > 0.0 {
        speed
    } else {
        fallback
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;
    use time::Duration;

    use super::*;

    fn record(distance_m: f64, duration_s: f64) -> MovementRecord {
        MovementRecord {
            distance_m,
            duration_s,
            speed_mps: distance_m / duration_s,
        }
    }

    #[test]
    fn history_evicts_oldest() {
        let mut h = MovementHistory::with_capacity(3);
        for i in 1..=5 {
            h.push(record(i as f64, 1.0));
        }

        assert_eq!(3, h.len());
        let kept: Vec<f64> = h.iter().map(|r| r.distance_m).collect();
        assert_eq!(vec![3.0, 4.0, 5.0], kept);
    }

    #[test]
    fn weighted_not_mean() {
        let mut h = MovementHistory::with_capacity(10);
        // 1 m in 0.1 s is 10 m/s, 100 m in 100 s is 1 m/s
        h.push(record(1.0, 0.1));
        h.push(record(100.0, 100.0));

        let w = h.weighted_speed().unwrap();
        assert!((w - 101.0 / 100.1).abs() < 1e-9);
        assert!(MovementHistory::with_capacity(2).weighted_speed().is_none());
    }

    #[test]
    fn walking_default() {
        let mut est = SpeedEstimator::new(&TrackingOptions::default());
        let s = PositionSample::new(0.0, 0.0, 5.0, datetime!(2021-05-24 0:00 UTC));
        assert_eq!(1.4, est.update(&s));
        assert!(est.current_speed().is_none());
    }

    #[test]
    fn device_speed_without_history() {
        let mut est = SpeedEstimator::new(&TrackingOptions::default());
        let s = PositionSample::new(0.0, 0.0, 5.0, datetime!(2021-05-24 0:00 UTC)).with_speed(7.5);
        assert_eq!(7.5, est.update(&s));
        assert_eq!(Some(7.5), est.current_speed());
    }

    #[test]
    fn history_wins_over_device_speed() {
        let mut est = SpeedEstimator::new(&TrackingOptions::default());
        let t0 = datetime!(2021-05-24 0:00 UTC);
        est.update(&PositionSample::new(0.0, 0.0, 5.0, t0));

        let t1 = t0 + Duration::seconds(10);
        let s1 = PositionSample::new(0.0, 0.001, 5.0, t1).with_speed(30.0);
        let estimate = est.update(&s1);

        let expected = geodesic::distance(&geodesic::coord(0.0, 0.0), &geodesic::coord(0.0, 0.001)) / 10.0;
        assert!((estimate - expected).abs() < 1e-9);
        assert_eq!(Some(30.0), est.current_speed());
    }

    #[test]
    fn stale_or_still_samples_are_ignored() {
        let mut est = SpeedEstimator::new(&TrackingOptions::default());
        let t0 = datetime!(2021-05-24 0:00 UTC);
        est.update(&PositionSample::new(0.0, 0.0, 5.0, t0));

        // Same time, moved
        est.update(&PositionSample::new(0.0, 0.001, 5.0, t0));
        // Later, not moved
        est.update(&PositionSample::new(0.0, 0.001, 5.0, t0 + Duration::seconds(5)));
        // Older than the previous one
        est.update(&PositionSample::new(0.0, 0.002, 5.0, t0));

        assert!(est.history().is_empty());
        assert_eq!(1.4, est.estimate());
    }

    #[test]
    fn floor_on_non_positive() {
        let mut op = TrackingOptions::default();
        op.default_speed_mps = 0.0;
        let est = SpeedEstimator::new(&op);
        assert_eq!(1.0, est.estimate());
    }

    #[test]
    fn reset_clears_everything() {
        let mut est = SpeedEstimator::new(&TrackingOptions::default());
        let t0 = datetime!(2021-05-24 0:00 UTC);
        est.update(&PositionSample::new(0.0, 0.0, 5.0, t0));
        est.update(&PositionSample::new(0.0, 0.001, 5.0, t0 + Duration::seconds(10)));
        assert_eq!(1, est.history().len());

        est.reset();
        assert!(est.history().is_empty());
        assert!(est.previous().is_none());
        assert!(est.current_speed().is_none());
    }

    #[test]
    fn unusable_floor_falls_back() {
        let t0 = datetime!(2021-05-24 0:00 UTC);

        for floor in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let mut op = TrackingOptions::default();
            op.default_speed_mps = 0.0;
            op.min_speed_mps = floor;

            let mut est = SpeedEstimator::new(&op);
            assert_eq!(1.0, est.update(&PositionSample::new(0.0, 0.0, 5.0, t0)));
        }
    }
}
