//! Tracking session: lifecycle and per-sample orchestration

use std::sync::{Arc, RwLock};

use tracing::{debug, info, warn};

use super::error::{SensorError, TrackingError};
use super::eta;
use super::geodesic;
use super::options::TrackingOptions;
use super::position::PositionSample;
use super::projector;
use super::route::{Route, RouteSource};
use super::snapshot::ProgressSnapshot;
use super::speed::SpeedEstimator;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Tracking,
    Stopped,
}

/// Handle of the position feed feeding the session, eg.: a geolocation
/// watch. The session cancels it once, when tracking ends.
pub trait PositionSubscription: Send {
    fn cancel(&mut self);
}

type SharedSnapshot = Arc<RwLock<Option<Arc<ProgressSnapshot>>>>;

/// Read side of the session snapshot, for other threads.
///
/// Snapshots are swapped whole, a reader never sees a partial update.
#[derive(Clone, Default)]
pub struct SnapshotWatch {
    inner: SharedSnapshot,
}

impl SnapshotWatch {
    pub fn latest(&self) -> Option<Arc<ProgressSnapshot>> {
        match self.inner.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn publish(&self, snapshot: Option<Arc<ProgressSnapshot>>) {
        match self.inner.write() {
            Ok(mut guard) => *guard = snapshot,
            Err(poisoned) => *poisoned.into_inner() = snapshot,
        }
    }
}

/// Progress tracking of one trip
pub struct TrackingSession {
    options: TrackingOptions,
    state: SessionState,
    route: Option<Route>,
    speed: SpeedEstimator,
    snapshot: Option<Arc<ProgressSnapshot>>,
    watch: SnapshotWatch,
    subscription: Option<Box<dyn PositionSubscription>>,
}

impl TrackingSession {
    pub fn new(options: TrackingOptions) -> Self {
        let speed = SpeedEstimator::new(&options);

        Self {
            options,
            state: SessionState::Idle,
            route: None,
            speed,
            snapshot: None,
            watch: SnapshotWatch::default(),
            subscription: None,
        }
    }

    /// Start tracking the route. On failure the session keeps its
    /// previous state.
    pub fn start(&mut self, source: &RouteSource) -> Result<(), TrackingError> {
        if self.state == SessionState::Tracking {
            return Err(TrackingError::AlreadyTracking);
        }

        let route = match source.geometry().and_then(|g| g.resolve()) {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "Route rejected");
                return Err(e);
            }
        };

        if route.is_degenerate() {
            warn!(
                vertices = route.vertex_count(),
                "Degenerate route, progress will stay at its defaults"
            );
        }

        info!(
            vertices = route.vertex_count(),
            total_distance_m = route.total_distance(),
            "Tracking started"
        );

        self.speed.reset();
        self.set_snapshot(None);
        self.route = Some(route);
        self.state = SessionState::Tracking;

        Ok(())
    }

    /// Start tracking and take ownership of the position feed handle.
    /// The handle is cancelled right away if the route is rejected.
    pub fn start_with_subscription(
        &mut self,
        source: &RouteSource,
        mut subscription: Box<dyn PositionSubscription>,
    ) -> Result<(), TrackingError> {
        if let Err(e) = self.start(source) {
            subscription.cancel();
            return Err(e);
        }

        if let Some(mut old) = self.subscription.replace(subscription) {
            old.cancel();
        }

        Ok(())
    }

    /// Process one position sample and publish the new snapshot
    pub fn on_sample(
        &mut self,
        sample: &PositionSample,
    ) -> Result<Arc<ProgressSnapshot>, TrackingError> {
        if self.state != SessionState::Tracking {
            return Err(TrackingError::NotTracking);
        }
        sample.validate()?;

        let route = self.route.as_ref().ok_or(TrackingError::NotTracking)?;

        let projection = projector::project(route, &sample.coordinates);
        let progress = projector::progress(route, &projection);
        let speed = self.speed.update(sample);
        let eta = eta::estimate(progress.remaining_m, speed, sample.time);

        let bearing_deg = route
            .points()
            .get(projection.closest_point_index + 1)
            .map(|next| geodesic::bearing(&sample.coordinates, next));

        let is_off_route = projection.distance_to_route_m > self.options.off_route_threshold_m;
        let was_off_route = self.snapshot.as_ref().map(|s| s.is_off_route).unwrap_or(false);
        if is_off_route && !was_off_route {
            warn!(
                distance_to_route_m = projection.distance_to_route_m,
                threshold_m = self.options.off_route_threshold_m,
                "Position is off the route"
            );
        } else if !is_off_route && was_off_route {
            info!("Position is back on the route");
        }

        let snapshot = Arc::new(ProgressSnapshot {
            timestamp: sample.time,
            progress_percentage: progress.percentage,
            total_distance_m: progress.total_m,
            traveled_distance_m: progress.traveled_m,
            remaining_distance_m: progress.remaining_m,
            remaining_time_s: eta.remaining_time_s,
            estimated_arrival: eta.estimated_arrival,
            closest_point_index: projection.closest_point_index,
            distance_to_route_m: projection.distance_to_route_m,
            estimated_speed_mps: eta.speed_mps,
            is_off_route,
            bearing_deg,
        });

        debug!(
            index = snapshot.closest_point_index,
            progress = snapshot.progress_percentage,
            remaining_m = snapshot.remaining_distance_m,
            speed_mps = snapshot.estimated_speed_mps,
            "Sample processed"
        );

        self.set_snapshot(Some(snapshot.clone()));

        Ok(snapshot)
    }

    /// The position feed failed. Tracking stops and the error is handed
    /// back for the caller to surface.
    pub fn on_sensor_error(&mut self, error: SensorError) -> TrackingError {
        warn!(error = %error, "Position source failed, stopping");
        self.stop();

        TrackingError::Sensor(error)
    }

    /// Stop tracking and drop the session data. Safe to call at any time.
    pub fn stop(&mut self) {
        if let Some(mut sub) = self.subscription.take() {
            sub.cancel();
        }

        if self.state == SessionState::Tracking {
            info!("Tracking stopped");
        }

        self.speed.reset();
        self.route = None;
        self.set_snapshot(None);
        self.state = SessionState::Stopped;
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Last published snapshot
    pub fn snapshot(&self) -> Option<Arc<ProgressSnapshot>> {
        self.snapshot.clone()
    }

    pub fn route(&self) -> Option<&Route> {
        self.route.as_ref()
    }

    pub fn options(&self) -> &TrackingOptions {
        &self.options
    }

    pub fn speed(&self) -> &SpeedEstimator {
        &self.speed
    }

    /// A reader of the snapshots, usable from other threads
    pub fn watch(&self) -> SnapshotWatch {
        self.watch.clone()
    }

    fn set_snapshot(&mut self, snapshot: Option<Arc<ProgressSnapshot>>) {
        self.watch.publish(snapshot.clone());
        self.snapshot = snapshot;
    }
}

impl Default for TrackingSession {
    fn default() -> Self {
        Self::new(TrackingOptions::default())
    }
}

impl Drop for TrackingSession {
    fn drop(&mut self) {
        if let Some(mut sub) = self.subscription.take() {
            sub.cancel();
        }
    }
}
