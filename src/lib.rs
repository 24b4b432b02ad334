//! routeprogress - live trip progress over a pre-computed route

mod engine;
pub mod sources;

pub use engine::error::{SensorError, TrackingError};
pub use engine::eta::Eta;
pub use engine::geodesic::{self, coord, Coordinate};
pub use engine::options::TrackingOptions;
pub use engine::polyline;
pub use engine::position::PositionSample;
pub use engine::projector::{self, Projection, RouteProgress};
pub use engine::replay::Replay;
pub use engine::route::{Route, RouteGeometry, RouteObject, RouteSource};
pub use engine::session::{PositionSubscription, SessionState, SnapshotWatch, TrackingSession};
pub use engine::snapshot::ProgressSnapshot;
pub use engine::speed::{MovementHistory, MovementRecord, SpeedEstimator};
pub use sources::PositionsSource;
