//! Error types of the tracking engine

use thiserror::Error;

/// Conditions reported by the upstream position source
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum SensorError {
    /// The user or the OS refused access to the location
    #[error("Location permission denied")]
    PermissionDenied,

    /// No fix arrived in time
    #[error("Timed out waiting for a position")]
    Timeout,

    /// The positioning hardware is unavailable
    #[error("Position unavailable")]
    Unavailable,
}

/// Errors surfaced by the tracking session and its collaborators
#[derive(Clone, Debug, PartialEq, Error)]
pub enum TrackingError {
    /// Route without usable geometry or malformed position sample
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Fatal condition reported by the position source. Tracking is stopped.
    #[error("Sensor failure: {0}")]
    Sensor(#[from] SensorError),

    /// A sample arrived while no trip is being tracked
    #[error("Tracking is not active")]
    NotTracking,

    /// `start` called on a session that is already tracking
    #[error("Tracking already started")]
    AlreadyTracking,

    /// Failed on read the positions from a source
    #[error("Positions source failed: {0}")]
    Source(String),
}

impl TrackingError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
