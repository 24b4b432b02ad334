//! Drive a session over a recorded positions stream

use std::sync::Arc;

use time::OffsetDateTime;
use tracing::{debug, warn};

use super::error::TrackingError;
use super::position::PositionSample;
use super::session::TrackingSession;
use super::snapshot::ProgressSnapshot;

/// Default replay of recorded positions
pub struct Replay {}

impl Replay {
    /// Feed the samples in order and collect the snapshots.
    ///
    /// Samples not newer than the last accepted one are skipped, and so
    /// are malformed ones. Any other error ends the replay.
    pub fn run<I>(
        session: &mut TrackingSession,
        samples: I,
    ) -> Result<Vec<Arc<ProgressSnapshot>>, TrackingError>
    where
        I: IntoIterator<Item = PositionSample>,
    {
        let mut snapshots = vec![];
        let mut last: Option<OffsetDateTime> = None;

        for sample in samples {
            if let Some(t) = last {
                if sample.time <= t {
                    debug!(time = %sample.time, "Out of order sample skipped");
                    continue;
                }
            }

            match session.on_sample(&sample) {
                Ok(snap) => {
                    last = Some(sample.time);
                    snapshots.push(snap);
                }
                Err(TrackingError::Validation(e)) => {
                    warn!(error = %e, "Malformed sample skipped");
                }
                Err(e) => return Err(e),
            }
        }

        Ok(snapshots)
    }
}
