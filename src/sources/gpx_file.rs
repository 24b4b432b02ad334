//! GPX track source integration

use std::io::Read;

use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::debug;

use super::PositionsSource;
use crate::{PositionSample, TrackingError};

/// Meters of horizontal error per unit of HDOP
const HDOP_TO_METERS: f64 = 5.0;

/// Recorded GPX track points as positions source
pub struct GpxSource<T>
where
    T: Read,
{
    reader: Option<T>,
}

impl<T> GpxSource<T>
where
    T: Read,
{
    pub fn new(reader: T) -> Self {
        Self {
            reader: Some(reader),
        }
    }
}

impl<T> PositionsSource for GpxSource<T>
where
    T: Read,
{
    fn fetch(&mut self) -> Result<Vec<PositionSample>, TrackingError> {
        let reader = self
            .reader
            .take()
            .ok_or_else(|| TrackingError::Source("GPX already consumed".to_string()))?;

        let doc = gpx::read(reader)
            .map_err(|e| TrackingError::Source(format!("Failed on read the GPX: {}", e)))?;

        let mut pos = vec![];

        for trk in doc.tracks {
            for seg in trk.segments {
                for wp in seg.points {
                    let time = match wp.time.as_ref().and_then(to_offset_date_time) {
                        Some(t) => t,
                        None => {
                            debug!("Track point without time skipped");
                            continue;
                        }
                    };

                    pos.push(PositionSample {
                        coordinates: wp.point(),
                        time,
                        accuracy: wp.hdop.map(|h| h * HDOP_TO_METERS).unwrap_or(0.0),
                        speed: wp.speed,
                    });
                }
            }
        }

        pos.sort_by_key(|p| p.time);

        Ok(pos)
    }
}

/// `gpx::Time` only converts from `OffsetDateTime`, the way back is
/// through its RFC3339 form
fn to_offset_date_time(t: &gpx::Time) -> Option<OffsetDateTime> {
    let raw = t.format().ok()?;

    OffsetDateTime::parse(&raw, &Rfc3339).ok()
}
