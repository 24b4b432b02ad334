//! CSV file source integration

use std::io::Read;

use csv::{Reader, StringRecord};
use time::format_description::well_known;
use time::OffsetDateTime;
use tracing::debug;

use super::{FieldsConfiguration, PositionsSource};
use crate::{coord, PositionSample, TrackingError};

/// CSV positions source
pub struct CsvSource<T>
where
    T: Read,
{
    rdr: Reader<T>,
    fields: FieldsConfiguration,
}

impl<T> CsvSource<T>
where
    T: Read,
{
    pub fn new(rdr: Reader<T>, fields: Option<FieldsConfiguration>) -> Self {
        Self {
            rdr,
            fields: fields.unwrap_or_default(),
        }
    }
}

impl<T> PositionsSource for CsvSource<T>
where
    T: Read,
{
    fn fetch(&mut self) -> Result<Vec<PositionSample>, TrackingError> {
        let mut pos = vec![];

        let mut header = self
            .rdr
            .headers()
            .map_err(|e| TrackingError::Source(format!("Failed on read the header: {}", e)))?
            .clone();
        let header_idx = parse_header(&self.fields, &mut header)?;

        for row in self.rdr.records() {
            let mut rec =
                row.map_err(|e| TrackingError::Source(format!("Failed on read some row: {}", e)))?;

            if rec.len() < 2 {
                continue;
            }

            let row_pos = parse_row(&header_idx, &self.fields, &mut rec)
                .map_err(|e| TrackingError::Source(format!("Error with row {:?}: {}", rec, e)))?;

            match row_pos {
                Some(sample) => pos.push(sample),
                None => debug!(row = ?rec, "Row without coordinates skipped"),
            }
        }

        pos.sort_by_key(|p| p.time);

        Ok(pos)
    }
}

/// Where the coordinates are
#[derive(Debug)]
enum CoordinatesIndex {
    Split { lat: usize, lng: usize },
    Combined(usize),
}

/// Field to index map
#[derive(Debug)]
struct FieldsIndex {
    coordinates: CoordinatesIndex,
    time: usize,
    accuracy: Option<usize>,
    speed: Option<usize>,
}

fn parse_header(
    fields: &FieldsConfiguration,
    header: &mut StringRecord,
) -> Result<FieldsIndex, TrackingError> {
    header.trim();

    let find = |name: &str| header.iter().position(|h| h.to_lowercase() == name);

    let coordinates = match (find(&fields.lat), find(&fields.lng), find(&fields.coordinates)) {
        (Some(lat), Some(lng), _) => CoordinatesIndex::Split { lat, lng },
        (_, _, Some(c)) => CoordinatesIndex::Combined(c),
        _ => {
            return Err(TrackingError::Source(
                "Coordinates header not found".to_string(),
            ))
        }
    };

    let time = find(&fields.time)
        .ok_or_else(|| TrackingError::Source("Time header not found".to_string()))?;

    Ok(FieldsIndex {
        coordinates,
        time,
        accuracy: find(&fields.accuracy),
        speed: find(&fields.speed),
    })
}

fn parse_row(
    header: &FieldsIndex,
    fields: &FieldsConfiguration,
    row: &mut StringRecord,
) -> Result<Option<PositionSample>, String> {
    row.trim();

    let (lat, lng) = match header.coordinates {
        CoordinatesIndex::Split { lat, lng } => {
            let raw_lat = row.get(lat).unwrap_or_default();
            let raw_lng = row.get(lng).unwrap_or_default();
            if raw_lat.is_empty() || raw_lng.is_empty() {
                return Ok(None);
            }
            (raw_lat.to_string(), raw_lng.to_string())
        }
        CoordinatesIndex::Combined(idx) => {
            let raw = row.get(idx).unwrap_or_default();
            let separator = match raw {
                s if s.contains(',') => ",",
                s if s.contains(';') => ";",
                _ => " ",
            };
            let parts: Vec<String> = raw
                .split(separator)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            if parts.len() != 2 {
                return Ok(None);
            }

            if fields.flip_coordinates {
                (parts[1].clone(), parts[0].clone())
            } else {
                (parts[0].clone(), parts[1].clone())
            }
        }
    };

    let lat = lat
        .parse::<f64>()
        .map_err(|e| format!("Invalid latitude format: {}", e))?;
    let lng = lng
        .parse::<f64>()
        .map_err(|e| format!("Invalid longitude format: {}", e))?;

    let time = match row.get(header.time) {
        Some(d) => parse_time(d),
        None => Err("Time field not found".to_string()),
    }?;

    let mut sample = PositionSample::basic(coord(lat, lng), time);

    if let Some(iacc) = header.accuracy {
        if let Some(acc) = row.get(iacc).and_then(|d| d.parse::<f64>().ok()) {
            sample.accuracy = acc;
        }
    }

    if let Some(ispeed) = header.speed {
        sample.speed = row.get(ispeed).and_then(|d| d.parse::<f64>().ok());
    }

    Ok(Some(sample))
}

/// RFC3339 or unix timestamp in seconds
fn parse_time(raw: &str) -> Result<OffsetDateTime, String> {
    if let Some(secs) = raw.parse::<f64>().ok().filter(|s| s.is_finite()) {
        let nanos = (secs * 1e9) as i128;
        return OffsetDateTime::from_unix_timestamp_nanos(nanos)
            .map_err(|e| format!("Invalid unix time: {}", e));
    }

    OffsetDateTime::parse(raw, &well_known::Rfc3339)
        .map_err(|e| format!("Failed on parse the time: {}", e))
}
