//! Encoded polyline codec, 5 decimal precision
//!
//! Each coordinate is stored as the delta from the previous one, in
//! zig-zag signed varints of 5 bits per printable character.

use super::geodesic::{coord, Coordinate};

const PRECISION: f64 = 1e5;

/// Decode a polyline string into its coordinates.
///
/// Malformed input yields an empty sequence: callers treat "no geometry"
/// as a recoverable condition, never as a panic.
pub fn decode(encoded: &str) -> Vec<Coordinate> {
    let bytes = encoded.as_bytes();
    let mut points = vec![];
    let mut idx = 0;
    let mut lat = 0i64;
    let mut lng = 0i64;

    while idx < bytes.len() {
        let dlat = match next_value(bytes, &mut idx) {
            Some(v) => v,
            None => return vec![],
        };
        // A latitude without its longitude is a truncated string
        let dlng = match next_value(bytes, &mut idx) {
            Some(v) => v,
            None => return vec![],
        };

        // Legal characters can still add up past the i64 range
        lat = match lat.checked_add(dlat) {
            Some(v) => v,
            None => return vec![],
        };
        lng = match lng.checked_add(dlng) {
            Some(v) => v,
            None => return vec![],
        };

        points.push(coord(lat as f64 / PRECISION, lng as f64 / PRECISION));
    }

    points
}

/// Encode coordinates into a polyline string
pub fn encode(points: &[Coordinate]) -> String {
    let mut out = String::new();
    let mut prev_lat = 0i64;
    let mut prev_lng = 0i64;

    for p in points {
        let lat = (p.y() * PRECISION).round() as i64;
        let lng = (p.x() * PRECISION).round() as i64;

        push_value(&mut out, lat - prev_lat);
        push_value(&mut out, lng - prev_lng);

        prev_lat = lat;
        prev_lng = lng;
    }

    out
}

/// Read one zig-zag varint starting at `idx`
fn next_value(bytes: &[u8], idx: &mut usize) -> Option<i64> {
    let mut result = 0i64;
    let mut shift = 0u32;

    loop {
        let byte = *bytes.get(*idx)?;
        *idx += 1;

        if !(63..=126).contains(&byte) || shift > 60 {
            return None;
        }

        let chunk = (byte - 63) as i64;
        result |= (chunk & 0x1f) << shift;
        shift += 5;

        if chunk < 0x20 {
            break;
        }
    }

    if result & 1 == 1 {
        Some(!(result >> 1))
    } else {
        Some(result >> 1)
    }
}

fn push_value(out: &mut String, value: i64) {
    let mut v = if value < 0 { !(value << 1) } else { value << 1 };

    while v >= 0x20 {
        out.push(char::from((0x20 | (v & 0x1f)) as u8 + 63));
        v >>= 5;
    }
    out.push(char::from(v as u8 + 63));
}

#[cfg(test)]
mod tests {
    use super::*;

    const CANONICAL: &str = "_p~iF~ps|U_ulLnnqC_mqNvxq`@";

    fn assert_close(expected: (f64, f64), got: &Coordinate) {
        assert!((expected.0 - got.y()).abs() < 1e-5, "lat {} != {}", expected.0, got.y());
        assert!((expected.1 - got.x()).abs() < 1e-5, "lng {} != {}", expected.1, got.x());
    }

    #[test]
    fn canonical_example() {
        let points = decode(CANONICAL);
        assert_eq!(3, points.len());
        assert_close((38.5, -120.2), &points[0]);
        assert_close((40.7, -120.95), &points[1]);
        assert_close((43.252, -126.453), &points[2]);
    }

    #[test]
    fn encode_canonical() {
        let points = vec![
            coord(38.5, -120.2),
            coord(40.7, -120.95),
            coord(43.252, -126.453),
        ];
        assert_eq!(CANONICAL, encode(&points));
    }

    #[test]
    fn round_trip_within_quantization() {
        let points = vec![
            coord(-26.31832, -48.8702222),
            coord(-26.3185919, -48.8619776),
            coord(-26.3185861, -48.8619871),
            coord(0.0, 0.0),
            coord(89.99999, -179.99999),
        ];

        let decoded = decode(&encode(&points));
        assert_eq!(points.len(), decoded.len());
        for (p, d) in points.iter().zip(decoded.iter()) {
            assert!((p.y() - d.y()).abs() <= 0.5e-5 + 1e-12);
            assert!((p.x() - d.x()).abs() <= 0.5e-5 + 1e-12);
        }
    }

    #[test]
    fn pure_and_restartable() {
        assert_eq!(decode(CANONICAL), decode(CANONICAL));
    }

    #[test]
    fn empty_and_invalid() {
        assert!(decode("").is_empty());
        // Lone latitude
        assert!(decode("_p~iF").is_empty());
        // Truncated varint
        assert!(decode("_p~iF~ps|").is_empty());
        // Below the printable range
        assert!(decode("_p~iF ps|U").is_empty());
        assert!(decode("héllo").is_empty());
        // Longest varints, summing past i64::MAX
        let huge = format!("}}{}F", "~".repeat(11)).repeat(6);
        assert!(decode(&huge).is_empty());
        assert_eq!("", encode(&[]));
    }
}
