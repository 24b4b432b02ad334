//! Geodesic math over latitude/longitude pairs

use geo::{HaversineBearing, Point};

/// Mean earth radius used by the haversine formula, in meters
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A position in degrees. `x` is the longitude and `y` the latitude,
/// following the `geo` convention.
pub type Coordinate = Point<f64>;

/// Build a coordinate from the latitude and longitude, in this order
pub fn coord(lat: f64, lng: f64) -> Coordinate {
    Point::new(lng, lat)
}

/// Great-circle distance in meters between two coordinates
pub fn distance(a: &Coordinate, b: &Coordinate) -> f64 {
    let lat1 = a.y().to_radians();
    let lat2 = b.y().to_radians();
    let dlat = (b.y() - a.y()).to_radians();
    let dlng = (b.x() - a.x()).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);

    // Rounding can push `h` slightly over 1 for antipodal points
    2.0 * EARTH_RADIUS_M * h.sqrt().min(1.0).asin()
}

/// Initial compass bearing from `a` to `b`, in degrees within [0, 360)
pub fn bearing(a: &Coordinate, b: &Coordinate) -> f64 {
    let deg = a.haversine_bearing(*b).rem_euclid(360.0);

    // rem_euclid may round -0.0000...1 up to 360.0
    if deg >= 360.0 {
        0.0
    } else {
        deg
    }
}

/// Sum of the distances between consecutive coordinates
pub fn path_length(points: &[Coordinate]) -> f64 {
    points.windows(2).map(|w| distance(&w[0], &w[1])).sum()
}

/// Finite and within the latitude/longitude ranges
pub fn is_valid(c: &Coordinate) -> bool {
    c.x().is_finite()
        && c.y().is_finite()
        && (-90.0..=90.0).contains(&c.y())
        && (-180.0..=180.0).contains(&c.x())
}
