//! Position to route projection
//!
//! The projection snaps to the nearest route *vertex*, not to the nearest
//! point of a segment. On dense polylines a noisy fix may snap back to an
//! earlier vertex, so the progress is not guaranteed to be monotonic.

use super::geodesic::{self, Coordinate};
use super::route::Route;

/// Where a position lands on the route
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    pub closest_point_index: usize,
    pub distance_to_route_m: f64,
}

/// Distances along the route for a projection
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RouteProgress {
    pub total_m: f64,
    pub traveled_m: f64,
    pub remaining_m: f64,
    /// Within [0, 100]
    pub percentage: f64,
}

/// Find the route vertex closest to `position`. Ties keep the lowest index.
pub fn project(route: &Route, position: &Coordinate) -> Projection {
    let mut best = Projection {
        closest_point_index: 0,
        distance_to_route_m: geodesic::distance(position, route.first()),
    };

    for (idx, vertex) in route.points().iter().enumerate().skip(1) {
        let d = geodesic::distance(position, vertex);
        if d < best.distance_to_route_m {
            best = Projection {
                closest_point_index: idx,
                distance_to_route_m: d,
            };
        }
    }

    best
}

/// Traveled and remaining distances for a projection
pub fn progress(route: &Route, projection: &Projection) -> RouteProgress {
    let total_m = route.total_distance();
    let traveled_m = route.distance_to(projection.closest_point_index).min(total_m);
    let remaining_m = (total_m - traveled_m).max(0.0);

    let percentage = if total_m > 0.0 {
        (traveled_m / total_m * 100.0).clamp(0.0, 100.0)
    } else {
        0.0
    };

    RouteProgress {
        total_m,
        traveled_m,
        remaining_m,
        percentage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::geodesic::coord;

    fn straight() -> Route {
        // ~111 m between vertices, heading east along the equator
        Route::from_points(vec![
            coord(0.0, 0.0),
            coord(0.0, 0.001),
            coord(0.0, 0.002),
            coord(0.0, 0.003),
        ])
        .unwrap()
    }

    #[test]
    fn on_vertices() {
        let route = straight();

        for (idx, p) in route.points().iter().enumerate() {
            let pr = project(&route, p);
            assert_eq!(idx, pr.closest_point_index);
            assert_eq!(0.0, pr.distance_to_route_m);
        }
    }

    #[test]
    fn nearest_vertex_between() {
        let route = straight();

        // Closer to the vertex 2, slightly north of the path
        let pr = project(&route, &coord(0.0001, 0.0017));
        assert_eq!(2, pr.closest_point_index);
        assert!(pr.distance_to_route_m > 0.0);
    }

    #[test]
    fn ties_keep_first() -> Result<(), String> {
        let route = Route::from_points(vec![coord(0.0, -0.001), coord(0.0, 0.001)])
            .map_err(|e| e.to_string())?;
        let pr = project(&route, &coord(0.0, 0.0));
        assert_eq!(0, pr.closest_point_index);

        Ok(())
    }

    #[test]
    fn progress_boundaries() {
        let route = straight();

        let start = progress(&route, &project(&route, route.first()));
        assert_eq!(0.0, start.traveled_m);
        assert_eq!(0.0, start.percentage);
        assert_eq!(route.total_distance(), start.remaining_m);

        let end = progress(&route, &project(&route, route.last()));
        assert_eq!(100.0, end.percentage);
        assert_eq!(0.0, end.remaining_m);
        assert_eq!(route.total_distance(), end.traveled_m);
    }

    #[test]
    fn progress_middle() {
        let route = straight();
        let pr = progress(&route, &project(&route, &coord(0.0, 0.001)));
        assert!((pr.percentage - 100.0 / 3.0).abs() < 0.01);
        assert!((pr.traveled_m + pr.remaining_m - pr.total_m).abs() < 1e-6);
    }

    #[test]
    fn far_off_positions_stay_clamped() {
        let route = straight();
        let positions = [
            coord(45.0, 90.0),
            coord(-89.0, -179.0),
            coord(0.0, -10.0),
            coord(0.0, 10.0),
        ];

        for p in positions {
            let pr = progress(&route, &project(&route, &p));
            assert!((0.0..=100.0).contains(&pr.percentage));
            assert!(pr.remaining_m >= 0.0);
        }
    }

    #[test]
    fn single_vertex() -> Result<(), String> {
        let route = Route::from_points(vec![coord(10.0, 10.0)]).map_err(|e| e.to_string())?;
        let pos = coord(10.0, 10.001);

        let pr = project(&route, &pos);
        assert_eq!(0, pr.closest_point_index);
        assert_eq!(geodesic::distance(&pos, route.first()), pr.distance_to_route_m);

        let prog = progress(&route, &pr);
        assert_eq!(0.0, prog.percentage);
        assert_eq!(0.0, prog.remaining_m);
        assert_eq!(0.0, prog.traveled_m);

        Ok(())
    }
}
