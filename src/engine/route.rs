//! Route geometry and its accepted shapes
//!
//! Route providers hand out the geometry in several layouts: a raw
//! encoded polyline, a directions object with an overview polyline, or
//! one polyline per step. They are all resolved once, when tracking
//! starts, into a single [`Route`].

use serde::Deserialize;

use super::error::TrackingError;
use super::geodesic::{self, Coordinate};
use super::polyline;

/// The route geometry, as found in the route object
#[derive(Clone, Debug, PartialEq)]
pub enum RouteGeometry {
    /// A raw encoded polyline
    Encoded(String),
    /// `overview_polyline.points` of a directions route
    Overview(String),
    /// Per-step polylines, concatenated in order
    Steps(Vec<String>),
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct EncodedPoints {
    #[serde(default)]
    pub points: String,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct RouteStep {
    #[serde(default)]
    pub polyline: Option<EncodedPoints>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct RouteLeg {
    #[serde(default)]
    pub steps: Vec<RouteStep>,
}

/// A directions route object. Unknown fields (summary, bounds,
/// emissions...) are ignored.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RouteObject {
    pub polyline: Option<String>,
    pub overview_polyline: Option<EncodedPoints>,
    pub legs: Vec<RouteLeg>,
    pub steps: Vec<RouteStep>,
}

/// What the route source hands to the engine
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RouteSource {
    Encoded(String),
    Object(RouteObject),
}

impl RouteSource {
    /// Parse a route file: a raw encoded polyline, or JSON (a route
    /// object or a quoted polyline).
    pub fn parse(text: &str) -> Result<Self, TrackingError> {
        let text = text.trim();

        // Polyline characters never include quotes, colons or spaces
        if !text.is_empty() && text.bytes().all(|b| (63..=126).contains(&b)) {
            return Ok(Self::Encoded(text.to_string()));
        }

        serde_json::from_str(text)
            .map_err(|e| TrackingError::validation(format!("Invalid route object: {}", e)))
    }

    /// Pick the geometry of the route. Priority: raw polyline,
    /// overview polyline, then the step polylines.
    pub fn geometry(&self) -> Result<RouteGeometry, TrackingError> {
        let obj = match self {
            Self::Encoded(s) if !s.trim().is_empty() => {
                return Ok(RouteGeometry::Encoded(s.trim().to_string()))
            }
            Self::Encoded(_) => return Err(TrackingError::validation("Empty route polyline")),
            Self::Object(obj) => obj,
        };

        if let Some(raw) = obj.polyline.as_ref().filter(|s| !s.trim().is_empty()) {
            return Ok(RouteGeometry::Encoded(raw.trim().to_string()));
        }

        if let Some(ov) = obj.overview_polyline.as_ref().filter(|o| !o.points.is_empty()) {
            return Ok(RouteGeometry::Overview(ov.points.clone()));
        }

        let steps: Vec<String> = obj
            .legs
            .iter()
            .flat_map(|leg| leg.steps.iter())
            .chain(obj.steps.iter())
            .filter_map(|st| st.polyline.as_ref())
            .filter(|p| !p.points.is_empty())
            .map(|p| p.points.clone())
            .collect();

        if !steps.is_empty() {
            return Ok(RouteGeometry::Steps(steps));
        }

        Err(TrackingError::validation(
            "Route has no polyline in any recognized field",
        ))
    }
}

impl From<&str> for RouteSource {
    fn from(encoded: &str) -> Self {
        Self::Encoded(encoded.to_string())
    }
}

impl RouteGeometry {
    /// Decode the geometry into the canonical route
    pub fn resolve(&self) -> Result<Route, TrackingError> {
        let points = match self {
            Self::Encoded(s) | Self::Overview(s) => polyline::decode(s),
            Self::Steps(steps) => {
                let mut points: Vec<Coordinate> = vec![];
                for st in steps {
                    for p in polyline::decode(st) {
                        // Steps share their joining vertex
                        if points.last() != Some(&p) {
                            points.push(p);
                        }
                    }
                }
                points
            }
        };

        Route::from_points(points)
    }
}

/// The immutable route geometry of a tracking session
#[derive(Clone, Debug, PartialEq)]
pub struct Route {
    points: Vec<Coordinate>,
    /// Distance from the first vertex to each vertex
    cumulative: Vec<f64>,
}

impl Route {
    pub fn from_points(points: Vec<Coordinate>) -> Result<Self, TrackingError> {
        if points.is_empty() {
            return Err(TrackingError::validation("Route geometry has no points"));
        }

        if let Some(bad) = points.iter().find(|p| !geodesic::is_valid(p)) {
            return Err(TrackingError::validation(format!(
                "Route point out of range: lat {}, lng {}",
                bad.y(),
                bad.x()
            )));
        }

        let mut cumulative = Vec::with_capacity(points.len());
        let mut acc = 0.0;
        cumulative.push(acc);
        for w in points.windows(2) {
            acc += geodesic::distance(&w[0], &w[1]);
            cumulative.push(acc);
        }

        Ok(Self { points, cumulative })
    }

    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }

    pub fn vertex_count(&self) -> usize {
        self.points.len()
    }

    pub fn first(&self) -> &Coordinate {
        &self.points[0]
    }

    pub fn last(&self) -> &Coordinate {
        &self.points[self.points.len() - 1]
    }

    /// Length of the whole route in meters
    pub fn total_distance(&self) -> f64 {
        self.cumulative[self.cumulative.len() - 1]
    }

    /// Distance along the route from the first vertex to `index`
    pub fn distance_to(&self, index: usize) -> f64 {
        let idx = index.min(self.cumulative.len() - 1);
        self.cumulative[idx]
    }

    /// Single vertex or zero length: progress can't be measured
    pub fn is_degenerate(&self) -> bool {
        self.points.len() < 2 || self.total_distance() <= 0.0
    }
}
