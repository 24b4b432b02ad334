//! Route progress tracking engine

pub mod error;
pub mod eta;
pub mod geodesic;
pub mod options;
pub mod polyline;
pub mod position;
pub mod projector;
pub mod replay;
pub mod route;
pub mod session;
pub mod snapshot;
pub mod speed;
