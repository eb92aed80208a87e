use thiserror::Error;

use crate::{Meters, NodeId};

#[derive(Error, Debug)]
pub enum Error {
    #[error(
        "Stop {stop} is {distance:.1} m from the nearest intersection (max {max_distance:.1} m)"
    )]
    SpatialJoin {
        stop: NodeId,
        distance: Meters,
        max_distance: Meters,
    },
    #[error("No intersection within {max_distance:.1} m of ({lat}, {lon})")]
    OutOfBounds {
        lat: f64,
        lon: f64,
        distance: Option<Meters>,
        max_distance: Meters,
    },
    #[error("No path between nodes {from} and {to}")]
    NoPath { from: NodeId, to: NodeId },
    #[error("Payload is not a valid {expected}: {reason}")]
    SerializationType {
        expected: &'static str,
        reason: String,
    },
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("GeoJSON error: {0}")]
    GeoJsonError(String),
}
