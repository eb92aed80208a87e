//! Walking + bus route planning over a fused street/transit graph.
//!
//! The crate takes an independently sourced street network and bus network,
//! fuses them into a single time-weighted [`CityGraph`], answers minimum-time
//! queries between two coordinates and narrates the resulting path as a list
//! of walking, boarding and transfer instructions.

pub mod error;
pub mod loading;
pub mod model;
pub mod persistence;
pub mod planner;
pub mod prelude;
pub mod render;
pub mod routing;

#[cfg(test)]
mod test_helpers;

pub use error::Error;
pub use loading::{CityGraphConfig, build_city_graph};
pub use model::{CityEdge, CityGraph, CityNode, StreetGraph, TransitGraph};
pub use planner::{RoutePlan, RoutePlanner};
pub use routing::{Highlight, Instruction, Narration, Path, RoutingConfig, find_path, narrate};

/// Node identifier, unique within a fused graph
pub type NodeId = u64;

/// Bus line identifier, ordered lexicographically
pub type LineId = String;

/// Travel time in seconds
pub type Seconds = f64;

/// Distance in meters
pub type Meters = f64;
