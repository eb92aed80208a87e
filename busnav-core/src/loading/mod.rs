//! This module is responsible for loading the street and bus networks and
//! fusing them into a single city graph.

mod builder;
mod config;
pub mod csv;

pub use builder::{build_city_graph, create_city_graph};
pub use config::{
    CityGraphConfig, DEFAULT_BOARDING_PENALTY, DEFAULT_BUS_SPEED, DEFAULT_MAX_SNAP_DISTANCE,
    DEFAULT_WALKING_SPEED, NetworkSources,
};
