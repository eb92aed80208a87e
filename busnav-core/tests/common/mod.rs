#![allow(dead_code)]

use std::path::PathBuf;

use busnav_core::loading::NetworkSources;
use busnav_core::{CityGraph, CityGraphConfig, loading::create_city_graph};
use geo::Point;

pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data")
}

pub fn sources() -> NetworkSources {
    let dir = fixtures_dir();
    NetworkSources {
        street_nodes: dir.join("street_nodes.csv"),
        street_edges: dir.join("street_edges.csv"),
        stops: dir.join("stops.csv"),
        line_stops: dir.join("line_stops.csv"),
    }
}

pub fn town() -> CityGraph {
    create_city_graph(&sources(), &CityGraphConfig::default()).expect("fixture town builds")
}

/// Coordinates of a fixture intersection
pub fn corner(city: &CityGraph, id: u64) -> Point<f64> {
    city.node(id).expect("fixture node exists").geometry()
}
