//! Fused walking + bus graph

pub mod components;
pub mod graph;

pub use components::{CityEdge, CityNode, EdgeKind, NodeKind};
pub use graph::CityGraph;
