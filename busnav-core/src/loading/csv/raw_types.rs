use serde::Deserialize;

use crate::{Meters, NodeId};

#[derive(Debug, Clone, Deserialize)]
pub struct RawStreetNode {
    pub node_id: NodeId,
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawStreetEdge {
    pub from: NodeId,
    pub to: NodeId,
    pub length: Meters,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawStop {
    pub stop_id: NodeId,
    #[serde(default)]
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

/// One stop of a bus line, ordered by `sequence` within the line
#[derive(Debug, Clone, Deserialize)]
pub struct RawLineStop {
    pub line_id: String,
    pub sequence: u32,
    pub stop_id: NodeId,
}
