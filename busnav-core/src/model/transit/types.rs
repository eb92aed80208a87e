use std::collections::BTreeSet;

use geo::Point;
use serde::{Deserialize, Serialize};

use crate::{LineId, NodeId};

/// Bus stop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitStop {
    pub id: NodeId,
    /// Display name
    pub name: String,
    pub geometry: Point<f64>,
}

/// Undirected segment between two consecutive stops, with every line running on it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitSegment {
    pub from: NodeId,
    pub to: NodeId,
    pub lines: BTreeSet<LineId>,
}
