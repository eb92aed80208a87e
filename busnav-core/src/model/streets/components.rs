//! Street network components - intersections and street segments

use geo::Point;
use serde::{Deserialize, Serialize};

use crate::{Meters, NodeId};

/// Street graph node (intersection)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreetNode {
    /// Source id of the intersection
    pub id: NodeId,
    /// Node coordinates (x = lon, y = lat)
    pub geometry: Point<f64>,
}

/// Street graph edge (street segment)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StreetEdge {
    /// Physical length in meters
    pub length: Meters,
}
