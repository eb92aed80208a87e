//! Tagged node and edge records of the fused city graph

use std::collections::BTreeSet;

use geo::Point;
use serde::{Deserialize, Serialize};

use crate::{Error, LineId, NodeId, Seconds};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Intersection,
    Stop,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CityNode {
    Intersection {
        id: NodeId,
        geometry: Point<f64>,
    },
    Stop {
        id: NodeId,
        name: String,
        geometry: Point<f64>,
    },
}

impl CityNode {
    pub fn id(&self) -> NodeId {
        match self {
            Self::Intersection { id, .. } | Self::Stop { id, .. } => *id,
        }
    }

    /// Position (x = lon, y = lat)
    pub fn geometry(&self) -> Point<f64> {
        match self {
            Self::Intersection { geometry, .. } | Self::Stop { geometry, .. } => *geometry,
        }
    }

    /// Display name, stops only
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Intersection { .. } => None,
            Self::Stop { name, .. } => Some(name),
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Intersection { .. } => NodeKind::Intersection,
            Self::Stop { .. } => NodeKind::Stop,
        }
    }

    pub fn is_stop(&self) -> bool {
        matches!(self, Self::Stop { .. })
    }

    pub fn is_intersection(&self) -> bool {
        matches!(self, Self::Intersection { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    Street,
    TransitLine,
    Link,
}

/// Undirected, time-weighted edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CityEdge {
    /// Walkable street segment
    Street { weight: Seconds },
    /// Stop-to-stop bus segment with the lines serving it
    TransitLine {
        weight: Seconds,
        lines: BTreeSet<LineId>,
    },
    /// Walk from a stop to its nearest intersection plus boarding delay
    Link { weight: Seconds },
}

impl CityEdge {
    /// Travel time in seconds
    pub fn weight(&self) -> Seconds {
        match self {
            Self::Street { weight } | Self::TransitLine { weight, .. } | Self::Link { weight } => {
                *weight
            }
        }
    }

    pub fn lines(&self) -> Option<&BTreeSet<LineId>> {
        match self {
            Self::TransitLine { lines, .. } => Some(lines),
            _ => None,
        }
    }

    pub fn kind(&self) -> EdgeKind {
        match self {
            Self::Street { .. } => EdgeKind::Street,
            Self::TransitLine { .. } => EdgeKind::TransitLine,
            Self::Link { .. } => EdgeKind::Link,
        }
    }

    /// Endpoint kinds this edge may join, in either order
    pub(crate) fn endpoint_kinds(&self) -> (NodeKind, NodeKind) {
        match self {
            Self::Street { .. } => (NodeKind::Intersection, NodeKind::Intersection),
            Self::TransitLine { .. } => (NodeKind::Stop, NodeKind::Stop),
            Self::Link { .. } => (NodeKind::Stop, NodeKind::Intersection),
        }
    }

    /// Checks the weight and tag-specific invariants
    pub(crate) fn validate(&self) -> Result<(), Error> {
        let weight = self.weight();
        if !weight.is_finite() || weight < 0.0 {
            return Err(Error::InvalidData(format!(
                "{:?} edge has invalid weight {weight}",
                self.kind()
            )));
        }
        if let Self::TransitLine { lines, .. } = self
            && lines.is_empty()
        {
            return Err(Error::InvalidData(
                "Transit line edge without lines".to_string(),
            ));
        }
        Ok(())
    }
}
