//! Street network graph with a spatial index over its intersections

use geo::Point;
use hashbrown::HashMap;
use log::debug;
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;

use super::components::{StreetEdge, StreetNode};
use crate::model::spatial::SpatialIndex;
use crate::routing::dijkstra::dijkstra_costs;
use crate::{Error, Meters, NodeId};

/// Walkable street network: intersections joined by undirected segments
#[derive(Debug, Clone)]
pub struct StreetGraph {
    pub(crate) graph: UnGraph<StreetNode, StreetEdge>,
    node_index: HashMap<NodeId, NodeIndex>,
    rtree: SpatialIndex,
}

impl StreetGraph {
    /// Builds the network from intersections and `(from, to, length)` segments.
    ///
    /// Self-loops are dropped and parallel segments keep the shortest length.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidData`] on duplicate node ids, segments with an
    /// unknown endpoint or lengths that are negative or not finite.
    pub fn new(
        nodes: impl IntoIterator<Item = StreetNode>,
        edges: impl IntoIterator<Item = (NodeId, NodeId, Meters)>,
    ) -> Result<Self, Error> {
        let mut graph: UnGraph<StreetNode, StreetEdge> = UnGraph::new_undirected();
        let mut node_index: HashMap<NodeId, NodeIndex> = HashMap::new();

        for node in nodes {
            let id = node.id;
            if node_index.contains_key(&id) {
                return Err(Error::InvalidData(format!(
                    "Duplicate street node id {id}"
                )));
            }
            node_index.insert(id, graph.add_node(node));
        }

        let mut dropped_loops = 0usize;
        for (from, to, length) in edges {
            if !length.is_finite() || length < 0.0 {
                return Err(Error::InvalidData(format!(
                    "Street segment {from}-{to} has invalid length {length}"
                )));
            }
            let (Some(&a), Some(&b)) = (node_index.get(&from), node_index.get(&to)) else {
                return Err(Error::InvalidData(format!(
                    "Street segment {from}-{to} references an unknown node"
                )));
            };
            if a == b {
                dropped_loops += 1;
                continue;
            }

            match graph.find_edge(a, b) {
                Some(existing) => {
                    let edge = &mut graph[existing];
                    edge.length = edge.length.min(length);
                }
                None => {
                    graph.add_edge(a, b, StreetEdge { length });
                }
            }
        }

        if dropped_loops > 0 {
            debug!("Dropped {dropped_loops} self-loop street segments");
        }

        let rtree = SpatialIndex::new(graph.node_weights().map(|n| (n.id, n.geometry)));

        Ok(Self {
            graph,
            node_index,
            rtree,
        })
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn node(&self, id: NodeId) -> Option<&StreetNode> {
        self.node_index.get(&id).map(|&idx| &self.graph[idx])
    }

    pub fn nodes(&self) -> impl Iterator<Item = &StreetNode> {
        self.graph.node_weights()
    }

    /// Segments as `(from, to, length)`
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId, Meters)> + '_ {
        self.graph.edge_references().map(|edge| {
            (
                self.graph[edge.source()].id,
                self.graph[edge.target()].id,
                edge.weight().length,
            )
        })
    }

    /// Nearest intersection to `point` and its distance in meters
    pub fn nearest_node(&self, point: &Point<f64>) -> Option<(NodeId, Meters)> {
        self.rtree.nearest(point)
    }

    pub fn nearest_nodes(&self, points: &[Point<f64>]) -> Vec<Option<(NodeId, Meters)>> {
        self.rtree.nearest_many(points)
    }

    /// Street-only shortest path length between two intersections
    pub fn shortest_path_length(&self, from: NodeId, to: NodeId) -> Option<Meters> {
        let start = *self.node_index.get(&from)?;
        let target = *self.node_index.get(&to)?;
        dijkstra_costs(&self.graph, start, Some(target), |edge| Some(edge.length))
            .get(&target)
            .copied()
    }
}
