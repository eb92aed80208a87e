use geo::Point;
use hashbrown::HashMap;
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;

use super::components::{CityEdge, CityNode, EdgeKind, NodeKind};
use crate::model::spatial::SpatialIndex;
use crate::routing::dijkstra::dijkstra_path;
use crate::{Error, Meters, NodeId};

/// Fused street + bus graph, immutable once built.
///
/// Every stop carries exactly one [`CityEdge::Link`] to an intersection.
/// Queries only borrow the graph, so one instance can be shared between
/// threads without locking.
#[derive(Debug, Clone)]
pub struct CityGraph {
    pub(crate) graph: UnGraph<CityNode, CityEdge>,
    node_index: HashMap<NodeId, NodeIndex>,
    intersections: SpatialIndex,
    /// Stop id to the intersection its link edge reaches
    stop_links: HashMap<NodeId, NodeId>,
}

impl CityGraph {
    /// Assembles a graph from tagged nodes and `(a, b, edge)` records,
    /// validating every node and edge invariant on the way.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidData`] on duplicate node ids, unknown endpoints,
    /// duplicate edges, edges joining the wrong node kinds, invalid weights,
    /// transit edges without lines, or stops without exactly one link edge.
    pub fn from_parts(
        nodes: impl IntoIterator<Item = CityNode>,
        edges: impl IntoIterator<Item = (NodeId, NodeId, CityEdge)>,
    ) -> Result<Self, Error> {
        let mut graph: UnGraph<CityNode, CityEdge> = UnGraph::new_undirected();
        let mut node_index: HashMap<NodeId, NodeIndex> = HashMap::new();

        for node in nodes {
            let id = node.id();
            if node_index.contains_key(&id) {
                return Err(Error::InvalidData(format!(
                    "Node id {id} is used more than once"
                )));
            }
            node_index.insert(id, graph.add_node(node));
        }

        let mut stop_links: HashMap<NodeId, NodeId> = HashMap::new();
        for (a, b, edge) in edges {
            edge.validate()?;

            let (Some(&ia), Some(&ib)) = (node_index.get(&a), node_index.get(&b)) else {
                return Err(Error::InvalidData(format!(
                    "Edge {a}-{b} references an unknown node"
                )));
            };

            let found = (graph[ia].kind(), graph[ib].kind());
            let (k1, k2) = edge.endpoint_kinds();
            if found != (k1, k2) && found != (k2, k1) {
                return Err(Error::InvalidData(format!(
                    "{:?} edge {a}-{b} cannot join {:?} and {:?}",
                    edge.kind(),
                    found.0,
                    found.1
                )));
            }

            if graph.find_edge(ia, ib).is_some() {
                return Err(Error::InvalidData(format!("Duplicate edge {a}-{b}")));
            }

            if edge.kind() == EdgeKind::Link {
                let (stop, intersection) = if found.0 == NodeKind::Stop {
                    (a, b)
                } else {
                    (b, a)
                };
                if stop_links.insert(stop, intersection).is_some() {
                    return Err(Error::InvalidData(format!(
                        "Stop {stop} has more than one link edge"
                    )));
                }
            }

            graph.add_edge(ia, ib, edge);
        }

        if let Some(unlinked) = graph
            .node_weights()
            .find(|node| node.is_stop() && !stop_links.contains_key(&node.id()))
        {
            return Err(Error::InvalidData(format!(
                "Stop {} has no link edge",
                unlinked.id()
            )));
        }

        let intersections = SpatialIndex::new(
            graph
                .node_weights()
                .filter(|node| node.is_intersection())
                .map(|node| (node.id(), node.geometry())),
        );

        Ok(Self {
            graph,
            node_index,
            intersections,
            stop_links,
        })
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn intersection_count(&self) -> usize {
        self.intersections.len()
    }

    pub fn stop_count(&self) -> usize {
        self.stop_links.len()
    }

    pub fn node(&self, id: NodeId) -> Option<&CityNode> {
        self.node_index.get(&id).map(|&idx| &self.graph[idx])
    }

    pub fn nodes(&self) -> impl Iterator<Item = &CityNode> {
        self.graph.node_weights()
    }

    /// Edges as `(a, b, edge)`
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId, &CityEdge)> {
        self.graph.edge_references().map(|edge| {
            (
                self.graph[edge.source()].id(),
                self.graph[edge.target()].id(),
                edge.weight(),
            )
        })
    }

    /// Edge joining `a` and `b`, in either direction
    pub fn edge_between(&self, a: NodeId, b: NodeId) -> Option<&CityEdge> {
        let ia = *self.node_index.get(&a)?;
        let ib = *self.node_index.get(&b)?;
        self.graph.find_edge(ia, ib).map(|edge| &self.graph[edge])
    }

    /// Nearest intersection to `point` and its distance in meters
    pub fn nearest_intersection(&self, point: &Point<f64>) -> Option<(NodeId, Meters)> {
        self.intersections.nearest(point)
    }

    /// Intersection reached by the link edge of `stop`
    pub fn linked_intersection(&self, stop: NodeId) -> Option<NodeId> {
        self.stop_links.get(&stop).copied()
    }

    /// Street-only shortest walk between two intersections, endpoints included
    pub fn street_path(&self, from: NodeId, to: NodeId) -> Option<Vec<NodeId>> {
        let start = *self.node_index.get(&from)?;
        let target = *self.node_index.get(&to)?;
        let traced = dijkstra_path(&self.graph, start, target, |edge| match edge {
            CityEdge::Street { weight } => Some(*weight),
            _ => None,
        })?;
        Some(self.ids_of(&traced.nodes))
    }

    pub(crate) fn index_of(&self, id: NodeId) -> Option<NodeIndex> {
        self.node_index.get(&id).copied()
    }

    pub(crate) fn ids_of(&self, indices: &[NodeIndex]) -> Vec<NodeId> {
        indices.iter().map(|&idx| self.graph[idx].id()).collect()
    }
}
