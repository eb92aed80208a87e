//! Dijkstra over undirected petgraph graphs with non-negative `f64` edge costs.
//!
//! The cost closure returns `None` for edges that must not be traversed, which
//! lets the same search run street-only on the fused graph.

pub mod regular_dijkstra;
mod state;
pub mod traced_dijkstra;

pub use regular_dijkstra::dijkstra_costs;
pub use traced_dijkstra::{TracedPath, dijkstra_path};

use petgraph::graph::{EdgeReference, NodeIndex};
use petgraph::visit::EdgeRef;

/// Endpoint of `edge` that is not `node`
fn other_endpoint<E>(edge: &EdgeReference<'_, E>, node: NodeIndex) -> NodeIndex {
    if edge.source() == node {
        edge.target()
    } else {
        edge.source()
    }
}
