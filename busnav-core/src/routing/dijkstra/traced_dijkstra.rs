use std::collections::BinaryHeap;

use fixedbitset::FixedBitSet;
use hashbrown::HashMap;
use petgraph::graph::{NodeIndex, UnGraph};

use super::{other_endpoint, state::State};

/// Cheapest route between two nodes
#[derive(Debug, Clone, PartialEq)]
pub struct TracedPath {
    pub cost: f64,
    /// Node sequence, both endpoints included
    pub nodes: Vec<NodeIndex>,
}

/// Dijkstra's algorithm with predecessor tracking.
/// Returns `None` when `target` is unreachable from `start`.
pub fn dijkstra_path<N, E, F>(
    graph: &UnGraph<N, E>,
    start: NodeIndex,
    target: NodeIndex,
    edge_cost: F,
) -> Option<TracedPath>
where
    F: Fn(&E) -> Option<f64>,
{
    if start == target {
        return Some(TracedPath {
            cost: 0.0,
            nodes: vec![start],
        });
    }

    let estimated_nodes = graph.node_count().min(1000);
    let mut distances: HashMap<NodeIndex, f64> = HashMap::with_capacity(estimated_nodes);
    let mut predecessors: HashMap<NodeIndex, NodeIndex> = HashMap::with_capacity(estimated_nodes);
    let mut settled = FixedBitSet::with_capacity(graph.node_count());
    let mut heap = BinaryHeap::with_capacity(estimated_nodes / 4);

    heap.push(State {
        cost: 0.0,
        node: start,
    });
    distances.insert(start, 0.0);

    let mut reached = None;
    while let Some(State { cost, node }) = heap.pop() {
        if settled.put(node.index()) {
            continue;
        }

        if node == target {
            reached = Some(cost);
            break;
        }

        for edge in graph.edges(node) {
            let Some(step) = edge_cost(edge.weight()) else {
                continue;
            };
            let next = other_endpoint(&edge, node);
            if settled.contains(next.index()) {
                continue;
            }
            let next_cost = cost + step;

            let improved = distances.get(&next).is_none_or(|&best| next_cost < best);
            if improved {
                distances.insert(next, next_cost);
                predecessors.insert(next, node);
                heap.push(State {
                    cost: next_cost,
                    node: next,
                });
            }
        }
    }

    let cost = reached?;

    // Follow predecessors backward from target to start
    let mut nodes = vec![target];
    let mut current = target;
    while current != start {
        current = *predecessors.get(&current)?;
        nodes.push(current);
    }
    nodes.reverse();

    Some(TracedPath { cost, nodes })
}
