use std::collections::BinaryHeap;

use fixedbitset::FixedBitSet;
use hashbrown::HashMap;
use petgraph::graph::{NodeIndex, UnGraph};

use super::{other_endpoint, state::State};

/// Dijkstra's algorithm returning the cost of every node reached from `start`.
///
/// When `target` is given the search stops as soon as it is settled, so only
/// the target's entry is guaranteed to be final.
pub fn dijkstra_costs<N, E, F>(
    graph: &UnGraph<N, E>,
    start: NodeIndex,
    target: Option<NodeIndex>,
    edge_cost: F,
) -> HashMap<NodeIndex, f64>
where
    F: Fn(&E) -> Option<f64>,
{
    let mut distances: HashMap<NodeIndex, f64> = HashMap::new();
    let mut settled = FixedBitSet::with_capacity(graph.node_count());
    let mut heap = BinaryHeap::new();

    heap.push(State {
        cost: 0.0,
        node: start,
    });
    distances.insert(start, 0.0);

    while let Some(State { cost, node }) = heap.pop() {
        // Stale heap entry
        if settled.put(node.index()) {
            continue;
        }

        if target == Some(node) {
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

            match distances.entry(next) {
                hashbrown::hash_map::Entry::Vacant(entry) => {
                    entry.insert(next_cost);
                    heap.push(State {
                        cost: next_cost,
                        node: next,
                    });
                }
                hashbrown::hash_map::Entry::Occupied(mut entry) => {
                    if next_cost < *entry.get() {
                        *entry.get_mut() = next_cost;
                        heap.push(State {
                            cost: next_cost,
                            node: next,
                        });
                    }
                }
            }
        }
    }

    distances
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn costs_follow_cheapest_route() {
        let mut graph = UnGraph::<(), f64>::new_undirected();
        let a = graph.add_node(());
        let b = graph.add_node(());
        let c = graph.add_node(());
        graph.add_edge(a, b, 1.0);
        graph.add_edge(b, c, 1.0);
        graph.add_edge(a, c, 5.0);

        let costs = dijkstra_costs(&graph, a, None, |w| Some(*w));
        assert_eq!(costs[&c], 2.0);
        assert_eq!(costs[&b], 1.0);
    }

    #[test]
    fn filtered_edges_are_not_traversed() {
        let mut graph = UnGraph::<(), f64>::new_undirected();
        let a = graph.add_node(());
        let b = graph.add_node(());
        graph.add_edge(a, b, -1.0);

        let costs = dijkstra_costs(&graph, a, Some(b), |w| (*w >= 0.0).then_some(*w));
        assert!(!costs.contains_key(&b));
    }
}
