//! Turning a path into travel instructions.
//!
//! The path is scanned once, left to right. Intersections are walked; a stop
//! followed by another stop starts a ride. During a ride the set of lines
//! that could have carried the traveller so far is intersected with the
//! lines of each next hop. When that intersection becomes empty the
//! traveller must have changed lines at the current stop, so the ride so far
//! is emitted as a boarding and a new one starts there. Whenever a line has
//! to be picked from a set, the lexicographically smallest id is used.

use std::collections::{BTreeMap, BTreeSet};

use log::warn;
use serde::Serialize;
use thiserror::Error;

use crate::model::CityGraph;
use crate::routing::Path;
use crate::{LineId, NodeId};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Instruction {
    /// The whole trip is on foot
    WalkOnly,
    /// Ride `line` starting at `stop`. `transfer` is set when the previous
    /// ride ends at this same stop without leaving the bus network.
    Board {
        stop: NodeId,
        line: LineId,
        transfer: bool,
    },
    /// Leave the bus at `stop`
    Arrive { stop: NodeId },
}

/// Display state of a node in a narrated path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Highlight {
    Source,
    Destination,
    Traversed,
    Boarding,
    Transfer,
    Alighting,
}

/// Instructions for a path together with per-node display annotations
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Narration {
    pub instructions: Vec<Instruction>,
    pub highlights: BTreeMap<NodeId, Highlight>,
}

#[derive(Debug, Error)]
enum NarrationAnomaly {
    #[error("node {0} is not part of the city graph")]
    UnknownNode(NodeId),
    #[error("path starts at stop {0} instead of an intersection")]
    StartsAtStop(NodeId),
    #[error("no bus line joins stops {0} and {1}")]
    NoLines(NodeId, NodeId),
}

/// Narrates a path. Never fails: a path whose topology cannot be narrated
/// yields no instructions and a logged warning.
pub fn narrate(path: &Path<'_>) -> Narration {
    let instructions = scan(path.city(), path.nodes()).unwrap_or_else(|anomaly| {
        warn!("Could not narrate path: {anomaly}");
        Vec::new()
    });
    let highlights = highlight(path.nodes(), &instructions);

    Narration {
        instructions,
        highlights,
    }
}

fn scan(city: &CityGraph, nodes: &[NodeId]) -> Result<Vec<Instruction>, NarrationAnomaly> {
    let is_stop = move |id: NodeId| {
        city.node(id)
            .map(|node| node.is_stop())
            .ok_or(NarrationAnomaly::UnknownNode(id))
    };
    let lines_between = move |a: NodeId, b: NodeId| {
        city.edge_between(a, b)
            .and_then(|edge| edge.lines())
            .filter(|lines| !lines.is_empty())
            .ok_or(NarrationAnomaly::NoLines(a, b))
    };

    let Some(&first) = nodes.first() else {
        return Ok(Vec::new());
    };
    if is_stop(first)? {
        return Err(NarrationAnomaly::StartsAtStop(first));
    }

    let mut instructions = Vec::new();
    let mut i = 0;
    while i < nodes.len() {
        // Walking
        if !is_stop(nodes[i])? {
            i += 1;
            continue;
        }

        // A stop reached on foot: ride only if the next node is a stop as well
        let stop0 = nodes[i];
        let Some(&next) = nodes.get(i + 1) else {
            break;
        };
        if !is_stop(next)? {
            i += 1;
            continue;
        }

        let mut boarding = stop0;
        let mut transfer = false;
        let mut running: BTreeSet<LineId> = lines_between(stop0, next)?.clone();
        let mut current = next;
        i += 1;

        while let Some(&following) = nodes.get(i + 1) {
            if !is_stop(following)? {
                break;
            }
            let hop = lines_between(current, following)?;
            let narrowed: BTreeSet<LineId> = running.intersection(hop).cloned().collect();
            if narrowed.is_empty() {
                instructions.push(board(boarding, &running, transfer));
                boarding = current;
                transfer = true;
                running = hop.clone();
            } else {
                running = narrowed;
            }
            current = following;
            i += 1;
        }

        instructions.push(board(boarding, &running, transfer));
        instructions.push(Instruction::Arrive { stop: current });
        i += 1;
    }

    if instructions.is_empty() {
        instructions.push(Instruction::WalkOnly);
    }
    Ok(instructions)
}

/// Boarding on the smallest line id still possible; `running` is never empty here
fn board(stop: NodeId, running: &BTreeSet<LineId>, transfer: bool) -> Instruction {
    Instruction::Board {
        stop,
        line: running.first().cloned().unwrap_or_default(),
        transfer,
    }
}

fn highlight(nodes: &[NodeId], instructions: &[Instruction]) -> BTreeMap<NodeId, Highlight> {
    let mut highlights: BTreeMap<NodeId, Highlight> =
        nodes.iter().map(|&id| (id, Highlight::Traversed)).collect();

    for instruction in instructions {
        match instruction {
            Instruction::Board { stop, transfer, .. } => {
                let mark = if *transfer {
                    Highlight::Transfer
                } else {
                    Highlight::Boarding
                };
                highlights.insert(*stop, mark);
            }
            Instruction::Arrive { stop } => {
                highlights.insert(*stop, Highlight::Alighting);
            }
            Instruction::WalkOnly => {}
        }
    }

    if let (Some(&source), Some(&destination)) = (nodes.first(), nodes.last()) {
        highlights.insert(source, Highlight::Source);
        highlights.insert(destination, Highlight::Destination);
    }
    highlights
}

impl Narration {
    pub fn is_walk_only(&self) -> bool {
        self.instructions == [Instruction::WalkOnly]
    }

    /// Number of line changes made without leaving the bus network
    pub fn transfers(&self) -> usize {
        self.instructions
            .iter()
            .filter(|instruction| {
                matches!(instruction, Instruction::Board { transfer: true, .. })
            })
            .count()
    }

    /// Human-readable text, one sentence per line
    pub fn describe(&self, city: &CityGraph) -> Vec<String> {
        let stop_name = |id: NodeId| {
            city.node(id)
                .and_then(|node| node.name().map(str::to_string))
                .unwrap_or_else(|| format!("#{id}"))
        };

        let mut text = Vec::with_capacity(self.instructions.len() + 1);
        let mut previous: Option<&Instruction> = None;
        for instruction in &self.instructions {
            let sentence = match instruction {
                Instruction::WalkOnly => {
                    "Walk to the destination. You don't need to take a bus!".to_string()
                }
                Instruction::Board {
                    stop,
                    line,
                    transfer,
                } => {
                    if *transfer {
                        format!(
                            "Travel by bus to the stop {}, and transfer to line {line}.",
                            stop_name(*stop)
                        )
                    } else {
                        format!("Walk to the bus stop {}, and take bus {line}.", stop_name(*stop))
                    }
                }
                Instruction::Arrive { stop } => {
                    format!("Travel by bus to the stop {}.", stop_name(*stop))
                }
            };
            text.push(sentence);
            previous = Some(instruction);
        }

        if matches!(previous, Some(Instruction::Arrive { .. })) {
            text.push("Walk to the destination.".to_string());
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CityEdge;
    use crate::test_helpers::{intersection, ride, stop};

    fn board(stop: NodeId, line: &str) -> Instruction {
        Instruction::Board {
            stop,
            line: line.to_string(),
            transfer: false,
        }
    }

    fn transfer(stop: NodeId, line: &str) -> Instruction {
        Instruction::Board {
            stop,
            line: line.to_string(),
            transfer: true,
        }
    }

    /// `A(1) - S1(11) - S2(12) - S3(13) - B(2)` with the given hop lines
    fn corridor(first: &[&str], second: &[&str]) -> CityGraph {
        CityGraph::from_parts(
            [
                intersection(1, 2.0, 41.0),
                intersection(2, 2.03, 41.0),
                stop(11, "S1", 2.0, 41.0001),
                stop(12, "S2", 2.01, 41.0001),
                stop(13, "S3", 2.03, 41.0001),
                intersection(3, 2.01, 41.0),
            ],
            [
                (1, 11, CityEdge::Link { weight: 10.0 }),
                (12, 3, CityEdge::Link { weight: 10.0 }),
                (13, 2, CityEdge::Link { weight: 10.0 }),
                (11, 12, ride(30.0, first)),
                (12, 13, ride(30.0, second)),
                (1, 3, CityEdge::Street { weight: 500.0 }),
                (3, 2, CityEdge::Street { weight: 500.0 }),
            ],
        )
        .unwrap()
    }

    #[test]
    fn walking_path_is_walk_only() {
        let city = corridor(&["10"], &["10"]);
        let path = Path::new(&city, vec![1, 3, 2]).unwrap();
        let narration = narrate(&path);

        assert_eq!(narration.instructions, vec![Instruction::WalkOnly]);
        assert!(narration.is_walk_only());
        assert_eq!(
            narration.describe(&city),
            vec!["Walk to the destination. You don't need to take a bus!"]
        );
    }

    #[test]
    fn narrowing_lines_keep_one_boarding() {
        let city = corridor(&["10", "24"], &["24"]);
        let path = Path::new(&city, vec![1, 11, 12, 13, 2]).unwrap();
        let narration = narrate(&path);

        assert_eq!(
            narration.instructions,
            vec![board(11, "24"), Instruction::Arrive { stop: 13 }]
        );
        assert_eq!(narration.transfers(), 0);
    }

    #[test]
    fn disjoint_lines_force_transfer() {
        let city = corridor(&["10"], &["24"]);
        let path = Path::new(&city, vec![1, 11, 12, 13, 2]).unwrap();
        let narration = narrate(&path);

        assert_eq!(
            narration.instructions,
            vec![
                board(11, "10"),
                transfer(12, "24"),
                Instruction::Arrive { stop: 13 }
            ]
        );
        assert_eq!(narration.transfers(), 1);
        assert_eq!(narration.highlights[&11], Highlight::Boarding);
        assert_eq!(narration.highlights[&12], Highlight::Transfer);
        assert_eq!(narration.highlights[&13], Highlight::Alighting);
        assert_eq!(narration.highlights[&1], Highlight::Source);
        assert_eq!(narration.highlights[&2], Highlight::Destination);
        assert_eq!(
            narration.describe(&city),
            vec![
                "Walk to the bus stop S1, and take bus 10.",
                "Travel by bus to the stop S2, and transfer to line 24.",
                "Travel by bus to the stop S3.",
                "Walk to the destination.",
            ]
        );
    }

    #[test]
    fn tie_break_picks_smallest_line() {
        let city = corridor(&["V15", "H12", "D20"], &["V15", "H12"]);
        let path = Path::new(&city, vec![1, 11, 12, 13, 2]).unwrap();

        assert_eq!(
            narrate(&path).instructions,
            vec![board(11, "H12"), Instruction::Arrive { stop: 13 }]
        );
    }

    #[test]
    fn single_hop_ride() {
        let city = corridor(&["24", "10"], &["7"]);
        let path = Path::new(&city, vec![1, 11, 12, 3]).unwrap();

        assert_eq!(
            narrate(&path).instructions,
            vec![board(11, "10"), Instruction::Arrive { stop: 12 }]
        );
    }

    #[test]
    fn passing_a_stop_on_foot_is_not_a_boarding() {
        // Street walk that detours through a stop's link edge and back out
        let city = CityGraph::from_parts(
            [
                intersection(1, 2.0, 41.0),
                intersection(2, 2.001, 41.0),
                stop(11, "S1", 2.0, 41.0001),
                stop(12, "S2", 2.001, 41.0001),
            ],
            [
                (1, 11, CityEdge::Link { weight: 1.0 }),
                (12, 2, CityEdge::Link { weight: 1.0 }),
                (1, 2, CityEdge::Street { weight: 5.0 }),
                (11, 12, ride(1.0, &["10"])),
            ],
        )
        .unwrap();
        let path = Path::new(&city, vec![2, 1, 11]).unwrap();

        assert_eq!(narrate(&path).instructions, vec![Instruction::WalkOnly]);
    }

    #[test]
    fn ride_ending_the_path_still_arrives() {
        let city = corridor(&["10"], &["10"]);
        let path = Path::new(&city, vec![1, 11, 12, 13]).unwrap();

        assert_eq!(
            narrate(&path).instructions,
            vec![board(11, "10"), Instruction::Arrive { stop: 13 }]
        );
    }

    #[test]
    fn two_separate_rides() {
        let city = corridor(&["10"], &["24"]);
        // ride 11->12, walk out through 3, walk back in, ride 12->13
        let path = Path::new(&city, vec![1, 11, 12, 3, 12, 13, 2]).unwrap();
        let narration = narrate(&path);

        assert_eq!(
            narration.instructions,
            vec![
                board(11, "10"),
                Instruction::Arrive { stop: 12 },
                board(12, "24"),
                Instruction::Arrive { stop: 13 },
            ]
        );
        assert_eq!(narration.transfers(), 0);
        assert_eq!(narration.highlights[&12], Highlight::Boarding);
    }

    #[test]
    fn transfer_flag_serializes_on_boardings() {
        let city = corridor(&["10"], &["24"]);
        let path = Path::new(&city, vec![1, 11, 12, 13, 2]).unwrap();
        let json = serde_json::to_value(&narrate(&path).instructions).unwrap();

        assert_eq!(
            json,
            serde_json::json!([
                { "type": "board", "stop": 11, "line": "10", "transfer": false },
                { "type": "board", "stop": 12, "line": "24", "transfer": true },
                { "type": "arrive", "stop": 13 },
            ])
        );
    }

    #[test]
    fn path_starting_at_stop_is_not_narrated() {
        let city = corridor(&["10"], &["24"]);
        let path = Path::new(&city, vec![11, 12, 13]).unwrap();
        let narration = narrate(&path);

        assert!(narration.instructions.is_empty());
        assert_eq!(narration.highlights[&11], Highlight::Source);
    }

    #[test]
    fn narration_is_repeatable() {
        let city = corridor(&["10"], &["24"]);
        let path = Path::new(&city, vec![1, 11, 12, 13, 2]).unwrap();
        assert_eq!(narrate(&path), narrate(&path));
    }

    #[test]
    fn single_node_path_walks() {
        let city = corridor(&["10"], &["24"]);
        let path = Path::new(&city, vec![1]).unwrap();
        assert_eq!(narrate(&path).instructions, vec![Instruction::WalkOnly]);
    }
}
