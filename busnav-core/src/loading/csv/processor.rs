use std::collections::BTreeMap;
use std::path::Path;

use geo::Point;
use log::info;

use super::parser::deserialize_csv_file;
use super::raw_types::{RawLineStop, RawStop, RawStreetEdge, RawStreetNode};
use crate::model::{StreetGraph, StreetNode, TransitGraph, TransitStop};
use crate::{Error, NodeId};

/// Street network from `node_id,lat,lon` and `from,to,length` files
pub fn load_street_graph(nodes_path: &Path, edges_path: &Path) -> Result<StreetGraph, Error> {
    let nodes: Vec<RawStreetNode> = deserialize_csv_file(nodes_path)?;
    let edges: Vec<RawStreetEdge> = deserialize_csv_file(edges_path)?;

    let graph = StreetGraph::new(
        nodes.into_iter().map(|raw| StreetNode {
            id: raw.node_id,
            geometry: Point::new(raw.lon, raw.lat),
        }),
        edges.into_iter().map(|raw| (raw.from, raw.to, raw.length)),
    )?;

    info!(
        "Loaded street network with {} intersections and {} segments",
        graph.node_count(),
        graph.edge_count()
    );
    Ok(graph)
}

/// Bus network from `stop_id,name,lat,lon` and `line_id,sequence,stop_id` files.
///
/// Each line's stops are ordered by `sequence`; consecutive stops become a
/// segment of that line.
pub fn load_transit_graph(stops_path: &Path, line_stops_path: &Path) -> Result<TransitGraph, Error> {
    let stops: Vec<RawStop> = deserialize_csv_file(stops_path)?;
    let line_stops: Vec<RawLineStop> = deserialize_csv_file(line_stops_path)?;

    let mut graph = TransitGraph::new(stops.into_iter().map(|raw| TransitStop {
        id: raw.stop_id,
        name: raw.name,
        geometry: Point::new(raw.lon, raw.lat),
    }))?;

    for (line, stop_ids) in group_by_line(line_stops) {
        graph.add_line(line, &stop_ids)?;
    }

    info!(
        "Loaded bus network with {} stops, {} segments and {} lines",
        graph.stop_count(),
        graph.segment_count(),
        graph.lines().len()
    );
    Ok(graph)
}

/// Stop sequence of every line, lines in id order
fn group_by_line(line_stops: Vec<RawLineStop>) -> BTreeMap<String, Vec<NodeId>> {
    let mut by_line: BTreeMap<String, Vec<(u32, NodeId)>> = BTreeMap::new();
    for raw in line_stops {
        by_line
            .entry(raw.line_id)
            .or_default()
            .push((raw.sequence, raw.stop_id));
    }

    by_line
        .into_iter()
        .map(|(line, mut calls)| {
            calls.sort_by_key(|&(sequence, _)| sequence);
            let mut stops: Vec<NodeId> = calls.into_iter().map(|(_, stop)| stop).collect();
            stops.dedup();
            (line, stops)
        })
        .collect()
}
