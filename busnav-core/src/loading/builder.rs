use geo::{ConvexHull, Distance, Haversine, Intersects, MultiPoint, Point};
use hashbrown::HashMap;
use log::{info, warn};
use rayon::prelude::*;

use super::config::{CityGraphConfig, NetworkSources};
use super::csv::{load_street_graph, load_transit_graph};
use crate::model::{CityEdge, CityGraph, CityNode, StreetGraph, TransitGraph};
use crate::{Error, Meters, NodeId};

/// Loads both networks from CSV and fuses them into a city graph
///
/// # Errors
///
/// Returns an error if an input file is missing or malformed, or if the
/// fusion itself fails (see [`build_city_graph`]).
pub fn create_city_graph(
    sources: &NetworkSources,
    config: &CityGraphConfig,
) -> Result<CityGraph, Error> {
    sources.validate()?;
    config.validate()?;

    info!(
        "Processing street network: {}",
        sources.street_nodes.display()
    );

    // Street network is the larger input, load it in parallel with the bus network
    let node_path = sources.street_nodes.clone();
    let edge_path = sources.street_edges.clone();
    let street_handle = std::thread::spawn(move || load_street_graph(&node_path, &edge_path));

    info!("Processing bus network: {}", sources.stops.display());
    let transit = load_transit_graph(&sources.stops, &sources.line_stops)?;

    let street = street_handle
        .join()
        .map_err(|_| Error::InvalidData("Street loading thread panicked".to_string()))??;

    validate_graph_transit_overlap(&street, &transit);

    build_city_graph(&street, &transit, config)
}

/// Fuses a street network and a bus network into one time-weighted graph.
///
/// - street segments become [`CityEdge::Street`] weighted by walking time;
/// - every stop is joined to its nearest intersection by a [`CityEdge::Link`]
///   weighted by walking time plus the boarding penalty;
/// - bus segments become [`CityEdge::TransitLine`] weighted by the street
///   distance between the stops' intersections at bus speed.
///
/// # Errors
///
/// Returns [`Error::SpatialJoin`] if any stop is farther than
/// `max_snap_distance` from every intersection, and [`Error::InvalidData`]
/// for an invalid configuration or ids shared by both networks.
pub fn build_city_graph(
    street: &StreetGraph,
    transit: &TransitGraph,
    config: &CityGraphConfig,
) -> Result<CityGraph, Error> {
    config.validate()?;

    let mut nodes: Vec<CityNode> = Vec::with_capacity(street.node_count() + transit.stop_count());
    nodes.extend(street.nodes().map(|node| CityNode::Intersection {
        id: node.id,
        geometry: node.geometry,
    }));
    nodes.extend(transit.stops().iter().map(|stop| CityNode::Stop {
        id: stop.id,
        name: stop.name.clone(),
        geometry: stop.geometry,
    }));

    let mut edges: Vec<(NodeId, NodeId, CityEdge)> = street
        .edges()
        .map(|(a, b, length)| {
            let weight = length / config.walking_speed;
            (a, b, CityEdge::Street { weight })
        })
        .collect();
    let street_edges = edges.len();

    let nearest = snap_stops_to_streets(street, transit, config)?;

    edges.extend(transit_line_edges(street, transit, &nearest, config));
    edges.extend(link_edges(street, transit, &nearest, config));

    let city = CityGraph::from_parts(nodes, edges)?;

    info!(
        "City graph built: {} intersections, {} stops, {} street edges, {} transit edges, {} links",
        city.intersection_count(),
        city.stop_count(),
        street_edges,
        transit.segment_count(),
        city.stop_count()
    );

    Ok(city)
}

/// Nearest intersection for every stop, failing on the first stop (in input
/// order) beyond the snapping threshold
fn snap_stops_to_streets(
    street: &StreetGraph,
    transit: &TransitGraph,
    config: &CityGraphConfig,
) -> Result<HashMap<NodeId, NodeId>, Error> {
    let positions: Vec<Point<f64>> = transit.stops().iter().map(|s| s.geometry).collect();
    let snapped = street.nearest_nodes(&positions);

    let mut nearest = HashMap::with_capacity(snapped.len());
    for (stop, result) in transit.stops().iter().zip(snapped) {
        let distance = result.map_or(f64::INFINITY, |(_, distance)| distance);
        match result {
            Some((intersection, distance)) if distance <= config.max_snap_distance => {
                nearest.insert(stop.id, intersection);
            }
            _ => {
                return Err(Error::SpatialJoin {
                    stop: stop.id,
                    distance,
                    max_distance: config.max_snap_distance,
                });
            }
        }
    }

    Ok(nearest)
}

fn transit_line_edges(
    street: &StreetGraph,
    transit: &TransitGraph,
    nearest: &HashMap<NodeId, NodeId>,
    config: &CityGraphConfig,
) -> Vec<(NodeId, NodeId, CityEdge)> {
    transit
        .segments()
        .par_iter()
        .map(|segment| {
            let length = nearest
                .get(&segment.from)
                .zip(nearest.get(&segment.to))
                .and_then(|(&i, &j)| street.shortest_path_length(i, j))
                .unwrap_or_else(|| {
                    let fallback = stop_distance(transit, segment.from, segment.to);
                    warn!(
                        "Stops {} and {} are not connected through the street network, \
                         using straight-line distance {fallback:.0} m",
                        segment.from, segment.to
                    );
                    fallback
                });

            let edge = CityEdge::TransitLine {
                weight: length / config.bus_speed,
                lines: segment.lines.clone(),
            };
            (segment.from, segment.to, edge)
        })
        .collect()
}

fn link_edges(
    street: &StreetGraph,
    transit: &TransitGraph,
    nearest: &HashMap<NodeId, NodeId>,
    config: &CityGraphConfig,
) -> Vec<(NodeId, NodeId, CityEdge)> {
    transit
        .stops()
        .iter()
        .filter_map(|stop| {
            let intersection = *nearest.get(&stop.id)?;
            let position = street.node(intersection)?.geometry;
            let walk = Haversine.distance(stop.geometry, position) / config.walking_speed;
            let weight = walk + config.boarding_penalty;
            Some((stop.id, intersection, CityEdge::Link { weight }))
        })
        .collect()
}

fn stop_distance(transit: &TransitGraph, a: NodeId, b: NodeId) -> Meters {
    match (transit.stop(a), transit.stop(b)) {
        (Some(a), Some(b)) => Haversine.distance(a.geometry, b.geometry),
        _ => 0.0,
    }
}

#[allow(clippy::cast_precision_loss)]
fn validate_graph_transit_overlap(streets: &StreetGraph, transit: &TransitGraph) {
    let total_stops = transit.stop_count();
    if total_stops == 0 {
        return;
    }

    let graph_nodes: MultiPoint = streets.nodes().map(|node| node.geometry).collect();
    let graph_hull = graph_nodes.convex_hull();

    let stops_outside_hull = transit
        .stops()
        .iter()
        .filter(|stop| !stop.geometry.intersects(&graph_hull))
        .count();

    let percentage = (stops_outside_hull as f64 / total_stops as f64) * 100.0;
    if stops_outside_hull > 0 {
        warn!(
            "{stops_outside_hull} of {total_stops} bus stops ({percentage:.1}%) are outside \
        the street network coverage area. They will be linked to the closest boundary \
        intersection, or rejected if farther than the snapping threshold."
        );
    }
}
