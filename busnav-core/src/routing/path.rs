use geo::Point;
use itertools::Itertools;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::loading::{CityGraphConfig, DEFAULT_MAX_SNAP_DISTANCE};
use crate::model::CityGraph;
use crate::routing::dijkstra::dijkstra_path;
use crate::{Error, Meters, NodeId, Seconds};

/// Query-time settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Largest accepted distance between a queried coordinate and its intersection
    pub max_snap_distance: Meters,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            max_snap_distance: DEFAULT_MAX_SNAP_DISTANCE,
        }
    }
}

impl From<&CityGraphConfig> for RoutingConfig {
    fn from(config: &CityGraphConfig) -> Self {
        Self {
            max_snap_distance: config.max_snap_distance,
        }
    }
}

/// Minimum-time route between two intersections of a city graph
#[derive(Debug, Clone)]
pub struct Path<'a> {
    city: &'a CityGraph,
    nodes: Vec<NodeId>,
    travel_time: Seconds,
    total_minutes: u64,
}

impl<'a> Path<'a> {
    /// Wraps a node sequence, summing the weights of the edges it follows.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidData`] if the sequence is empty or two
    /// consecutive nodes are not joined by an edge.
    pub fn new(city: &'a CityGraph, nodes: Vec<NodeId>) -> Result<Self, Error> {
        if nodes.is_empty() {
            return Err(Error::InvalidData("Path without nodes".to_string()));
        }
        if let Some(&missing) = nodes.iter().find(|&&id| city.node(id).is_none()) {
            return Err(Error::InvalidData(format!("Path visits unknown node {missing}")));
        }

        let mut travel_time = 0.0;
        for (a, b) in nodes.iter().copied().tuple_windows() {
            let edge = city.edge_between(a, b).ok_or_else(|| {
                Error::InvalidData(format!("Path hops between unconnected nodes {a} and {b}"))
            })?;
            travel_time += edge.weight();
        }

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let total_minutes = (travel_time / 60.0).floor() as u64;

        Ok(Self {
            city,
            nodes,
            travel_time,
            total_minutes,
        })
    }

    pub fn city(&self) -> &'a CityGraph {
        self.city
    }

    /// Full node sequence, source and destination included
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn source(&self) -> NodeId {
        self.nodes[0]
    }

    pub fn destination(&self) -> NodeId {
        self.nodes[self.nodes.len() - 1]
    }

    /// Exact travel time in seconds
    pub fn travel_time(&self) -> Seconds {
        self.travel_time
    }

    /// Travel time floored to whole minutes
    pub fn total_minutes(&self) -> u64 {
        self.total_minutes
    }
}

/// Finds the minimum-time path between the intersections nearest to two coordinates.
///
/// # Errors
///
/// - [`Error::OutOfBounds`] if a coordinate has no intersection within
///   `config.max_snap_distance`;
/// - [`Error::NoPath`] if the two intersections are not connected.
pub fn find_path<'a>(
    city: &'a CityGraph,
    source: Point<f64>,
    destination: Point<f64>,
    config: &RoutingConfig,
) -> Result<Path<'a>, Error> {
    let from = resolve(city, &source, config)?;
    let to = resolve(city, &destination, config)?;

    if from == to {
        return Path::new(city, vec![from]);
    }

    let (Some(start), Some(target)) = (city.index_of(from), city.index_of(to)) else {
        return Err(Error::NoPath { from, to });
    };

    let traced = dijkstra_path(&city.graph, start, target, |edge| Some(edge.weight()))
        .ok_or(Error::NoPath { from, to })?;

    debug!(
        "Path {from} -> {to}: {} nodes, {:.0} s",
        traced.nodes.len(),
        traced.cost
    );

    Path::new(city, city.ids_of(&traced.nodes))
}

fn resolve(city: &CityGraph, point: &Point<f64>, config: &RoutingConfig) -> Result<NodeId, Error> {
    match city.nearest_intersection(point) {
        Some((node, distance)) if distance <= config.max_snap_distance => Ok(node),
        nearest => Err(Error::OutOfBounds {
            lat: point.y(),
            lon: point.x(),
            distance: nearest.map(|(_, distance)| distance),
            max_distance: config.max_snap_distance,
        }),
    }
}
