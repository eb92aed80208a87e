//! Small hand-weighted city graphs shared by unit tests

use std::collections::BTreeSet;

use geo::Point;

use crate::model::{CityEdge, CityGraph, CityNode};
use crate::{LineId, NodeId};

pub(crate) fn lines(ids: &[&str]) -> BTreeSet<LineId> {
    ids.iter().map(|id| (*id).to_string()).collect()
}

pub(crate) fn intersection(id: NodeId, lon: f64, lat: f64) -> CityNode {
    CityNode::Intersection {
        id,
        geometry: Point::new(lon, lat),
    }
}

pub(crate) fn stop(id: NodeId, name: &str, lon: f64, lat: f64) -> CityNode {
    CityNode::Stop {
        id,
        name: name.to_string(),
        geometry: Point::new(lon, lat),
    }
}

pub(crate) fn ride(weight: f64, ids: &[&str]) -> CityEdge {
    CityEdge::TransitLine {
        weight,
        lines: lines(ids),
    }
}

/// Four intersections `1..=4` along one street (600 s apart on foot), each
/// with a stop `101..=104` linked at 60 s. Bus hops take 60 s:
/// `101-102` on lines 10 and 24, `102-103` on 24, `103-104` on 33.
/// Intersection `9` lies ~5.5 km north with no edges.
pub(crate) fn fixture_city() -> CityGraph {
    CityGraph::from_parts(
        [
            intersection(1, 2.000, 41.0),
            intersection(2, 2.010, 41.0),
            intersection(3, 2.020, 41.0),
            intersection(4, 2.030, 41.0),
            intersection(9, 2.000, 41.05),
            stop(101, "Alpha", 2.000, 41.0002),
            stop(102, "Bravo", 2.010, 41.0002),
            stop(103, "Charlie", 2.020, 41.0002),
            stop(104, "Delta", 2.030, 41.0002),
        ],
        [
            (1, 2, CityEdge::Street { weight: 600.0 }),
            (2, 3, CityEdge::Street { weight: 600.0 }),
            (3, 4, CityEdge::Street { weight: 600.0 }),
            (101, 1, CityEdge::Link { weight: 60.0 }),
            (102, 2, CityEdge::Link { weight: 60.0 }),
            (103, 3, CityEdge::Link { weight: 60.0 }),
            (104, 4, CityEdge::Link { weight: 60.0 }),
            (101, 102, ride(60.0, &["10", "24"])),
            (102, 103, ride(60.0, &["24"])),
            (103, 104, ride(60.0, &["33"])),
        ],
    )
    .expect("fixture city is valid")
}

/// Point exactly on intersection `id` of [`fixture_city`]
pub(crate) fn at(city: &CityGraph, id: NodeId) -> Point<f64> {
    city.node(id).expect("node exists").geometry()
}
