//! JSON persistence for city and street graphs.
//!
//! Both graphs are stored inside a small envelope:
//!
//! ```json
//! { "kind": "city_graph", "format_version": 1, "graph": { "nodes": [...], "edges": [...] } }
//! ```
//!
//! Loading always goes through the validating constructors, so a payload
//! that decodes but breaks a graph invariant is rejected as well.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use log::info;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::model::{CityEdge, CityGraph, CityNode, StreetGraph, StreetNode};
use crate::{Error, Meters, NodeId};

pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphKind {
    CityGraph,
    StreetGraph,
}

impl GraphKind {
    fn name(self) -> &'static str {
        match self {
            GraphKind::CityGraph => "city graph",
            GraphKind::StreetGraph => "street graph",
        }
    }
}

#[derive(Serialize)]
struct Envelope<'a, T> {
    kind: GraphKind,
    format_version: u32,
    graph: &'a T,
}

#[derive(Deserialize)]
struct RawEnvelope {
    kind: GraphKind,
    format_version: u32,
    graph: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct EdgeRecord<E> {
    a: NodeId,
    b: NodeId,
    edge: E,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CityGraphSnapshot {
    nodes: Vec<CityNode>,
    edges: Vec<EdgeRecord<CityEdge>>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct StreetSegment {
    length: Meters,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StreetGraphSnapshot {
    nodes: Vec<StreetNode>,
    edges: Vec<EdgeRecord<StreetSegment>>,
}

impl From<&CityGraph> for CityGraphSnapshot {
    fn from(city: &CityGraph) -> Self {
        Self {
            nodes: city.nodes().cloned().collect(),
            edges: city
                .edges()
                .map(|(a, b, edge)| EdgeRecord {
                    a,
                    b,
                    edge: edge.clone(),
                })
                .collect(),
        }
    }
}

impl From<&StreetGraph> for StreetGraphSnapshot {
    fn from(streets: &StreetGraph) -> Self {
        Self {
            nodes: streets.nodes().cloned().collect(),
            edges: streets
                .edges()
                .map(|(a, b, length)| EdgeRecord {
                    a,
                    b,
                    edge: StreetSegment { length },
                })
                .collect(),
        }
    }
}

fn encode<T: Serialize, W: Write>(kind: GraphKind, graph: &T, writer: W) -> Result<(), Error> {
    let envelope = Envelope {
        kind,
        format_version: FORMAT_VERSION,
        graph,
    };
    serde_json::to_writer(writer, &envelope).map_err(|e| {
        if e.is_io() {
            Error::IoError(e.into())
        } else {
            Error::InvalidData(format!("Cannot encode {}: {e}", kind.name()))
        }
    })
}

fn decode<T: DeserializeOwned, R: Read>(expected: GraphKind, reader: R) -> Result<T, Error> {
    let mismatch = |reason: String| Error::SerializationType {
        expected: expected.name(),
        reason,
    };

    let envelope: RawEnvelope = serde_json::from_reader(reader).map_err(|e| {
        if e.is_io() {
            Error::IoError(e.into())
        } else {
            mismatch(e.to_string())
        }
    })?;

    if envelope.kind != expected {
        return Err(mismatch(format!("payload holds a {}", envelope.kind.name())));
    }
    if envelope.format_version != FORMAT_VERSION {
        return Err(mismatch(format!(
            "unsupported format version {} (expected {FORMAT_VERSION})",
            envelope.format_version
        )));
    }

    serde_json::from_value(envelope.graph).map_err(|e| mismatch(e.to_string()))
}

pub fn city_graph_to_writer<W: Write>(city: &CityGraph, writer: W) -> Result<(), Error> {
    encode(GraphKind::CityGraph, &CityGraphSnapshot::from(city), writer)
}

/// Reads a city graph written by [`city_graph_to_writer`].
///
/// # Errors
///
/// [`Error::SerializationType`] if the payload is not a city graph, and
/// [`Error::InvalidData`] if the decoded graph breaks a graph invariant.
pub fn city_graph_from_reader<R: Read>(reader: R) -> Result<CityGraph, Error> {
    let snapshot: CityGraphSnapshot = decode(GraphKind::CityGraph, reader)?;
    CityGraph::from_parts(
        snapshot.nodes,
        snapshot
            .edges
            .into_iter()
            .map(|record| (record.a, record.b, record.edge)),
    )
}

pub fn street_graph_to_writer<W: Write>(streets: &StreetGraph, writer: W) -> Result<(), Error> {
    encode(
        GraphKind::StreetGraph,
        &StreetGraphSnapshot::from(streets),
        writer,
    )
}

pub fn street_graph_from_reader<R: Read>(reader: R) -> Result<StreetGraph, Error> {
    let snapshot: StreetGraphSnapshot = decode(GraphKind::StreetGraph, reader)?;
    StreetGraph::new(
        snapshot.nodes,
        snapshot
            .edges
            .into_iter()
            .map(|record| (record.a, record.b, record.edge.length)),
    )
}

pub fn save_city_graph(city: &CityGraph, path: &Path) -> Result<(), Error> {
    let mut writer = BufWriter::new(File::create(path)?);
    city_graph_to_writer(city, &mut writer)?;
    writer.flush()?;
    info!(
        "Saved city graph ({} nodes, {} edges) to {}",
        city.node_count(),
        city.edge_count(),
        path.display()
    );
    Ok(())
}

pub fn load_city_graph(path: &Path) -> Result<CityGraph, Error> {
    let city = city_graph_from_reader(BufReader::new(File::open(path)?))?;
    info!(
        "Loaded city graph ({} nodes, {} edges) from {}",
        city.node_count(),
        city.edge_count(),
        path.display()
    );
    Ok(city)
}

pub fn save_street_graph(streets: &StreetGraph, path: &Path) -> Result<(), Error> {
    let mut writer = BufWriter::new(File::create(path)?);
    street_graph_to_writer(streets, &mut writer)?;
    writer.flush()?;
    Ok(())
}

pub fn load_street_graph(path: &Path) -> Result<StreetGraph, Error> {
    street_graph_from_reader(BufReader::new(File::open(path)?))
}

#[cfg(test)]
mod tests {
    use geo::Point;

    use super::*;
    use crate::test_helpers::fixture_city;

    fn streets() -> StreetGraph {
        StreetGraph::new(
            [
                StreetNode {
                    id: 1,
                    geometry: Point::new(2.0, 41.0),
                },
                StreetNode {
                    id: 2,
                    geometry: Point::new(2.001, 41.0),
                },
            ],
            [(1, 2, 84.0)],
        )
        .unwrap()
    }

    #[test]
    fn city_graph_round_trip() {
        let city = fixture_city();
        let mut buffer = Vec::new();
        city_graph_to_writer(&city, &mut buffer).unwrap();

        let loaded = city_graph_from_reader(buffer.as_slice()).unwrap();

        assert_eq!(loaded.node_count(), city.node_count());
        assert_eq!(loaded.edge_count(), city.edge_count());
        for node in city.nodes() {
            assert_eq!(loaded.node(node.id()), Some(node));
        }
        for (a, b, edge) in city.edges() {
            assert_eq!(loaded.edge_between(a, b), Some(edge));
        }
        assert_eq!(loaded.linked_intersection(103), Some(3));
    }

    #[test]
    fn street_graph_round_trip() {
        let original = streets();
        let mut buffer = Vec::new();
        street_graph_to_writer(&original, &mut buffer).unwrap();

        let loaded = street_graph_from_reader(buffer.as_slice()).unwrap();
        assert_eq!(loaded.edges().collect::<Vec<_>>(), vec![(1, 2, 84.0)]);
        assert_eq!(loaded.node(2), original.node(2));
    }

    #[test]
    fn street_payload_is_not_a_city_graph() {
        let mut buffer = Vec::new();
        street_graph_to_writer(&streets(), &mut buffer).unwrap();

        let result = city_graph_from_reader(buffer.as_slice());
        assert!(matches!(
            result,
            Err(Error::SerializationType {
                expected: "city graph",
                ..
            })
        ));
    }

    #[test]
    fn garbage_is_a_serialization_error() {
        let result = street_graph_from_reader(&b"not json at all"[..]);
        assert!(matches!(result, Err(Error::SerializationType { .. })));

        let result = city_graph_from_reader(
            &br#"{"kind":"city_graph","format_version":1,"graph":{"nodes":7}}"#[..],
        );
        assert!(matches!(result, Err(Error::SerializationType { .. })));
    }

    #[test]
    fn future_version_is_rejected() {
        let payload = br#"{"kind":"street_graph","format_version":2,"graph":{"nodes":[],"edges":[]}}"#;
        let result = street_graph_from_reader(&payload[..]);
        assert!(matches!(result, Err(Error::SerializationType { .. })));
    }

    #[test]
    fn decoded_graph_is_validated() {
        let payload = br#"{"kind":"city_graph","format_version":1,"graph":{
            "nodes":[{"kind":"stop","id":5,"name":"Lonely","geometry":{"x":2.0,"y":41.0}}],
            "edges":[]}}"#;
        let result = city_graph_from_reader(&payload[..]);
        assert!(matches!(result, Err(Error::InvalidData(_))));
    }
}
