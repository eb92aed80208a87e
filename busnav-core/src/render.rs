//! Colored node/edge scenes for drawing a city graph or a narrated path.
//!
//! Scenes are built from read-only views of the graph; per-piece travel
//! times of expanded bus hops live only in the scene.

use geo::{LineString, Point};
use geojson::{Feature, FeatureCollection, Geometry, Value as GeoJsonValue};
use hashbrown::{HashMap, HashSet};
use itertools::Itertools;
use serde::Serialize;
use serde_json::json;

use crate::model::{CityEdge, CityGraph, CityNode};
use crate::routing::{Highlight, Narration, Path};
use crate::{Error, NodeId, Seconds};

const SOURCE_SIZE: u32 = 30;
const STOP_SIZE_ON_PATH: u32 = 15;
const STOP_SIZE: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    Black,
    Red,
    Green,
    Blue,
    Orange,
    Magenta,
}

impl Color {
    pub fn hex(self) -> &'static str {
        match self {
            Color::Black => "#000000",
            Color::Red => "#ff0000",
            Color::Green => "#00ff00",
            Color::Blue => "#0000ff",
            Color::Orange => "#ffa500",
            Color::Magenta => "#ff00ff",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneNode {
    pub id: NodeId,
    pub geometry: Point<f64>,
    pub color: Color,
    pub size: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneEdge {
    pub from: NodeId,
    pub to: NodeId,
    pub color: Color,
    pub travel_time: Seconds,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Scene {
    pub nodes: Vec<SceneNode>,
    pub edges: Vec<SceneEdge>,
}

impl Scene {
    fn push_node(&mut self, seen: &mut HashSet<NodeId>, node: &CityNode, color: Color, size: u32) {
        if seen.insert(node.id()) {
            self.nodes.push(SceneNode {
                id: node.id(),
                geometry: node.geometry(),
                color,
                size,
            });
        }
    }

    /// Total travel time over all scene edges
    pub fn travel_time(&self) -> Seconds {
        self.edges.iter().map(|edge| edge.travel_time).sum()
    }

    /// Converts the scene to a `GeoJSON` `FeatureCollection`: one point
    /// feature per node and one line feature per edge.
    pub fn to_geojson(&self) -> Result<FeatureCollection, Error> {
        let positions: HashMap<NodeId, Point<f64>> = self
            .nodes
            .iter()
            .map(|node| (node.id, node.geometry))
            .collect();

        let mut features = Vec::with_capacity(self.nodes.len() + self.edges.len());
        for node in &self.nodes {
            let geometry = Geometry::new(GeoJsonValue::from(&node.geometry));
            let value = json!({
                "type": "Feature",
                "geometry": geometry,
                "properties": {
                    "id": node.id,
                    "color": node.color.hex(),
                    "size": node.size,
                }
            });
            features.push(to_feature(value)?);
        }

        for edge in &self.edges {
            let (Some(from), Some(to)) = (positions.get(&edge.from), positions.get(&edge.to))
            else {
                return Err(Error::GeoJsonError(format!(
                    "Edge {}-{} references a node outside the scene",
                    edge.from, edge.to
                )));
            };
            let line = LineString::from(vec![from.0, to.0]);
            let geometry = Geometry::new(GeoJsonValue::from(&line));
            let value = json!({
                "type": "Feature",
                "geometry": geometry,
                "properties": {
                    "from": edge.from,
                    "to": edge.to,
                    "color": edge.color.hex(),
                    "travel_time": edge.travel_time,
                }
            });
            features.push(to_feature(value)?);
        }

        Ok(FeatureCollection {
            features,
            bbox: None,
            foreign_members: None,
        })
    }

    pub fn to_geojson_string(&self) -> Result<String, Error> {
        serde_json::to_string(&self.to_geojson()?).map_err(|e| Error::GeoJsonError(e.to_string()))
    }
}

fn to_feature(value: serde_json::Value) -> Result<Feature, Error> {
    serde_json::from_value::<Feature>(value).map_err(|e| Error::GeoJsonError(e.to_string()))
}

fn edge_color(edge: &CityEdge) -> Color {
    match edge {
        CityEdge::Street { .. } => Color::Red,
        CityEdge::Link { .. } => Color::Green,
        CityEdge::TransitLine { .. } => Color::Blue,
    }
}

/// Whole-graph scene: intersections as invisible points, stops as small dots
pub fn city_scene(city: &CityGraph) -> Scene {
    let mut scene = Scene::default();
    let mut seen = HashSet::with_capacity(city.node_count());

    for node in city.nodes().sorted_by_key(|node| node.id()) {
        let size = if node.is_stop() { STOP_SIZE } else { 0 };
        scene.push_node(&mut seen, node, Color::Black, size);
    }

    scene.edges = city
        .edges()
        .map(|(from, to, edge)| SceneEdge {
            from,
            to,
            color: edge_color(edge),
            travel_time: edge.weight(),
        })
        .collect();

    scene
}

/// Scene of a single path. Bus hops are drawn along the streets between the
/// intersections linked to their stops, splitting the hop time evenly over
/// the drawn pieces.
pub fn path_scene(path: &Path<'_>, narration: &Narration) -> Scene {
    let city = path.city();
    let mut scene = Scene::default();
    let mut seen = HashSet::new();

    for &id in path.nodes() {
        let Some(node) = city.node(id) else { continue };
        let (color, size) = match narration.highlights.get(&id) {
            Some(Highlight::Source) => (Color::Magenta, SOURCE_SIZE),
            Some(Highlight::Destination) => (Color::Green, SOURCE_SIZE),
            Some(Highlight::Boarding | Highlight::Transfer) => (Color::Orange, STOP_SIZE_ON_PATH),
            _ if node.is_stop() => (Color::Black, STOP_SIZE_ON_PATH),
            _ => (Color::Black, 0),
        };
        scene.push_node(&mut seen, node, color, size);
    }

    for (a, b) in path.nodes().iter().copied().tuple_windows() {
        let Some(edge) = city.edge_between(a, b) else { continue };
        match edge {
            CityEdge::TransitLine { weight, .. } => {
                expand_ride(&mut scene, &mut seen, city, a, b, *weight);
            }
            _ => scene.edges.push(SceneEdge {
                from: a,
                to: b,
                color: edge_color(edge),
                travel_time: edge.weight(),
            }),
        }
    }

    scene
}

fn expand_ride(
    scene: &mut Scene,
    seen: &mut HashSet<NodeId>,
    city: &CityGraph,
    from: NodeId,
    to: NodeId,
    weight: Seconds,
) {
    let street = city
        .linked_intersection(from)
        .zip(city.linked_intersection(to))
        .and_then(|(a, b)| city.street_path(a, b));

    let Some(street) = street else {
        scene.edges.push(SceneEdge {
            from,
            to,
            color: Color::Blue,
            travel_time: weight,
        });
        return;
    };

    for &id in &street {
        if let Some(node) = city.node(id) {
            scene.push_node(seen, node, Color::Black, 0);
        }
    }

    let waypoints: Vec<NodeId> = std::iter::once(from)
        .chain(street.iter().copied())
        .chain(std::iter::once(to))
        .collect();
    #[allow(clippy::cast_precision_loss)]
    let piece = weight / (waypoints.len() - 1) as f64;

    scene
        .edges
        .extend(waypoints.iter().tuple_windows().map(|(&a, &b)| SceneEdge {
            from: a,
            to: b,
            color: Color::Blue,
            travel_time: piece,
        }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::{RoutingConfig, find_path, narrate};
    use crate::test_helpers::{at, fixture_city};

    #[test]
    fn city_scene_colors_by_edge_kind() {
        let city = fixture_city();
        let scene = city_scene(&city);

        assert_eq!(scene.nodes.len(), city.node_count());
        assert_eq!(scene.edges.len(), city.edge_count());
        assert_eq!(
            scene.edges.iter().filter(|e| e.color == Color::Blue).count(),
            3
        );
        assert_eq!(
            scene.edges.iter().filter(|e| e.color == Color::Green).count(),
            4
        );
        let stop = scene.nodes.iter().find(|n| n.id == 101).unwrap();
        assert_eq!((stop.color, stop.size), (Color::Black, STOP_SIZE));
    }

    #[test]
    fn path_scene_marks_endpoints_and_boardings() {
        let city = fixture_city();
        let path = find_path(&city, at(&city, 1), at(&city, 4), &RoutingConfig::default()).unwrap();
        let scene = path_scene(&path, &narrate(&path));

        let node = |id: NodeId| scene.nodes.iter().find(|n| n.id == id).unwrap();
        assert_eq!(node(1).color, Color::Magenta);
        assert_eq!(node(1).size, SOURCE_SIZE);
        assert_eq!(node(4).color, Color::Green);
        assert_eq!(node(101).color, Color::Orange);
        assert_eq!(node(103).color, Color::Orange);
        assert_eq!((node(102).color, node(102).size), (Color::Black, STOP_SIZE_ON_PATH));
    }

    #[test]
    fn expanded_rides_keep_total_time() {
        let city = fixture_city();
        let path = find_path(&city, at(&city, 1), at(&city, 4), &RoutingConfig::default()).unwrap();
        let scene = path_scene(&path, &narrate(&path));

        // each 60 s ride becomes stop -> 2 intersections -> stop
        let rides: Vec<_> = scene.edges.iter().filter(|e| e.color == Color::Blue).collect();
        assert_eq!(rides.len(), 9);
        assert!(rides.iter().all(|e| (e.travel_time - 20.0).abs() < 1e-9));
        assert!((scene.travel_time() - path.travel_time()).abs() < 1e-9);
    }

    #[test]
    fn rendering_leaves_graph_weights_untouched() {
        let city = fixture_city();
        let before: Vec<_> = city.edges().map(|(a, b, e)| (a, b, e.clone())).collect();

        let path = find_path(&city, at(&city, 1), at(&city, 4), &RoutingConfig::default()).unwrap();
        let _ = path_scene(&path, &narrate(&path));
        let _ = path_scene(&path, &narrate(&path));

        let after: Vec<_> = city.edges().map(|(a, b, e)| (a, b, e.clone())).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn geojson_has_a_feature_per_node_and_edge() {
        let city = fixture_city();
        let path = find_path(&city, at(&city, 1), at(&city, 2), &RoutingConfig::default()).unwrap();
        let scene = path_scene(&path, &narrate(&path));

        let collection = scene.to_geojson().unwrap();
        assert_eq!(collection.features.len(), scene.nodes.len() + scene.edges.len());

        let text = scene.to_geojson_string().unwrap();
        assert!(text.contains("\"travel_time\""));
        assert!(text.contains(Color::Magenta.hex()));
    }
}
