//! Shared entry point for answering route queries against one city graph.

use std::collections::BTreeMap;
use std::sync::Arc;

use geo::Point;
use log::debug;
use serde::Serialize;

use crate::model::CityGraph;
use crate::render::{Scene, path_scene};
use crate::routing::{Highlight, Instruction, Narration, Path, RoutingConfig, find_path, narrate};
use crate::{Error, NodeId, Seconds};

/// Answer to a single route query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutePlan {
    pub node_sequence: Vec<NodeId>,
    pub total_minutes: u64,
    pub travel_time: Seconds,
    pub instructions: Vec<Instruction>,
    /// Human-readable rendition of `instructions`
    pub text: Vec<String>,
    pub highlights: BTreeMap<NodeId, Highlight>,
}

/// Cheap to clone; clones share the same graph.
#[derive(Debug, Clone)]
pub struct RoutePlanner {
    city: Arc<CityGraph>,
    config: RoutingConfig,
}

impl RoutePlanner {
    pub fn new(city: impl Into<Arc<CityGraph>>, config: RoutingConfig) -> Self {
        Self {
            city: city.into(),
            config,
        }
    }

    pub fn city(&self) -> &CityGraph {
        &self.city
    }

    pub fn config(&self) -> &RoutingConfig {
        &self.config
    }

    /// Plans the fastest walking + bus route between two coordinates.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfBounds`] or [`Error::NoPath`] from the path search.
    pub fn plan_route(
        &self,
        source: Point<f64>,
        destination: Point<f64>,
    ) -> Result<RoutePlan, Error> {
        let path = find_path(&self.city, source, destination, &self.config)?;
        let narration = narrate(&path);
        Ok(self.assemble(&path, narration))
    }

    /// Same as [`RoutePlanner::plan_route`], also returning the drawable path scene.
    pub fn plan_route_with_scene(
        &self,
        source: Point<f64>,
        destination: Point<f64>,
    ) -> Result<(RoutePlan, Scene), Error> {
        let path = find_path(&self.city, source, destination, &self.config)?;
        let narration = narrate(&path);
        let scene = path_scene(&path, &narration);
        Ok((self.assemble(&path, narration), scene))
    }

    fn assemble(&self, path: &Path<'_>, narration: Narration) -> RoutePlan {
        let text = narration.describe(&self.city);

        debug!(
            "Planned {} -> {}: {} min, {} instructions",
            path.source(),
            path.destination(),
            path.total_minutes(),
            narration.instructions.len()
        );

        RoutePlan {
            node_sequence: path.nodes().to_vec(),
            total_minutes: path.total_minutes(),
            travel_time: path.travel_time(),
            instructions: narration.instructions,
            text,
            highlights: narration.highlights,
        }
    }
}
