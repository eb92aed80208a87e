//! Nearest-node lookups over geographic points.
//!
//! Points are stored in an R-tree after an equirectangular projection scaled
//! at the mean latitude of the indexed set, which keeps planar nearest
//! neighbours consistent with great-circle ones at city scale. Reported
//! distances are haversine meters.

use geo::{Distance, Haversine, Point};
use rayon::prelude::*;
use rstar::{RTree, primitives::GeomWithData};

use crate::{Meters, NodeId};

/// R-tree entry: projected coordinates carrying the node id and its real position
pub type IndexedPoint = GeomWithData<[f64; 2], (NodeId, Point<f64>)>;

#[derive(Debug, Clone)]
pub struct SpatialIndex {
    tree: RTree<IndexedPoint>,
    lon_scale: f64,
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self {
            tree: RTree::new(),
            lon_scale: 1.0,
        }
    }
}

impl SpatialIndex {
    #[allow(clippy::cast_precision_loss)]
    pub fn new(points: impl IntoIterator<Item = (NodeId, Point<f64>)>) -> Self {
        let points: Vec<(NodeId, Point<f64>)> = points.into_iter().collect();
        if points.is_empty() {
            return Self::default();
        }

        let mean_lat = points.iter().map(|(_, p)| p.y()).sum::<f64>() / points.len() as f64;
        let lon_scale = mean_lat.to_radians().cos().abs().max(1e-6);

        let entries = points
            .into_iter()
            .map(|(id, point)| GeomWithData::new(project(point, lon_scale), (id, point)))
            .collect();

        Self {
            tree: RTree::bulk_load(entries),
            lon_scale,
        }
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Nearest indexed node and its distance in meters.
    ///
    /// Exact ties resolve to the smallest node id.
    pub fn nearest(&self, point: &Point<f64>) -> Option<(NodeId, Meters)> {
        let query = project(*point, self.lon_scale);
        let mut candidates = self.tree.nearest_neighbor_iter_with_distance_2(&query);

        let (first, best_distance_2) = candidates.next()?;
        let mut chosen = first.data;
        for (candidate, distance_2) in candidates {
            if distance_2 > best_distance_2 {
                break;
            }
            if candidate.data.0 < chosen.0 {
                chosen = candidate.data;
            }
        }

        Some((chosen.0, Haversine.distance(*point, chosen.1)))
    }

    /// Batch version of [`SpatialIndex::nearest`], results in input order
    pub fn nearest_many(&self, points: &[Point<f64>]) -> Vec<Option<(NodeId, Meters)>> {
        points.par_iter().map(|point| self.nearest(point)).collect()
    }
}

fn project(point: Point<f64>, lon_scale: f64) -> [f64; 2] {
    [point.x() * lon_scale, point.y()]
}
