//! Data model for walking + bus routing
//!
//! Contains the two input networks, the fused city graph built from them and
//! the spatial index they share.

pub mod city;
pub mod spatial;
pub mod streets;
pub mod transit;

pub use city::{CityEdge, CityGraph, CityNode, EdgeKind, NodeKind};
pub use spatial::{IndexedPoint, SpatialIndex};
pub use streets::{StreetEdge, StreetGraph, StreetNode};
pub use transit::{TransitGraph, TransitSegment, TransitStop};
