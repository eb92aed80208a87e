//! Bus network model

pub mod network;
pub mod types;

pub use network::TransitGraph;
pub use types::{TransitSegment, TransitStop};
