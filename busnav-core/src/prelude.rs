pub use crate::Error;

// Re-export key components
pub use crate::loading::{CityGraphConfig, NetworkSources, build_city_graph, create_city_graph};
pub use crate::model::{CityEdge, CityGraph, CityNode, StreetGraph, TransitGraph};
pub use crate::persistence::{load_city_graph, save_city_graph};
pub use crate::planner::{RoutePlan, RoutePlanner};
pub use crate::render::{Scene, city_scene, path_scene};
pub use crate::routing::{
    Highlight, Instruction, Narration, Path, RoutingConfig, find_path, narrate,
};

// Core types
pub use crate::LineId;
pub use crate::Meters;
pub use crate::NodeId;
pub use crate::Seconds; // travel time
