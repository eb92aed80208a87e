//! Minimum-time routing over the city graph and path narration

pub mod dijkstra;
pub mod instructions;
pub mod path;

pub use instructions::{Highlight, Instruction, Narration, narrate};
pub use path::{Path, RoutingConfig, find_path};
