//! File-based providers for the street and bus networks

mod parser;
mod processor;
mod raw_types;

pub use parser::deserialize_csv_file;
pub use processor::{load_street_graph, load_transit_graph};
pub use raw_types::{RawLineStop, RawStop, RawStreetEdge, RawStreetNode};
