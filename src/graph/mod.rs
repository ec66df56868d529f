mod component;
mod dijkstra;
mod gfa;
mod model;

pub use component::Component;
pub use dijkstra::{bounded_dijkstra, reached_vertices, Direction};
pub use gfa::{load_gfa, parse_gfa, records_to_graph, GfaLink, GfaRecords, GfaSegment};
pub use model::{reverse_complement, EdgeId, Graph, GraphBuilder, VertexId};

use crate::utils::{uncompressed_name, Result};
use std::path::Path;

/// Loads an assembly graph, dispatching on the file extension.
pub fn load_graph(path: &Path, k: usize) -> Result<Graph> {
    let name = uncompressed_name(path);
    if name.ends_with(".gfa") {
        load_gfa(path, k)
    } else {
        Err(format!(
            "Unsupported graph format: {} (expected .gfa or .gfa.gz)",
            path.display()
        ))
    }
}
