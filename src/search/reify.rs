use super::GraphCursor;
use crate::graph::{Component, EdgeId, Graph};
use itertools::Itertools;

/// Edges traversed by a cursor walk, in order. Re-entering an edge (a loop)
/// appends it again.
pub fn to_path<C: GraphCursor>(cursors: &[C], component: &Component) -> Vec<EdgeId> {
    let k = component.k();
    let mut path: Vec<EdgeId> = Vec::new();
    let mut last_position = 0;
    // Leading positions of an edge are shared by every edge leaving the same
    // vertex; such an edge only counts once the walk moves past them on it.
    let mut head_only = false;

    let positions = cursors
        .iter()
        .skip_while(|c| c.is_empty())
        .flat_map(|c| c.nucl_cursors());
    for cursor in positions {
        let (Some(edge), Some(position)) = (cursor.edge(), cursor.position()) else {
            continue;
        };
        if path.last() == Some(&edge) && position > last_position {
            head_only &= position < k;
        } else {
            if head_only {
                path.pop();
            }
            path.push(edge);
            head_only = position < k;
        }
        last_position = position;
    }
    path
}

/// Sequence spelled by consecutive edges, each k-overlap written once.
///
/// Panics when two consecutive edges are not adjacent.
pub fn merge_sequences(graph: &Graph, path: &[EdgeId]) -> String {
    let k = graph.k();
    let mut merged = Vec::new();
    for (i, &edge) in path.iter().enumerate() {
        let nucls = graph.edge_nucls(edge);
        if i == 0 {
            merged.extend_from_slice(nucls);
        } else {
            let prev = path[i - 1];
            assert_eq!(
                graph.edge_end(prev),
                graph.edge_start(edge),
                "edges {} and {} are not adjacent",
                prev,
                edge
            );
            merged.extend_from_slice(&nucls[k..]);
        }
    }
    String::from_utf8_lossy(&merged).into_owned()
}

/// Underscore-joined edge ids naming a path.
pub fn path_name(path: &[EdgeId]) -> String {
    path.iter().map(|e| e.int_id()).join("_")
}
