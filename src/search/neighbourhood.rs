//! Bounded subgraphs around seed edges.

use crate::graph::{reached_vertices, Direction, EdgeId, Graph, VertexId};
use std::collections::{BTreeMap, BTreeSet};

/// Per-edge profile overhangs `(left, right)` in profile positions.
pub type EdgeAlnInfo = BTreeMap<EdgeId, (i64, i64)>;

/// Vertex neighbourhood of each seed edge, keyed by the seed ("leader").
pub type Neighbourhoods = BTreeMap<EdgeId, BTreeSet<VertexId>>;

/// Records a hit's overhangs, keeping the larger value on each side when the
/// edge was already matched.
pub fn record_overhang(info: &mut EdgeAlnInfo, edge: EdgeId, left: i64, right: i64) {
    info.entry(edge)
        .and_modify(|(l, r)| {
            *l = (*l).max(left);
            *r = (*r).max(right);
        })
        .or_insert((left, right));
}

/// Collects the vertices within overhang reach of every matched edge. `mult`
/// converts profile positions to nucleotides, with slack.
pub fn extract_neighbourhoods(graph: &Graph, matched: &EdgeAlnInfo, mult: i64) -> Neighbourhoods {
    let mut neighbourhoods = Neighbourhoods::new();
    for (&edge, &(left, right)) in matched {
        let (left, right) = (left * mult, right * mult);
        let start = graph.edge_start(edge);
        let end = graph.edge_end(edge);
        let mut vertices = BTreeSet::new();

        if right > 0 {
            vertices.extend(reached_vertices(graph, end, right as usize, Direction::Forward));
        }
        if left > 0 {
            vertices.extend(reached_vertices(graph, start, left as usize, Direction::Backward));
        }
        vertices.insert(start);
        vertices.insert(end);

        log::debug!(
            "Edge {} overhangs ({}, {}): {} vertices",
            edge,
            left,
            right,
            vertices.len()
        );
        neighbourhoods.insert(edge, vertices);
    }
    neighbourhoods
}

fn touches(graph: &Graph, vertices: &BTreeSet<VertexId>, leader: EdgeId) -> bool {
    vertices.contains(&graph.edge_start(leader)) || vertices.contains(&graph.edge_end(leader))
}

/// Merges every neighbourhood that contains an endpoint of another's leader
/// into the earlier one, until no such pair remains.
pub fn join_neighbourhoods(
    graph: &Graph,
    neighbourhoods: impl IntoIterator<Item = (EdgeId, BTreeSet<VertexId>)>,
) -> Vec<(EdgeId, BTreeSet<VertexId>)> {
    let mut groups: Vec<(EdgeId, BTreeSet<VertexId>)> = neighbourhoods.into_iter().collect();
    'merge: loop {
        for a in 0..groups.len() {
            for b in 0..groups.len() {
                if a == b || !touches(graph, &groups[a].1, groups[b].0) {
                    continue;
                }
                let (absorbed, vertices) = groups.remove(b);
                let a = if b < a { a - 1 } else { a };
                log::debug!("Joining neighbourhood of {} into {}", absorbed, groups[a].0);
                groups[a].1.extend(vertices);
                continue 'merge;
            }
        }
        break;
    }
    groups
}
