use super::{Graph, VertexId};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// Shortest-path expansion from `origin` where an edge weighs its length
/// without the k-overlap. Returns every vertex whose distance is within
/// `bound`, paired with that distance, in order of discovery.
pub fn bounded_dijkstra(
    graph: &Graph,
    origin: VertexId,
    bound: usize,
    direction: Direction,
) -> Vec<(VertexId, usize)> {
    let mut distances: HashMap<VertexId, usize> = HashMap::new();
    let mut settled = Vec::new();
    let mut queue = BinaryHeap::new();

    distances.insert(origin, 0);
    queue.push(Reverse((0, origin)));

    while let Some(Reverse((distance, vertex))) = queue.pop() {
        if distances.get(&vertex).is_some_and(|&d| d < distance) {
            continue;
        }
        settled.push((vertex, distance));

        let edges = match direction {
            Direction::Forward => graph.outgoing_edges(vertex),
            Direction::Backward => graph.incoming_edges(vertex),
        };
        for &edge in edges {
            let neighbour = match direction {
                Direction::Forward => graph.edge_end(edge),
                Direction::Backward => graph.edge_start(edge),
            };
            let candidate = distance + graph.length(edge);
            if candidate > bound {
                continue;
            }
            if distances.get(&neighbour).is_none_or(|&d| candidate < d) {
                distances.insert(neighbour, candidate);
                queue.push(Reverse((candidate, neighbour)));
            }
        }
    }

    settled
}

pub fn reached_vertices(
    graph: &Graph,
    origin: VertexId,
    bound: usize,
    direction: Direction,
) -> Vec<VertexId> {
    bounded_dijkstra(graph, origin, bound, direction)
        .into_iter()
        .map(|(v, _)| v)
        .collect()
}
