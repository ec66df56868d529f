use super::{EdgeId, Graph, VertexId};
use std::collections::{BTreeMap, BTreeSet};

/// Vertex-induced subgraph used as the search space around a seed.
#[derive(Debug, Clone)]
pub struct Component<'g> {
    graph: &'g Graph,
    vertices: BTreeSet<VertexId>,
    edges: BTreeSet<EdgeId>,
    incoming: BTreeMap<VertexId, Vec<EdgeId>>,
    outgoing: BTreeMap<VertexId, Vec<EdgeId>>,
}

impl<'g> Component<'g> {
    /// Builds the component induced by `vertices`, optionally closing it under
    /// vertex conjugation so that both strands are covered.
    pub fn from_vertices<I>(graph: &'g Graph, vertices: I, add_conjugate: bool) -> Self
    where
        I: IntoIterator<Item = VertexId>,
    {
        let mut vertex_set = BTreeSet::new();
        for v in vertices {
            vertex_set.insert(v);
            if add_conjugate {
                vertex_set.insert(graph.conjugate_vertex(v));
            }
        }

        let mut edges = BTreeSet::new();
        let mut incoming: BTreeMap<VertexId, Vec<EdgeId>> = BTreeMap::new();
        let mut outgoing: BTreeMap<VertexId, Vec<EdgeId>> = BTreeMap::new();
        for &v in &vertex_set {
            for &e in graph.outgoing_edges(v) {
                let end = graph.edge_end(e);
                if vertex_set.contains(&end) {
                    edges.insert(e);
                    outgoing.entry(v).or_default().push(e);
                    incoming.entry(end).or_default().push(e);
                }
            }
        }
        for list in incoming.values_mut().chain(outgoing.values_mut()) {
            list.sort_unstable();
            list.dedup();
        }

        Component {
            graph,
            vertices: vertex_set,
            edges,
            incoming,
            outgoing,
        }
    }

    pub fn graph(&self) -> &'g Graph {
        self.graph
    }

    pub fn k(&self) -> usize {
        self.graph.k()
    }

    pub fn v_size(&self) -> usize {
        self.vertices.len()
    }

    pub fn e_size(&self) -> usize {
        self.edges.len()
    }

    pub fn vertices(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.vertices.iter().copied()
    }

    /// Edges in ascending id order.
    pub fn edges(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.edges.iter().copied()
    }

    pub fn contains_vertex(&self, v: VertexId) -> bool {
        self.vertices.contains(&v)
    }

    pub fn contains_edge(&self, e: EdgeId) -> bool {
        self.edges.contains(&e)
    }

    /// In-component edges leaving `v`, ascending by id.
    pub fn outgoing(&self, v: VertexId) -> &[EdgeId] {
        self.outgoing.get(&v).map(Vec::as_slice).unwrap_or(&[])
    }

    /// In-component edges entering `v`, ascending by id.
    pub fn incoming(&self, v: VertexId) -> &[EdgeId] {
        self.incoming.get(&v).map(Vec::as_slice).unwrap_or(&[])
    }

    /// True when no in-component edge enters `v`.
    pub fn is_source(&self, v: VertexId) -> bool {
        self.incoming(v).is_empty()
    }

    pub fn nucls(&self, e: EdgeId) -> &'g [u8] {
        self.graph.edge_nucls(e)
    }
}
