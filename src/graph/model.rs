use crate::utils::Result;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EdgeId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VertexId(usize);

impl EdgeId {
    /// Stable external identifier, starting at 1.
    pub fn int_id(&self) -> u64 {
        self.0 as u64 + 1
    }

    fn index(&self) -> usize {
        self.0
    }
}

impl VertexId {
    pub fn int_id(&self) -> u64 {
        self.0 as u64 + 1
    }

    fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.int_id())
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.int_id())
    }
}

#[derive(Debug, Clone)]
struct EdgeData {
    start: VertexId,
    end: VertexId,
    nucls: Vec<u8>,
    conjugate: EdgeId,
}

#[derive(Debug, Clone)]
struct VertexData {
    incoming: Vec<EdgeId>,
    outgoing: Vec<EdgeId>,
    conjugate: VertexId,
}

/// Read-only de Bruijn style sequence graph.
///
/// Consecutive edges share `k` nucleotides: the last `k` letters of an edge are
/// the first `k` letters of every edge leaving its end vertex. Every edge and
/// vertex has a reverse-complement conjugate.
#[derive(Debug, Clone)]
pub struct Graph {
    k: usize,
    edges: Vec<EdgeData>,
    vertices: Vec<VertexData>,
}

impl Graph {
    pub fn k(&self) -> usize {
        self.k
    }

    /// Number of vertices.
    pub fn size(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn vertices(&self) -> impl Iterator<Item = VertexId> {
        (0..self.vertices.len()).map(VertexId)
    }

    pub fn edges(&self) -> impl Iterator<Item = EdgeId> {
        (0..self.edges.len()).map(EdgeId)
    }

    pub fn outgoing_edges(&self, v: VertexId) -> &[EdgeId] {
        &self.vertices[v.index()].outgoing
    }

    pub fn incoming_edges(&self, v: VertexId) -> &[EdgeId] {
        &self.vertices[v.index()].incoming
    }

    pub fn edge_start(&self, e: EdgeId) -> VertexId {
        self.edges[e.index()].start
    }

    pub fn edge_end(&self, e: EdgeId) -> VertexId {
        self.edges[e.index()].end
    }

    pub fn edge_nucls(&self, e: EdgeId) -> &[u8] {
        &self.edges[e.index()].nucls
    }

    /// Edge length without the k-overlap.
    pub fn length(&self, e: EdgeId) -> usize {
        self.edges[e.index()].nucls.len() - self.k
    }

    pub fn conjugate(&self, e: EdgeId) -> EdgeId {
        self.edges[e.index()].conjugate
    }

    pub fn conjugate_vertex(&self, v: VertexId) -> VertexId {
        self.vertices[v.index()].conjugate
    }

    pub fn edge_by_int_id(&self, int_id: u64) -> Option<EdgeId> {
        let index = usize::try_from(int_id.checked_sub(1)?).ok()?;
        (index < self.edges.len()).then_some(EdgeId(index))
    }
}

pub fn reverse_complement(seq: &[u8]) -> Vec<u8> {
    seq.iter()
        .rev()
        .map(|base| match base {
            b'A' => b'T',
            b'C' => b'G',
            b'G' => b'C',
            b'T' => b'A',
            b'a' => b't',
            b'c' => b'g',
            b'g' => b'c',
            b't' => b'a',
            other => *other,
        })
        .collect()
}

/// Incrementally assembles a [`Graph`], maintaining conjugate symmetry.
#[derive(Debug)]
pub struct GraphBuilder {
    graph: Graph,
}

impl GraphBuilder {
    pub fn new(k: usize) -> Self {
        GraphBuilder {
            graph: Graph {
                k,
                edges: Vec::new(),
                vertices: Vec::new(),
            },
        }
    }

    /// Adds a vertex together with its conjugate and returns the former.
    pub fn add_vertex(&mut self) -> VertexId {
        let v = VertexId(self.graph.vertices.len());
        let conj = VertexId(v.0 + 1);
        self.graph.vertices.push(VertexData {
            incoming: Vec::new(),
            outgoing: Vec::new(),
            conjugate: conj,
        });
        self.graph.vertices.push(VertexData {
            incoming: Vec::new(),
            outgoing: Vec::new(),
            conjugate: v,
        });
        v
    }

    /// Adds a vertex whose k-mer is its own reverse complement.
    pub fn add_self_conjugate_vertex(&mut self) -> VertexId {
        let v = VertexId(self.graph.vertices.len());
        self.graph.vertices.push(VertexData {
            incoming: Vec::new(),
            outgoing: Vec::new(),
            conjugate: v,
        });
        v
    }

    pub fn conjugate_vertex(&self, v: VertexId) -> VertexId {
        self.graph.conjugate_vertex(v)
    }

    /// Adds the edge `start -> end` and its reverse-complement conjugate.
    pub fn add_edge(&mut self, start: VertexId, end: VertexId, nucls: &[u8]) -> Result<EdgeId> {
        let k = self.graph.k;
        if nucls.len() < k + 1 {
            return Err(format!(
                "Edge sequence of length {} is shorter than k+1 = {}",
                nucls.len(),
                k + 1
            ));
        }
        for v in [start, end] {
            if v.index() >= self.graph.vertices.len() {
                return Err(format!("Unknown vertex {}", v));
            }
        }

        let nucls = nucls.to_ascii_uppercase();
        let e = EdgeId(self.graph.edges.len());
        let conj = EdgeId(e.0 + 1);
        let conj_start = self.graph.conjugate_vertex(end);
        let conj_end = self.graph.conjugate_vertex(start);

        self.graph.edges.push(EdgeData {
            start,
            end,
            nucls: nucls.clone(),
            conjugate: conj,
        });
        self.graph.edges.push(EdgeData {
            start: conj_start,
            end: conj_end,
            nucls: reverse_complement(&nucls),
            conjugate: e,
        });

        self.graph.vertices[start.index()].outgoing.push(e);
        self.graph.vertices[end.index()].incoming.push(e);
        self.graph.vertices[conj_start.index()].outgoing.push(conj);
        self.graph.vertices[conj_end.index()].incoming.push(conj);

        Ok(e)
    }

    /// Validates the k-overlap invariant at every vertex and returns the graph.
    pub fn build(self) -> Result<Graph> {
        let graph = self.graph;
        let k = graph.k;
        for v in graph.vertices() {
            let tails = graph.incoming_edges(v).iter().map(|&e| {
                let nucls = graph.edge_nucls(e);
                (e, &nucls[nucls.len() - k..])
            });
            let heads = graph
                .outgoing_edges(v)
                .iter()
                .map(|&e| (e, &graph.edge_nucls(e)[..k]));
            let mut kmers = tails.chain(heads);
            if let Some((first_edge, reference)) = kmers.next() {
                for (e, kmer) in kmers {
                    if kmer != reference {
                        return Err(format!(
                            "k-overlap mismatch at vertex {}: edge {} has {} but edge {} has {}",
                            v,
                            first_edge,
                            String::from_utf8_lossy(reference),
                            e,
                            String::from_utf8_lossy(kmer)
                        ));
                    }
                }
            }
        }
        Ok(graph)
    }
}
