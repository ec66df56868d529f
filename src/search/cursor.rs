//! Positions in the emitted-sequence space of a component.
//!
//! Consecutive edges share `k` letters, so the same graph position can be
//! named by several `(edge, offset)` pairs. Cursors only ever use one canonical
//! name per position: offsets `k..len` of every edge, plus the leading `k`
//! offsets of the smallest out-edge of a vertex with no in-component incoming
//! edge. Every other leading position is owned by the incoming edges' tails.

use crate::graph::{Component, EdgeId, VertexId};
use crate::hmm::{encode_nucl, Alphabet};
use arrayvec::ArrayVec;
use std::fmt::Debug;
use std::hash::Hash;

/// Capabilities the path search needs from a cursor kind.
pub trait GraphCursor: Copy + Eq + Ord + Hash + Debug + Send {
    /// Residue alphabet of [`GraphCursor::letter`].
    const ALPHABET: Alphabet;

    fn empty() -> Self;

    fn is_empty(&self) -> bool;

    /// Residue code under the cursor. Must only be called on non-empty cursors.
    fn letter(&self, component: &Component) -> u8;

    /// Successors. The empty cursor precedes every position.
    fn next(&self, component: &Component) -> Vec<Self>;

    /// Predecessors. The empty cursor follows every position.
    fn prev(&self, component: &Component) -> Vec<Self>;

    /// Edge holding the first nucleotide under the cursor.
    fn edge(&self) -> Option<EdgeId>;

    /// Distinct edges the cursor straddles, in walk order.
    fn edges(&self) -> ArrayVec<EdgeId, 3>;

    /// Nucleotide positions covered by the cursor.
    fn nucl_cursors(&self) -> ArrayVec<Cursor, 3>;

    /// Every canonical cursor of `component`, sorted.
    fn all(component: &Component) -> Vec<Self>;
}

/// Nucleotide cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Cursor {
    Empty,
    At { edge: EdgeId, position: usize },
}

impl Cursor {
    pub fn new(edge: EdgeId, position: usize) -> Self {
        Cursor::At { edge, position }
    }

    pub fn position(&self) -> Option<usize> {
        match self {
            Cursor::Empty => None,
            Cursor::At { position, .. } => Some(*position),
        }
    }

    /// Nucleotide letter under the cursor.
    pub fn nucl(&self, component: &Component) -> u8 {
        match self {
            Cursor::Empty => b'N',
            Cursor::At { edge, position } => component.nucls(*edge)[*position],
        }
    }

    /// True when `edge` owns the leading k-mer of its start vertex.
    fn owns_head(component: &Component, edge: EdgeId) -> bool {
        let start = component.graph().edge_start(edge);
        component.is_source(start) && component.outgoing(start).first() == Some(&edge)
    }

    fn edge_starts(component: &Component, vertex: VertexId, k: usize) -> Vec<Self> {
        component
            .outgoing(vertex)
            .iter()
            .map(|&edge| Cursor::new(edge, k))
            .collect()
    }
}

impl GraphCursor for Cursor {
    const ALPHABET: Alphabet = Alphabet::Dna;

    fn empty() -> Self {
        Cursor::Empty
    }

    fn is_empty(&self) -> bool {
        matches!(self, Cursor::Empty)
    }

    fn letter(&self, component: &Component) -> u8 {
        encode_nucl(self.nucl(component))
    }

    fn next(&self, component: &Component) -> Vec<Self> {
        let (edge, position) = match *self {
            Cursor::Empty => return Self::all(component),
            Cursor::At { edge, position } => (edge, position),
        };
        let graph = component.graph();
        let k = component.k();
        if position + 1 < k {
            vec![Cursor::new(edge, position + 1)]
        } else if position + 1 == k {
            Cursor::edge_starts(component, graph.edge_start(edge), k)
        } else if position + 1 < component.nucls(edge).len() {
            vec![Cursor::new(edge, position + 1)]
        } else {
            Cursor::edge_starts(component, graph.edge_end(edge), k)
        }
    }

    fn prev(&self, component: &Component) -> Vec<Self> {
        let (edge, position) = match *self {
            Cursor::Empty => return Self::all(component),
            Cursor::At { edge, position } => (edge, position),
        };
        let k = component.k();
        if position > k {
            return vec![Cursor::new(edge, position - 1)];
        }
        if position < k {
            return match position {
                0 => Vec::new(),
                _ => vec![Cursor::new(edge, position - 1)],
            };
        }

        let start = component.graph().edge_start(edge);
        if component.is_source(start) {
            match (k, component.outgoing(start).first()) {
                (0, _) | (_, None) => Vec::new(),
                (_, Some(&owner)) => vec![Cursor::new(owner, k - 1)],
            }
        } else {
            component
                .incoming(start)
                .iter()
                .map(|&e| Cursor::new(e, component.nucls(e).len() - 1))
                .collect()
        }
    }

    fn edge(&self) -> Option<EdgeId> {
        match self {
            Cursor::Empty => None,
            Cursor::At { edge, .. } => Some(*edge),
        }
    }

    fn edges(&self) -> ArrayVec<EdgeId, 3> {
        self.edge().into_iter().collect()
    }

    fn nucl_cursors(&self) -> ArrayVec<Cursor, 3> {
        let mut cursors = ArrayVec::new();
        if !self.is_empty() {
            cursors.push(*self);
        }
        cursors
    }

    fn all(component: &Component) -> Vec<Self> {
        let k = component.k();
        let mut cursors = Vec::new();
        for edge in component.edges() {
            let first = if Cursor::owns_head(component, edge) { 0 } else { k };
            let positions = first..component.nucls(edge).len();
            cursors.extend(positions.map(|p| Cursor::new(edge, p)));
        }
        cursors
    }
}
