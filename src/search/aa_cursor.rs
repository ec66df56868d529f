use super::{Cursor, GraphCursor};
use crate::graph::{Component, EdgeId};
use crate::hmm::{to_aa, Alphabet, STOP};
use arrayvec::ArrayVec;
use itertools::Itertools;

/// Codon cursor: three consecutive nucleotide cursors read as one amino acid.
/// Stepping moves a whole codon, so successive cursors tile the walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AaCursor {
    Empty,
    At([Cursor; 3]),
}

impl AaCursor {
    pub fn new(c0: Cursor, c1: Cursor, c2: Cursor) -> Self {
        AaCursor::At([c0, c1, c2])
    }

    fn extend_forward(component: &Component, from: Cursor, out: &mut Vec<Self>) {
        for c0 in from.next(component) {
            for c1 in c0.next(component) {
                for c2 in c1.next(component) {
                    out.push(AaCursor::new(c0, c1, c2));
                }
            }
        }
    }

    /// Amino-acid letter, `*` for stops.
    pub fn residue(&self, component: &Component) -> u8 {
        match self {
            AaCursor::Empty => b'-',
            AaCursor::At(_) => Alphabet::Amino.decode(self.letter(component)),
        }
    }
}

impl GraphCursor for AaCursor {
    const ALPHABET: Alphabet = Alphabet::Amino;

    fn empty() -> Self {
        AaCursor::Empty
    }

    fn is_empty(&self) -> bool {
        matches!(self, AaCursor::Empty)
    }

    fn letter(&self, component: &Component) -> u8 {
        match self {
            AaCursor::Empty => STOP,
            AaCursor::At([c0, c1, c2]) => {
                to_aa(c0.nucl(component), c1.nucl(component), c2.nucl(component))
            }
        }
    }

    fn next(&self, component: &Component) -> Vec<Self> {
        match self {
            AaCursor::Empty => Self::all(component),
            AaCursor::At([_, _, last]) => {
                let mut result = Vec::new();
                AaCursor::extend_forward(component, *last, &mut result);
                result
            }
        }
    }

    fn prev(&self, component: &Component) -> Vec<Self> {
        let first = match self {
            AaCursor::Empty => return Self::all(component),
            AaCursor::At([first, _, _]) => *first,
        };
        let mut result = Vec::new();
        for c2 in first.prev(component) {
            for c1 in c2.prev(component) {
                for c0 in c1.prev(component) {
                    result.push(AaCursor::new(c0, c1, c2));
                }
            }
        }
        result.sort_unstable();
        result
    }

    fn edge(&self) -> Option<EdgeId> {
        match self {
            AaCursor::Empty => None,
            AaCursor::At([first, _, _]) => first.edge(),
        }
    }

    fn edges(&self) -> ArrayVec<EdgeId, 3> {
        match self {
            AaCursor::Empty => ArrayVec::new(),
            AaCursor::At(cursors) => cursors.iter().filter_map(|c| c.edge()).dedup().collect(),
        }
    }

    fn nucl_cursors(&self) -> ArrayVec<Cursor, 3> {
        match self {
            AaCursor::Empty => ArrayVec::new(),
            AaCursor::At(cursors) => cursors.iter().copied().collect(),
        }
    }

    fn all(component: &Component) -> Vec<Self> {
        let mut result = Vec::new();
        for c0 in Cursor::all(component) {
            for c1 in c0.next(component) {
                for c2 in c1.next(component) {
                    result.push(AaCursor::new(c0, c1, c2));
                }
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Graph, GraphBuilder};

    fn single_edge(nucls: &[u8], k: usize) -> (Graph, EdgeId) {
        let mut builder = GraphBuilder::new(k);
        let (a, b) = (builder.add_vertex(), builder.add_vertex());
        let e = builder.add_edge(a, b, nucls).unwrap();
        (builder.build().unwrap(), e)
    }

    #[test]
    fn steps_codon_by_codon() {
        let (graph, e) = single_edge(b"ATGGCCTAA", 3);
        let component = Component::from_vertices(&graph, graph.vertices(), false);
        let start = AaCursor::new(Cursor::new(e, 0), Cursor::new(e, 1), Cursor::new(e, 2));
        assert_eq!(start.residue(&component), b'M');

        let second = start.next(&component);
        assert_eq!(
            second,
            vec![AaCursor::new(Cursor::new(e, 3), Cursor::new(e, 4), Cursor::new(e, 5))]
        );
        assert_eq!(second[0].residue(&component), b'A');
        assert_eq!(second[0].prev(&component), vec![start]);

        let third = second[0].next(&component);
        assert_eq!(third[0].residue(&component), b'*');
        assert!(third[0].next(&component).is_empty());
        assert!(start.prev(&component).is_empty());
    }

    #[test]
    fn codons_straddle_junctions() {
        let mut builder = GraphBuilder::new(1);
        let (a, b, c) = (
            builder.add_vertex(),
            builder.add_vertex(),
            builder.add_vertex(),
        );
        let e1 = builder.add_edge(a, b, b"ATGG").unwrap();
        let e2 = builder.add_edge(b, c, b"GCCT").unwrap();
        let graph = builder.build().unwrap();
        let component = Component::from_vertices(&graph, [a, b, c], false);

        let codon = AaCursor::new(Cursor::new(e1, 2), Cursor::new(e1, 3), Cursor::new(e2, 1));
        assert_eq!(codon.residue(&component), b'G');
        assert_eq!(codon.edges().as_slice(), &[e1, e2]);
        assert_eq!(codon.edge(), Some(e1));
        assert!(AaCursor::all(&component).contains(&codon));
    }

    #[test]
    fn next_and_prev_are_inverse() {
        let mut builder = GraphBuilder::new(2);
        let (a, b, c) = (
            builder.add_vertex(),
            builder.add_vertex(),
            builder.add_vertex(),
        );
        builder.add_edge(a, b, b"ACGTAC").unwrap();
        builder.add_edge(b, b, b"ACTTAC").unwrap();
        builder.add_edge(b, c, b"ACGGG").unwrap();
        let graph = builder.build().unwrap();
        let component = Component::from_vertices(&graph, graph.vertices(), true);

        let all = AaCursor::all(&component);
        assert!(!all.is_empty());
        for &cursor in &all {
            for succ in cursor.next(&component) {
                assert!(all.contains(&succ));
                assert!(succ.prev(&component).contains(&cursor));
            }
            for pred in cursor.prev(&component) {
                assert!(pred.next(&component).contains(&cursor));
            }
        }
    }

    #[test]
    fn empty_cursor() {
        let (graph, _) = single_edge(b"ATGGCC", 2);
        let component = Component::from_vertices(&graph, graph.vertices(), false);
        assert!(AaCursor::empty().is_empty());
        assert_eq!(
            AaCursor::empty().next(&component),
            AaCursor::all(&component)
        );
        assert!(AaCursor::empty().edges().is_empty());
    }
}
