//! Feeding graph edges to a seed matcher and turning its hits into overhangs.

use super::neighbourhood::{record_overhang, EdgeAlnInfo};
use crate::graph::{EdgeId, Graph};
use crate::hmm::{translate, Alphabet, Hit, SeedMatcher};
use crate::utils::Result;

/// Reading frames tried for amino-acid profiles.
pub const FRAMES: usize = 3;

/// Matcher-facing name of an edge, with the reading frame for amino-acid
/// profiles.
pub fn hit_name(edge: EdgeId, frame: Option<usize>) -> String {
    match frame {
        Some(shift) => format!("{}_{}", edge.int_id(), shift),
        None => edge.int_id().to_string(),
    }
}

/// Inverse of [`hit_name`].
pub fn parse_hit_name(name: &str) -> Option<(u64, Option<usize>)> {
    match name.split_once('_') {
        Some((id, shift)) => {
            let shift = shift.parse::<usize>().ok().filter(|&s| s < FRAMES)?;
            Some((id.parse().ok()?, Some(shift)))
        }
        None => Some((name.parse().ok()?, None)),
    }
}

/// Named sequences submitted to the matcher: edge nucleotides for DNA profiles,
/// the three forward frame translations for amino-acid profiles.
pub fn edge_queries(
    graph: &Graph,
    alphabet: Alphabet,
    edge_filter: Option<u64>,
) -> Vec<(String, Vec<u8>)> {
    let mut queries = Vec::new();
    for edge in graph.edges() {
        if edge_filter.is_some_and(|id| id != edge.int_id()) {
            continue;
        }
        let nucls = graph.edge_nucls(edge);
        match alphabet {
            Alphabet::Dna => queries.push((hit_name(edge, None), nucls.to_vec())),
            Alphabet::Amino => {
                for shift in 0..FRAMES.min(nucls.len()) {
                    queries.push((hit_name(edge, Some(shift)), translate(&nucls[shift..])));
                }
            }
        }
    }
    queries
}

/// Maps matcher hits back onto edges, max-reducing the overhangs of every
/// domain that lands on the same edge.
pub fn collect_overhangs(graph: &Graph, hits: &[Hit]) -> Result<EdgeAlnInfo> {
    let mut info = EdgeAlnInfo::new();
    for hit in hits {
        let (id, _) =
            parse_hit_name(&hit.name).ok_or_else(|| format!("Unexpected hit name {}", hit.name))?;
        let edge = graph
            .edge_by_int_id(id)
            .ok_or_else(|| format!("Hit {} refers to an unknown edge", hit.name))?;
        for domain in &hit.domains {
            record_overhang(
                &mut info,
                edge,
                domain.left_overhang(),
                domain.right_overhang(),
            );
        }
    }
    Ok(info)
}

/// Runs `matcher` over the graph's edges and returns the matched edges.
pub fn match_edges<M: SeedMatcher>(
    graph: &Graph,
    matcher: &mut M,
    alphabet: Alphabet,
    edge_filter: Option<u64>,
) -> Result<EdgeAlnInfo> {
    for (name, seq) in edge_queries(graph, alphabet, edge_filter) {
        matcher.match_sequence(&name, &seq);
    }
    collect_overhangs(graph, matcher.hits())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphBuilder;
    use crate::hmm::Domain;

    #[test]
    fn hit_names_round_trip() {
        let mut builder = GraphBuilder::new(1);
        let (a, b) = (builder.add_vertex(), builder.add_vertex());
        let e = builder.add_edge(a, b, b"ACGT").unwrap();
        assert_eq!(parse_hit_name(&hit_name(e, None)), Some((e.int_id(), None)));
        assert_eq!(
            parse_hit_name(&hit_name(e, Some(2))),
            Some((e.int_id(), Some(2)))
        );
        assert_eq!(parse_hit_name("12_3"), None);
        assert_eq!(parse_hit_name("x_1"), None);
        assert_eq!(parse_hit_name("seven"), None);
    }

    #[test]
    fn amino_queries_cover_three_frames() {
        let mut builder = GraphBuilder::new(1);
        let (a, b) = (builder.add_vertex(), builder.add_vertex());
        let e = builder.add_edge(a, b, b"ATGGCCTAA").unwrap();
        let graph = builder.build().unwrap();
        let queries = edge_queries(&graph, Alphabet::Amino, Some(e.int_id()));
        assert_eq!(queries.len(), 3);
        assert_eq!(queries[0], (format!("{}_0", e.int_id()), b"MA*".to_vec()));
        assert_eq!(queries[1].1, b"WP".to_vec());

        let dna = edge_queries(&graph, Alphabet::Dna, None);
        assert_eq!(dna.len(), 2);
    }

    #[test]
    fn hits_become_overhangs() {
        let mut builder = GraphBuilder::new(1);
        let (a, b) = (builder.add_vertex(), builder.add_vertex());
        let e = builder.add_edge(a, b, b"ACGTACGT").unwrap();
        let graph = builder.build().unwrap();
        let domain = |hmm_from, hmm_to, seq_from, seq_to| Domain {
            m: 20,
            l: 8,
            seqpos: (seq_from, seq_to),
            hmmpos: (hmm_from, hmm_to),
            score: 12.0,
        };
        let hits = vec![
            Hit {
                name: hit_name(e, None),
                score: 12.0,
                domains: vec![domain(5, 12, 1, 8)],
            },
            Hit {
                name: hit_name(e, None),
                score: 11.0,
                domains: vec![domain(1, 6, 3, 8)],
            },
        ];
        let info = collect_overhangs(&graph, &hits).unwrap();
        // (5 - 1, (20 - 12) - 0) and (1 - 3, (20 - 6) - 0), max-reduced.
        assert_eq!(info[&e], (4, 14));

        let bad = vec![Hit {
            name: "99".to_string(),
            score: 1.0,
            domains: Vec::new(),
        }];
        assert!(collect_overhangs(&graph, &bad).is_err());
    }
}
