use super::{
    extract_neighbourhoods, find_best_path, join_neighbourhoods, match_edges, merge_sequences,
    path_name, to_path, AaCursor, Cursor, EdgeAlnInfo, GraphCursor, SearchParams,
};
use crate::graph::{Component, EdgeId, Graph};
use crate::hmm::{fees_from_hmm, Alphabet, Fees, MatcherThresholds, ProfileHmm, ViterbiMatcher};
use crate::utils::Result;
use itertools::Itertools;
use std::collections::HashSet;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

pub struct Params {
    pub top: usize,
    /// Restricts seeding to one edge (int id).
    pub edge_id: Option<u64>,
    /// Component size bounds, in edge pairs.
    pub min_size: usize,
    pub max_size: usize,
    pub max_states: usize,
    pub thresholds: MatcherThresholds,
    /// Report seed hits at info level.
    pub debug: bool,
    pub cancel: Option<Arc<AtomicBool>>,
}

impl Default for Params {
    fn default() -> Self {
        Params {
            top: 10,
            edge_id: None,
            min_size: 2,
            max_size: 1000,
            max_states: 10_000_000,
            thresholds: MatcherThresholds::default(),
            debug: false,
            cancel: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComponentHit {
    pub leader: EdgeId,
    pub rank: usize,
    pub score: f64,
    pub sequence: String,
    pub path: Vec<EdgeId>,
    /// Set for components too small to search, reported as their leader edge.
    pub whole_edge: bool,
}

/// Edge path queued for rescoring, with its spelled sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EdgePath {
    pub name: String,
    pub sequence: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HmmResult {
    pub name: String,
    /// Searched walks as `(score, sequence)`, cheapest first.
    pub resultant: Vec<(f64, String)>,
    pub hits: Vec<ComponentHit>,
    /// Unique edge paths of all hits, in discovery order.
    pub edge_paths: Vec<EdgePath>,
}

impl HmmResult {
    pub fn empty(name: &str) -> Self {
        HmmResult {
            name: name.to_string(),
            resultant: Vec::new(),
            hits: Vec::new(),
            edge_paths: Vec::new(),
        }
    }
}

fn log_seeds(matched: &EdgeAlnInfo, debug: bool) {
    let level = if debug {
        log::Level::Info
    } else {
        log::Level::Debug
    };
    for (edge, (left, right)) in matched {
        log::log!(
            level,
            "Seed edge {}: overhangs L = {}, R = {}",
            edge,
            left,
            right
        );
    }
}

fn search_component<C: GraphCursor>(
    fees: &Fees,
    component: &Component,
    leader: EdgeId,
    params: &SearchParams,
) -> Result<Vec<ComponentHit>> {
    let result = find_best_path::<C>(fees, component, &[], params)?;
    if result.capped() {
        log::warn!(
            "Component of edge {} hit the search cap; results are partial",
            leader
        );
    }
    log::info!(
        "Component of edge {}: best score {:.4}, best path {}",
        leader,
        result.best_score(),
        result.best_path_string()
    );

    let hits = result
        .top_k(params.top)
        .iter()
        .enumerate()
        .map(|(rank, walk)| ComponentHit {
            leader,
            rank,
            score: walk.score,
            sequence: walk.sequence.clone(),
            path: to_path(&walk.cursors, component),
            whole_edge: false,
        })
        .collect_vec();

    let unique_paths = hits.iter().map(|h| &h.path).unique().count();
    log::info!(
        "Component of edge {}: {} unique edge paths",
        leader,
        unique_paths
    );
    for hit in &hits {
        log::debug!(
            "  {:.4} {} [{}]",
            hit.score,
            hit.sequence,
            path_name(&hit.path)
        );
    }
    Ok(hits)
}

/// Seeds, carves and searches the graph for one profile.
pub fn analyze_hmm(graph: &Graph, hmm: &ProfileHmm, params: &Params) -> Result<HmmResult> {
    let fees = fees_from_hmm(hmm, hmm.alphabet)?;
    log::info!("Query: {} (M = {}, {})", hmm.name, hmm.length, hmm.alphabet);

    let mut matcher = ViterbiMatcher::new(&fees, params.thresholds);
    let matched = match_edges(graph, &mut matcher, hmm.alphabet, params.edge_id)?;
    if matched.is_empty() {
        log::warn!("{}: no matched edges", hmm.name);
        return Ok(HmmResult::empty(&hmm.name));
    }
    log::info!("{}: {} matched edges", hmm.name, matched.len());
    log_seeds(&matched, params.debug);

    let mult = 2 * hmm.alphabet.nucls_per_symbol() as i64;
    let neighbourhoods = join_neighbourhoods(graph, extract_neighbourhoods(graph, &matched, mult));
    log::info!("{}: {} neighbourhoods", hmm.name, neighbourhoods.len());

    let search_params = SearchParams {
        top: params.top,
        max_states: params.max_states,
        cancel: params.cancel.clone(),
    };

    let mut hits = Vec::new();
    for (leader, vertices) in neighbourhoods {
        let component = Component::from_vertices(graph, vertices, true);
        let size = component.e_size() / 2;
        log::info!("Component of edge {}: {} edge pairs", leader, size);
        if size > params.max_size {
            log::warn!(
                "Component of edge {} is too large ({} > {}), skipping",
                leader,
                size,
                params.max_size
            );
            continue;
        }
        if size < params.min_size {
            hits.push(ComponentHit {
                leader,
                rank: 0,
                score: f64::INFINITY,
                sequence: String::from_utf8_lossy(graph.edge_nucls(leader)).into_owned(),
                path: vec![leader],
                whole_edge: true,
            });
            continue;
        }

        let component_hits = match hmm.alphabet {
            Alphabet::Dna => search_component::<Cursor>(&fees, &component, leader, &search_params),
            Alphabet::Amino => {
                search_component::<AaCursor>(&fees, &component, leader, &search_params)
            }
        }?;
        hits.extend(component_hits);
    }

    let resultant = hits
        .iter()
        .filter(|h| !h.whole_edge)
        .map(|h| (h.score, h.sequence.clone()))
        .sorted_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(&b.1)))
        .collect_vec();

    let mut seen = HashSet::new();
    let edge_paths = hits
        .iter()
        .filter(|h| seen.insert(h.path.clone()))
        .map(|h| EdgePath {
            name: path_name(&h.path),
            sequence: merge_sequences(graph, &h.path),
        })
        .collect_vec();
    log::info!("{}: {} unique edge paths", hmm.name, edge_paths.len());

    Ok(HmmResult {
        name: hmm.name.clone(),
        resultant,
        hits,
        edge_paths,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphBuilder;

    fn consensus_hmm(alphabet: Alphabet, consensus: &[u8]) -> ProfileHmm {
        let size = alphabet.size();
        let other = 0.03 / (size - 1) as f64;
        let match_probs: Vec<Vec<f64>> = consensus
            .iter()
            .map(|&b| {
                let code = alphabet.encode(b) as usize;
                (0..size)
                    .map(|c| if c == code { 0.97 } else { other })
                    .collect()
            })
            .collect();
        let m = consensus.len();
        let mut transitions = vec![[0.9, 0.05, 0.05, 0.6, 0.4, 0.6, 0.4]; m + 1];
        transitions[m] = [1.0, 0.0, 0.0, 1.0, 0.0, 1.0, 0.0];
        ProfileHmm::from_probabilities(
            "q",
            alphabet,
            &match_probs,
            &vec![vec![1.0 / size as f64; size]; m + 1],
            &transitions,
        )
        .unwrap()
    }

    fn graph() -> (Graph, EdgeId) {
        let mut builder = GraphBuilder::new(3);
        let (a, b) = (builder.add_vertex(), builder.add_vertex());
        let e = builder.add_edge(a, b, b"TTTTACGTTGCAACTTTT").unwrap();
        (builder.build().unwrap(), e)
    }

    #[test]
    fn searches_matched_components() {
        let (graph, e) = graph();
        let params = Params {
            min_size: 1,
            top: 3,
            ..Params::default()
        };
        let hmm = consensus_hmm(Alphabet::Dna, b"ACGTTGCAAC");
        let result = analyze_hmm(&graph, &hmm, &params).unwrap();
        assert_eq!(result.hits.len(), 3);
        assert!(result.hits.iter().all(|h| h.leader == e && !h.whole_edge));
        assert_eq!(result.resultant[0].1, "ACGTTGCAAC");
        assert!(result.resultant.windows(2).all(|w| w[0].0 <= w[1].0));
        assert_eq!(result.edge_paths[0].name, e.int_id().to_string());
        assert_eq!(result.edge_paths[0].sequence, "TTTTACGTTGCAACTTTT");
    }

    #[test]
    fn size_bounds_control_searching() {
        let (graph, e) = graph();
        let hmm = consensus_hmm(Alphabet::Dna, b"ACGTTGCAAC");

        let result = analyze_hmm(&graph, &hmm, &Params::default()).unwrap();
        assert_eq!(result.hits.len(), 1);
        assert!(result.hits[0].whole_edge);
        assert_eq!(result.hits[0].path, vec![e]);
        assert!(result.resultant.is_empty());

        let params = Params {
            min_size: 0,
            max_size: 0,
            ..Params::default()
        };
        let result = analyze_hmm(&graph, &hmm, &params).unwrap();
        assert!(result.hits.is_empty());
    }

    #[test]
    fn unmatched_profile_gives_empty_result() {
        let (graph, _) = graph();
        let hmm = consensus_hmm(Alphabet::Dna, b"GGGGGGGGGG");
        let result = analyze_hmm(&graph, &hmm, &Params::default()).unwrap();
        assert_eq!(result, HmmResult::empty("q"));
    }

    #[test]
    fn amino_profile_spans_two_edges() {
        // MKWHP on the first edge, EDC on the second, joined by a CCC overlap.
        let mut builder = GraphBuilder::new(3);
        let (a, b, c) = (
            builder.add_vertex(),
            builder.add_vertex(),
            builder.add_vertex(),
        );
        let e1 = builder.add_edge(a, b, b"ATGAAATGGCATCCC").unwrap();
        let e2 = builder.add_edge(b, c, b"CCCGAAGATTGT").unwrap();
        let graph = builder.build().unwrap();
        let params = Params {
            min_size: 1,
            ..Params::default()
        };

        let hmm = consensus_hmm(Alphabet::Amino, b"MKWHPEDC");
        let result = analyze_hmm(&graph, &hmm, &params).unwrap();
        assert_eq!(result.resultant[0].1, "MKWHPEDC");
        let best = result
            .hits
            .iter()
            .find(|h| h.rank == 0 && h.sequence == "MKWHPEDC")
            .unwrap();
        assert_eq!(best.path, vec![e1, e2]);
        let joined = merge_sequences(&graph, &best.path);
        assert_eq!(joined, "ATGAAATGGCATCCCGAAGATTGT");
        assert_eq!(joined.len(), 3 * best.sequence.len());
        assert!(result.edge_paths.contains(&EdgePath {
            name: path_name(&[e1, e2]),
            sequence: joined,
        }));
    }
}
