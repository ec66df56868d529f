//! Single-sequence profile matching used to seed the graph search.
//!
//! The matcher runs a local Viterbi pass of a profile against one sequence:
//! a domain may start at any match column (uniform entry) and end after any
//! match column (free exit), with unaligned flanks scored as background.

use super::{Fees, Transition};
use std::f64::consts::LN_2;

/// Local alignment of a profile segment against a sequence segment.
/// Coordinates are 1-based and inclusive.
#[derive(Debug, Clone, PartialEq)]
pub struct Domain {
    /// Profile length.
    pub m: usize,
    /// Sequence length.
    pub l: usize,
    pub seqpos: (usize, usize),
    pub hmmpos: (usize, usize),
    /// Bit score.
    pub score: f64,
}

impl Domain {
    /// Unmatched profile columns hanging over the left end of the sequence.
    pub fn left_overhang(&self) -> i64 {
        self.hmmpos.0 as i64 - self.seqpos.0 as i64
    }

    /// Unmatched profile columns hanging over the right end of the sequence.
    pub fn right_overhang(&self) -> i64 {
        (self.m as i64 - self.hmmpos.1 as i64) - (self.l as i64 - self.seqpos.1 as i64)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    pub name: String,
    pub score: f64,
    pub domains: Vec<Domain>,
}

/// External single-sequence matcher interface consumed by the seeding step.
pub trait SeedMatcher {
    fn match_sequence(&mut self, name: &str, seq: &[u8]);
    /// Hits passing the reporting thresholds, in submission order.
    fn hits(&self) -> &[Hit];
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatcherThresholds {
    /// Minimal sequence bit score.
    pub seq_bits: f64,
    /// Minimal domain bit score, when set.
    pub dom_bits: Option<f64>,
}

impl Default for MatcherThresholds {
    fn default() -> Self {
        MatcherThresholds {
            seq_bits: 10.0,
            dom_bits: None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Cell {
    cost: f64,
    seq_start: usize,
    hmm_start: usize,
}

impl Cell {
    const UNREACHABLE: Cell = Cell {
        cost: f64::INFINITY,
        seq_start: 0,
        hmm_start: 0,
    };

    fn extend(self, cost: f64) -> Cell {
        Cell {
            cost: self.cost + cost,
            ..self
        }
    }

    fn better(self, other: Cell) -> Cell {
        if other.cost < self.cost {
            other
        } else {
            self
        }
    }
}

pub struct ViterbiMatcher<'a> {
    fees: &'a Fees,
    thresholds: MatcherThresholds,
    entry_cost: f64,
    hits: Vec<Hit>,
}

impl<'a> ViterbiMatcher<'a> {
    pub fn new(fees: &'a Fees, thresholds: MatcherThresholds) -> Self {
        let m = fees.m as f64;
        ViterbiMatcher {
            fees,
            thresholds,
            entry_cost: (m * (m + 1.0) / 2.0).ln(),
            hits: Vec::new(),
        }
    }

    /// Best local domain of `seq`, if any alignment has finite cost.
    pub fn best_domain(&self, seq: &[u8]) -> Option<Domain> {
        let fees = self.fees;
        let m = fees.m;
        if m == 0 || seq.is_empty() {
            return None;
        }
        let symbols: Vec<u8> = seq.iter().map(|&b| fees.alphabet.encode(b)).collect();

        let mut prev_m = vec![Cell::UNREACHABLE; m + 1];
        let mut prev_i = vec![Cell::UNREACHABLE; m + 1];
        let mut prev_d = vec![Cell::UNREACHABLE; m + 1];
        let mut best: Option<(Cell, usize, usize)> = None;

        for (x, &symbol) in symbols.iter().enumerate() {
            let pos = x + 1;
            let mut cur_m = vec![Cell::UNREACHABLE; m + 1];
            let mut cur_i = vec![Cell::UNREACHABLE; m + 1];
            let mut cur_d = vec![Cell::UNREACHABLE; m + 1];

            for j in 1..=m {
                let entry = Cell {
                    cost: self.entry_cost,
                    seq_start: pos,
                    hmm_start: j,
                };
                let from_prev = prev_m[j - 1]
                    .extend(fees.transition(j - 1, Transition::MM))
                    .better(prev_i[j - 1].extend(fees.transition(j - 1, Transition::IM)))
                    .better(prev_d[j - 1].extend(fees.transition(j - 1, Transition::DM)));
                let from_prev = if j > 1 { from_prev } else { Cell::UNREACHABLE };
                cur_m[j] = entry.better(from_prev).extend(fees.mat(j, symbol));

                if j < m {
                    cur_i[j] = prev_m[j]
                        .extend(fees.transition(j, Transition::MI))
                        .better(prev_i[j].extend(fees.transition(j, Transition::II)))
                        .extend(fees.ins(j, symbol));
                }
                if j > 1 {
                    cur_d[j] = cur_m[j - 1]
                        .extend(fees.transition(j - 1, Transition::MD))
                        .better(cur_d[j - 1].extend(fees.transition(j - 1, Transition::DD)));
                }

                let candidate = cur_m[j];
                if candidate.cost.is_finite()
                    && best.is_none_or(|(b, _, _)| candidate.cost < b.cost)
                {
                    best = Some((candidate, pos, j));
                }
            }

            prev_m = cur_m;
            prev_i = cur_i;
            prev_d = cur_d;
        }

        best.map(|(cell, seq_end, hmm_end)| Domain {
            m,
            l: seq.len(),
            seqpos: (cell.seq_start, seq_end),
            hmmpos: (cell.hmm_start, hmm_end),
            score: -cell.cost / LN_2,
        })
    }
}

impl SeedMatcher for ViterbiMatcher<'_> {
    fn match_sequence(&mut self, name: &str, seq: &[u8]) {
        let Some(domain) = self.best_domain(seq) else {
            return;
        };
        if domain.score < self.thresholds.seq_bits {
            return;
        }
        if self
            .thresholds
            .dom_bits
            .is_some_and(|dom_bits| domain.score < dom_bits)
        {
            return;
        }
        self.hits.push(Hit {
            name: name.to_string(),
            score: domain.score,
            domains: vec![domain],
        });
    }

    fn hits(&self) -> &[Hit] {
        &self.hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hmm::{fees_from_hmm, Alphabet, ProfileHmm};

    // Profile strongly preferring ACGTTGCAAC.
    fn consensus_fees() -> Fees {
        let consensus = b"ACGTTGCAAC";
        let match_probs: Vec<Vec<f64>> = consensus
            .iter()
            .map(|&b| {
                let code = Alphabet::Dna.encode(b) as usize;
                (0..4)
                    .map(|c| if c == code { 0.97 } else { 0.01 })
                    .collect()
            })
            .collect();
        let m = consensus.len();
        let mut transitions = vec![[0.9, 0.05, 0.05, 0.6, 0.4, 0.6, 0.4]; m + 1];
        transitions[m] = [1.0, 0.0, 0.0, 1.0, 0.0, 1.0, 0.0];
        let hmm = ProfileHmm::from_probabilities(
            "consensus",
            Alphabet::Dna,
            &match_probs,
            &vec![vec![0.25; 4]; m + 1],
            &transitions,
        )
        .unwrap();
        fees_from_hmm(&hmm, Alphabet::Dna).unwrap()
    }

    #[test]
    fn finds_embedded_domain() {
        let fees = consensus_fees();
        let matcher = ViterbiMatcher::new(&fees, MatcherThresholds::default());
        let domain = matcher.best_domain(b"TTTTACGTTGCAACTTTT").unwrap();
        assert_eq!(domain.seqpos, (5, 14));
        assert_eq!(domain.hmmpos, (1, 10));
        assert_eq!(domain.left_overhang(), -4);
        assert_eq!(domain.right_overhang(), -4);
        assert!(domain.score > 10.0);
    }

    #[test]
    fn partial_match_hangs_over_the_edge() {
        let fees = consensus_fees();
        let matcher = ViterbiMatcher::new(&fees, MatcherThresholds::default());
        // Only the last six profile columns are present.
        let domain = matcher.best_domain(b"TGCAAC").unwrap();
        assert_eq!(domain.seqpos, (1, 6));
        assert_eq!(domain.hmmpos, (5, 10));
        assert_eq!(domain.left_overhang(), 4);
        assert_eq!(domain.right_overhang(), 0);
    }

    #[test]
    fn thresholds_filter_hits() {
        let fees = consensus_fees();
        let mut matcher = ViterbiMatcher::new(&fees, MatcherThresholds::default());
        matcher.match_sequence("good", b"ACGTTGCAAC");
        matcher.match_sequence("poor", b"TTTTTTTTTT");
        let names: Vec<_> = matcher.hits().iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, vec!["good"]);

        let mut strict = ViterbiMatcher::new(
            &fees,
            MatcherThresholds {
                seq_bits: 0.0,
                dom_bits: Some(1000.0),
            },
        );
        strict.match_sequence("good", b"ACGTTGCAAC");
        assert!(strict.hits().is_empty());
    }

    #[test]
    fn empty_sequence_has_no_domain() {
        let fees = consensus_fees();
        let matcher = ViterbiMatcher::new(&fees, MatcherThresholds::default());
        assert!(matcher.best_domain(b"").is_none());
    }
}
