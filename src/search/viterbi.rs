//! Best-walk search over the product of a component and a profile.
//!
//! States are `(cursor, column, kind)` triples. Edge weights are made
//! non-negative by adding `shift[i] = max(0, -min_a mat[i][a])` to every way
//! into column `i` (match emission or delete entry). Every complete walk passes
//! each column exactly once, so the shifts add up to a constant that is taken
//! off again when scores are reported.
//!
//! Each product state is settled at most `top` times, each time for a
//! different emitted cursor prefix, which yields the `top` cheapest distinct
//! walks. Walks tying with the last one kept are taken in discovery order.

use super::GraphCursor;
use crate::graph::Component;
use crate::hmm::{Fees, Transition};
use crate::utils::Result;
use std::cmp::Ordering;
use std::collections::hash_map::DefaultHasher;
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct SearchParams {
    /// Number of distinct walks to report.
    pub top: usize,
    /// Soft cap on settled product states; the best walks found so far are
    /// returned once it is reached.
    pub max_states: usize,
    /// Checked between queue pops.
    pub cancel: Option<Arc<AtomicBool>>,
}

impl Default for SearchParams {
    fn default() -> Self {
        SearchParams {
            top: 10,
            max_states: 10_000_000,
            cancel: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Kind {
    Match,
    Insert,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Node<C> {
    State {
        cursor: C,
        column: usize,
        kind: Kind,
    },
    End,
}

impl<C: GraphCursor> Node<C> {
    fn begin() -> Self {
        Node::State {
            cursor: C::empty(),
            column: 0,
            kind: Kind::Match,
        }
    }
}

#[derive(Debug)]
struct Label<C> {
    node: Node<C>,
    cost: f64,
    parent: Option<usize>,
    walk_hash: u64,
}

#[derive(Debug, PartialEq)]
struct QueueEntry {
    cost: f64,
    label: usize,
}

impl Eq for QueueEntry {}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.label.cmp(&self.label))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredPath<C> {
    /// Non-empty cursors in emission order.
    pub cursors: Vec<C>,
    pub score: f64,
    pub sequence: String,
}

/// Outcome of one search; the kept walks are ordered by score, then sequence.
#[derive(Debug, Clone)]
pub struct PathSet<C> {
    paths: Vec<ScoredPath<C>>,
    states: usize,
    capped: bool,
    cancelled: bool,
}

impl<C: GraphCursor> PathSet<C> {
    fn new(mut paths: Vec<ScoredPath<C>>, states: usize, capped: bool, cancelled: bool) -> Self {
        paths.sort_by(|a, b| {
            a.score
                .total_cmp(&b.score)
                .then_with(|| a.sequence.cmp(&b.sequence))
        });
        PathSet {
            paths,
            states,
            capped,
            cancelled,
        }
    }

    pub fn best_score(&self) -> f64 {
        self.paths.first().map_or(f64::INFINITY, |p| p.score)
    }

    pub fn best_path(&self) -> &[C] {
        self.paths.first().map_or(&[], |p| p.cursors.as_slice())
    }

    pub fn best_path_string(&self) -> &str {
        self.paths.first().map_or("", |p| p.sequence.as_str())
    }

    pub fn top_k(&self, k: usize) -> &[ScoredPath<C>] {
        &self.paths[..k.min(self.paths.len())]
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Product states expanded by the search.
    pub fn states(&self) -> usize {
        self.states
    }

    /// True when the state cap stopped the search early.
    pub fn capped(&self) -> bool {
        self.capped
    }

    pub fn cancelled(&self) -> bool {
        self.cancelled
    }
}

/// Letters of the non-empty cursors of `path`.
pub fn path_string<C: GraphCursor>(path: &[C], component: &Component) -> String {
    path.iter()
        .filter(|c| !c.is_empty())
        .map(|c| C::ALPHABET.decode(c.letter(component)) as char)
        .collect()
}

struct Search<'a, 'g, C> {
    fees: &'a Fees,
    component: &'a Component<'g>,
    initial: Vec<C>,
    shift: Vec<f64>,
    labels: Vec<Label<C>>,
    queue: BinaryHeap<QueueEntry>,
}

impl<C: GraphCursor> Search<'_, '_, C> {
    fn successors(&self, cursor: C) -> Vec<C> {
        if cursor.is_empty() {
            self.initial.clone()
        } else {
            cursor.next(self.component)
        }
    }

    fn match_cost(&self, column: usize, cursor: C) -> f64 {
        self.fees.mat(column, cursor.letter(self.component)) + self.shift[column]
    }

    fn insert_cost(&self, column: usize, cursor: C) -> f64 {
        self.fees.ins(column, cursor.letter(self.component)).max(0.0)
    }

    fn push(&mut self, parent: usize, node: Node<C>, step: f64) {
        let step = step.max(0.0);
        if !step.is_finite() {
            return;
        }
        let from = &self.labels[parent];
        let cost = from.cost + step;
        let walk_hash = match node {
            Node::State {
                cursor,
                kind: Kind::Match | Kind::Insert,
                ..
            } => {
                let mut hasher = DefaultHasher::new();
                from.walk_hash.hash(&mut hasher);
                cursor.hash(&mut hasher);
                hasher.finish()
            }
            _ => from.walk_hash,
        };
        let label = self.labels.len();
        self.labels.push(Label {
            node,
            cost,
            parent: Some(parent),
            walk_hash,
        });
        self.queue.push(QueueEntry { cost, label });
    }

    fn expand(&mut self, label: usize) {
        let Node::State {
            cursor,
            column,
            kind,
        } = self.labels[label].node
        else {
            return;
        };
        let fees = self.fees;
        let m = fees.m;
        let t = |kind: Transition| fees.transition(column, kind);

        let (to_match, to_insert, to_delete) = if self.labels[label].node == Node::begin() {
            (
                fees.begin_to_match(),
                fees.begin_to_insert(),
                fees.begin_to_delete(),
            )
        } else {
            match kind {
                Kind::Match => (t(Transition::MM), t(Transition::MI), t(Transition::MD)),
                Kind::Insert => (t(Transition::IM), t(Transition::II), f64::INFINITY),
                Kind::Delete => (t(Transition::DM), f64::INFINITY, t(Transition::DD)),
            }
        };

        if column == m {
            let exit = match kind {
                Kind::Match => fees.match_to_end(),
                Kind::Delete => t(Transition::DM),
                Kind::Insert => f64::INFINITY,
            };
            if !cursor.is_empty() {
                self.push(label, Node::End, exit);
            }
            return;
        }

        for next in self.successors(cursor) {
            let step = to_match + self.match_cost(column + 1, next);
            let node = Node::State {
                cursor: next,
                column: column + 1,
                kind: Kind::Match,
            };
            self.push(label, node, step);

            let step = to_insert + self.insert_cost(column, next);
            let node = Node::State {
                cursor: next,
                column,
                kind: Kind::Insert,
            };
            self.push(label, node, step);
        }

        let node = Node::State {
            cursor,
            column: column + 1,
            kind: Kind::Delete,
        };
        self.push(label, node, to_delete + self.shift[column + 1]);
    }

    fn walk(&self, mut label: usize) -> Vec<C> {
        let mut cursors = Vec::new();
        loop {
            let current = &self.labels[label];
            if let Node::State {
                cursor,
                kind: Kind::Match | Kind::Insert,
                ..
            } = current.node
            {
                if !cursor.is_empty() {
                    cursors.push(cursor);
                }
            }
            match current.parent {
                Some(parent) => label = parent,
                None => break,
            }
        }
        cursors.reverse();
        cursors
    }
}

/// Finds the `params.top` cheapest walks of `component` through the profile.
/// An empty `initial` set, or one holding only the empty cursor, lets walks
/// start anywhere in the component.
pub fn find_best_path<C: GraphCursor>(
    fees: &Fees,
    component: &Component,
    initial: &[C],
    params: &SearchParams,
) -> Result<PathSet<C>> {
    if fees.alphabet != C::ALPHABET {
        return Err(format!(
            "Profile alphabet {} cannot score {} cursors",
            fees.alphabet,
            C::ALPHABET
        ));
    }

    let initial = if initial.iter().all(|c| c.is_empty()) {
        C::all(component)
    } else {
        initial.iter().copied().filter(|c| !c.is_empty()).collect()
    };
    let shift: Vec<f64> = (0..=fees.m)
        .map(|i| if i == 0 { 0.0 } else { (-fees.min_mat(i)).max(0.0) })
        .collect();
    let offset: f64 = shift.iter().sum();

    let mut search = Search {
        fees,
        component,
        initial,
        shift,
        labels: vec![Label {
            node: Node::begin(),
            cost: 0.0,
            parent: None,
            walk_hash: 0,
        }],
        queue: BinaryHeap::new(),
    };
    search.queue.push(QueueEntry {
        cost: 0.0,
        label: 0,
    });

    let top = params.top.max(1);
    let mut settled: HashMap<Node<C>, Vec<u64>> = HashMap::new();
    let mut seen_walks: HashSet<Vec<C>> = HashSet::new();
    let mut paths = Vec::new();
    let mut expanded = 0;
    let mut capped = false;
    let mut cancelled = false;

    while let Some(QueueEntry { label, .. }) = search.queue.pop() {
        if params
            .cancel
            .as_ref()
            .is_some_and(|flag| flag.load(AtomicOrdering::Relaxed))
        {
            cancelled = true;
            break;
        }

        let (node, cost, walk_hash) = {
            let current = &search.labels[label];
            (current.node, current.cost, current.walk_hash)
        };

        if node == Node::End {
            let cursors = search.walk(label);
            if seen_walks.insert(cursors.clone()) {
                let sequence = path_string(&cursors, component);
                paths.push(ScoredPath {
                    cursors,
                    score: cost - offset,
                    sequence,
                });
                if paths.len() >= top {
                    break;
                }
            }
            continue;
        }

        let walks = settled.entry(node).or_default();
        if walks.len() >= top || walks.contains(&walk_hash) {
            continue;
        }
        walks.push(walk_hash);

        if expanded >= params.max_states {
            capped = true;
            log::warn!(
                "Search stopped after {} states; reporting {} walk(s) found so far",
                expanded,
                paths.len()
            );
            break;
        }
        expanded += 1;
        search.expand(label);
    }

    log::debug!(
        "Search over {} edges: {} states expanded, {} labels, {} walk(s)",
        component.e_size(),
        expanded,
        search.labels.len(),
        paths.len()
    );
    Ok(PathSet::new(paths, expanded, capped, cancelled))
}
