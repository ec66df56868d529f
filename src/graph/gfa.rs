//! GFA v1 loader.
//!
//! Segments become graph edges (plus their conjugates) and links glue segment
//! ends into shared vertices. Links must overlap by exactly `k` nucleotides.

use super::{Graph, GraphBuilder, VertexId};
use crate::utils::{open_text_reader, Result};
use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GfaSegment {
    pub name: String,
    pub sequence: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GfaLink {
    pub from_segment: String,
    pub from_forward: bool,
    pub to_segment: String,
    pub to_forward: bool,
    /// Overlap length, `None` when the CIGAR is `*`.
    pub overlap: Option<usize>,
}

#[derive(Debug, Default)]
pub struct GfaRecords {
    pub segments: Vec<GfaSegment>,
    pub links: Vec<GfaLink>,
}

impl GfaRecords {
    pub fn num_edges(&self) -> usize {
        self.segments.len()
    }

    pub fn num_links(&self) -> usize {
        self.links.len()
    }
}

fn parse_orientation(field: &str, line_number: usize) -> Result<bool> {
    match field {
        "+" => Ok(true),
        "-" => Ok(false),
        _ => Err(format!(
            "line {}: invalid orientation '{}'",
            line_number, field
        )),
    }
}

fn parse_overlap(field: &str, line_number: usize) -> Result<Option<usize>> {
    if field == "*" {
        return Ok(None);
    }
    field
        .strip_suffix('M')
        .and_then(|len| len.parse::<usize>().ok())
        .map(Some)
        .ok_or_else(|| {
            format!(
                "line {}: unsupported overlap '{}', expected <n>M",
                line_number, field
            )
        })
}

pub fn parse_gfa<R: BufRead>(reader: R) -> Result<GfaRecords> {
    let mut records = GfaRecords::default();
    for (line_index, line) in reader.lines().enumerate() {
        let line_number = line_index + 1;
        let line = line.map_err(|e| format!("Error reading line {}: {}", line_number, e))?;
        let line = line.trim_end();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        match fields[0] {
            "S" => {
                if fields.len() < 3 {
                    return Err(format!(
                        "line {}: segment requires at least 3 fields, found {}",
                        line_number,
                        fields.len()
                    ));
                }
                if fields[2] == "*" {
                    return Err(format!(
                        "line {}: segment {} has no sequence",
                        line_number, fields[1]
                    ));
                }
                records.segments.push(GfaSegment {
                    name: fields[1].to_string(),
                    sequence: fields[2].as_bytes().to_vec(),
                });
            }
            "L" => {
                if fields.len() < 6 {
                    return Err(format!(
                        "line {}: link requires at least 6 fields, found {}",
                        line_number,
                        fields.len()
                    ));
                }
                records.links.push(GfaLink {
                    from_segment: fields[1].to_string(),
                    from_forward: parse_orientation(fields[2], line_number)?,
                    to_segment: fields[3].to_string(),
                    to_forward: parse_orientation(fields[4], line_number)?,
                    overlap: parse_overlap(fields[5], line_number)?,
                });
            }
            _ => {}
        }
    }
    Ok(records)
}

/// Union-find over segment endpoints.
struct DisjointSets {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl DisjointSets {
    fn new(size: usize) -> Self {
        DisjointSets {
            parent: (0..size).collect(),
            rank: vec![0; size],
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
    }
}

// Four endpoints per segment: start/end of the forward edge, start/end of the
// reverse-complement edge.
fn start_node(segment: usize, forward: bool) -> usize {
    4 * segment + if forward { 0 } else { 2 }
}

fn end_node(segment: usize, forward: bool) -> usize {
    4 * segment + if forward { 1 } else { 3 }
}

fn conjugate_node(node: usize) -> usize {
    let segment = node / 4;
    match node % 4 {
        0 => end_node(segment, false),
        1 => start_node(segment, false),
        2 => end_node(segment, true),
        _ => start_node(segment, true),
    }
}

pub fn records_to_graph(records: &GfaRecords, k: usize) -> Result<Graph> {
    let index: HashMap<&str, usize> = records
        .segments
        .iter()
        .enumerate()
        .map(|(i, s)| (s.name.as_str(), i))
        .collect();
    if index.len() != records.segments.len() {
        return Err("Duplicate segment names in GFA".to_string());
    }

    let mut sets = DisjointSets::new(4 * records.segments.len());
    for link in &records.links {
        if let Some(overlap) = link.overlap {
            if overlap != k {
                return Err(format!(
                    "Link {} -> {} overlaps by {} but k = {}",
                    link.from_segment, link.to_segment, overlap, k
                ));
            }
        }
        let lookup = |name: &str| {
            index
                .get(name)
                .copied()
                .ok_or_else(|| format!("Link refers to unknown segment {}", name))
        };
        let (from, to) = (lookup(&link.from_segment)?, lookup(&link.to_segment)?);
        sets.union(
            end_node(from, link.from_forward),
            start_node(to, link.to_forward),
        );
        sets.union(
            end_node(to, !link.to_forward),
            start_node(from, !link.from_forward),
        );
    }

    let mut builder = GraphBuilder::new(k);
    let mut vertex_of: HashMap<usize, VertexId> = HashMap::new();
    let mut vertex_for = |builder: &mut GraphBuilder, sets: &mut DisjointSets, node: usize| {
        let root = sets.find(node);
        if let Some(&v) = vertex_of.get(&root) {
            return v;
        }
        let conj_root = sets.find(conjugate_node(node));
        let v = if conj_root == root {
            builder.add_self_conjugate_vertex()
        } else {
            let v = builder.add_vertex();
            vertex_of.insert(conj_root, builder.conjugate_vertex(v));
            v
        };
        vertex_of.insert(root, v);
        v
    };

    for (i, segment) in records.segments.iter().enumerate() {
        let start = vertex_for(&mut builder, &mut sets, start_node(i, true));
        let end = vertex_for(&mut builder, &mut sets, end_node(i, true));
        builder
            .add_edge(start, end, &segment.sequence)
            .map_err(|e| format!("Segment {}: {}", segment.name, e))?;
    }

    builder.build()
}

pub fn load_gfa(path: &Path, k: usize) -> Result<Graph> {
    let reader = open_text_reader(path)?;
    let records = parse_gfa(reader)?;
    log::info!(
        "GFA segments: {}, links: {}",
        records.num_edges(),
        records.num_links()
    );
    records_to_graph(&records, k)
}
