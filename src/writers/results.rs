//! Writers for per-profile search results and seed dumps.
//!
use super::FastaWriter;
use crate::search::workflow::HmmResult;
use crate::search::EdgeAlnInfo;
use crate::utils::{create_writer, sanitize_file_component, Result};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub const ALL_EDGES_FILE: &str = "graph-hmm.all.edges.fa";

fn file_prefix(hmm_name: &str) -> String {
    format!("graph-hmm-{}", sanitize_file_component(hmm_name))
}

fn open_fasta(output_dir: &Path, file_name: &str) -> Result<FastaWriter<BufWriter<File>>> {
    create_writer(output_dir, file_name, FastaWriter::from_path)
}

/// Structure for writing the FASTA outputs of every searched profile.
pub struct ResultWriter {
    output_dir: PathBuf,
    /// Also write `.edges.fa` files for rescoring.
    rescore: bool,
    /// Shared across profiles, each edge path written once.
    all_edges: Option<FastaWriter<BufWriter<File>>>,
    all_edges_seen: HashSet<String>,
}

impl ResultWriter {
    /// Constructs a new `ResultWriter`.
    ///
    /// # Arguments
    /// * `output_dir` - Directory receiving all output files.
    /// * `rescore` - Whether edge path files are written.
    ///
    /// # Returns
    /// Returns a `Result` with either a new `ResultWriter` instance or an error message.
    pub fn new(output_dir: &Path, rescore: bool) -> Result<ResultWriter> {
        let all_edges = if rescore {
            Some(open_fasta(output_dir, ALL_EDGES_FILE)?)
        } else {
            None
        };
        Ok(ResultWriter {
            output_dir: output_dir.to_path_buf(),
            rescore,
            all_edges,
            all_edges_seen: HashSet::new(),
        })
    }

    /// Writes the outputs of one profile. Profiles without hits produce no files.
    ///
    /// # Arguments
    /// * `result` - Search result of a single profile.
    pub fn write(&mut self, result: &HmmResult) -> Result<()> {
        if result.hits.is_empty() {
            log::debug!("{}: nothing to write", result.name);
            return Ok(());
        }
        let prefix = file_prefix(&result.name);

        let mut paths = open_fasta(&self.output_dir, &format!("{}.paths.fa", prefix))?;
        for (score, sequence) in &result.resultant {
            paths.write_record(&format!("Score_{:.4}", score), sequence)?;
        }
        paths.flush()?;

        let mut hits = open_fasta(&self.output_dir, &format!("{}.fa", prefix))?;
        for hit in &result.hits {
            let mut header = format!("{}_{}", hit.leader.int_id(), hit.rank);
            if hit.whole_edge {
                header.push_str(" (whole edge)");
            }
            hits.write_record(&header, &hit.sequence)?;
        }
        hits.flush()?;

        if !self.rescore {
            return Ok(());
        }
        let mut edges = open_fasta(&self.output_dir, &format!("{}.edges.fa", prefix))?;
        for path in &result.edge_paths {
            edges.write_record(&path.name, &path.sequence)?;
            if let Some(all_edges) = self.all_edges.as_mut() {
                if self.all_edges_seen.insert(path.name.clone()) {
                    all_edges.write_record(&path.name, &path.sequence)?;
                }
            }
        }
        edges.flush()
    }

    pub fn finish(mut self) -> Result<()> {
        match self.all_edges.as_mut() {
            Some(all_edges) => all_edges.flush(),
            None => Ok(()),
        }
    }
}

/// Tab-separated dump of matched edges and their overhangs.
pub struct SeedWriter {
    writer: BufWriter<File>,
    path: PathBuf,
}

impl SeedWriter {
    pub fn new(output_dir: &Path, hmm_name: &str) -> Result<SeedWriter> {
        let file_name = format!("{}.seeds.tsv", file_prefix(hmm_name));
        create_writer(output_dir, &file_name, |path| {
            let file = File::create(path).map_err(|e| format!("{}: {}", path.display(), e))?;
            let mut writer = SeedWriter {
                writer: BufWriter::new(file),
                path: path.to_path_buf(),
            };
            writer.line(format_args!("#edge_id\tleft\tright"))?;
            Ok(writer)
        })
    }

    fn line(&mut self, args: std::fmt::Arguments) -> Result<()> {
        writeln!(self.writer, "{}", args).map_err(|e| format!("{}: {}", self.path.display(), e))
    }

    pub fn write(&mut self, matched: &EdgeAlnInfo) -> Result<()> {
        for (edge, (left, right)) in matched {
            self.line(format_args!("{}\t{}\t{}", edge.int_id(), left, right))?;
        }
        self.writer
            .flush()
            .map_err(|e| format!("{}: {}", self.path.display(), e))
    }
}
