//! Defines the `FastaWriter` struct for writing named sequences as FASTA records.
//!
use crate::utils::Result;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Sequence columns per FASTA line.
pub const LINE_WIDTH: usize = 60;

/// Buffered FASTA output with fixed-width sequence lines.
pub struct FastaWriter<W: Write> {
    writer: W,
    /// Destination shown in error messages.
    label: PathBuf,
}

impl FastaWriter<BufWriter<File>> {
    /// Constructs a new `FastaWriter` that creates (or truncates) a file.
    ///
    /// # Arguments
    /// * `path` - Path of the output FASTA file.
    ///
    /// # Returns
    /// Returns a `Result` with either a new `FastaWriter` instance or an error message.
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::create(path).map_err(|e| format!("{}: {}", path.display(), e))?;
        Ok(FastaWriter {
            writer: BufWriter::new(file),
            label: path.to_path_buf(),
        })
    }
}

impl<W: Write> FastaWriter<W> {
    pub fn new(writer: W) -> Self {
        FastaWriter {
            writer,
            label: PathBuf::from("<stream>"),
        }
    }

    /// Writes one record, `header` without the leading `>`.
    pub fn write_record(&mut self, header: &str, sequence: &str) -> Result<()> {
        let label = &self.label;
        let err = |e: std::io::Error| format!("{}: {}", label.display(), e);
        writeln!(self.writer, ">{}", header).map_err(err)?;
        for line in sequence.as_bytes().chunks(LINE_WIDTH) {
            self.writer.write_all(line).map_err(err)?;
            self.writer.write_all(b"\n").map_err(err)?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer
            .flush()
            .map_err(|e| format!("{}: {}", self.label.display(), e))
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}
