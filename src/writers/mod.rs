mod fasta;
mod results;

pub use fasta::{FastaWriter, LINE_WIDTH};
pub use results::{ResultWriter, SeedWriter, ALL_EDGES_FILE};
