use crate::hmm::MatcherThresholds;
use crate::search::workflow::Params;
use crate::utils::Result;
use clap::{ArgAction, Args, Parser, Subcommand};
use env_logger::fmt::Color;
use log::{Level, LevelFilter};
use once_cell::sync::Lazy;
use std::{
    io::Write,
    path::{Path, PathBuf},
};

pub static FULL_VERSION: Lazy<String> = Lazy::new(|| {
    format!(
        "{}-{}",
        env!("CARGO_PKG_VERSION"),
        env!("VERGEN_GIT_DESCRIBE")
    )
});

#[derive(Parser)]
#[command(name="graph-hmm",
          version=&**FULL_VERSION,
          about="Profile HMM search over sequence assembly graphs",
          long_about = None,
          disable_help_subcommand = true,
          help_template = "{name} {version}\n{about-section}\n{usage-heading}\n    {usage}\n\n{all-args}{after-help}",
          )]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[clap(short = 'v')]
    #[clap(long = "verbose")]
    #[clap(action = ArgAction::Count, help = "Specify multiple times to increase verbosity level (e.g., -vv for more verbosity)")]
    pub verbosity: u8,
}

#[derive(Subcommand)]
pub enum Command {
    #[clap(about = "Find the best-scoring graph walks for each profile")]
    Search(SearchArgs),
    #[clap(about = "Report the edges matched by each profile and their overhangs")]
    Seeds(SeedsArgs),
}

#[derive(Args, Debug)]
pub struct InputArgs {
    #[clap(help = "HMMER3 profile file (optionally gzipped)")]
    #[clap(value_name = "HMM_FILE")]
    #[arg(value_parser = check_file_exists)]
    pub hmm_path: PathBuf,

    #[clap(help = "Assembly graph in GFA format (optionally gzipped)")]
    #[clap(value_name = "GRAPH")]
    #[arg(value_parser = check_file_exists)]
    pub graph_path: PathBuf,

    #[clap(help = "k-mer size of the graph")]
    #[clap(value_name = "K")]
    #[arg(value_parser = k_in_range)]
    pub k: usize,

    #[clap(short = 'o')]
    #[clap(long = "output-dir")]
    #[clap(help = "Directory for output files")]
    #[clap(value_name = "DIR")]
    #[clap(default_value = ".")]
    #[arg(value_parser = check_output_dir)]
    pub output_dir: PathBuf,

    #[clap(long = "edge-id")]
    #[clap(value_name = "ID")]
    #[clap(help = "Only seed on the edge with this id (0 = all edges)")]
    #[clap(default_value = "0")]
    pub edge_id: u64,
}

#[derive(Args, Debug)]
pub struct MatcherArgs {
    #[clap(help_heading("Seed matcher"))]
    #[clap(short = 'T')]
    #[clap(value_name = "BITS")]
    #[clap(help = "Sequence bit score threshold")]
    #[clap(default_value = "10.0")]
    #[arg(value_parser = finite_float)]
    pub seq_bits: f64,

    #[clap(help_heading("Seed matcher"))]
    #[clap(long = "domT")]
    #[clap(value_name = "BITS")]
    #[clap(help = "Domain bit score threshold")]
    #[arg(value_parser = finite_float)]
    pub dom_bits: Option<f64>,
}

impl MatcherArgs {
    pub fn thresholds(&self) -> MatcherThresholds {
        MatcherThresholds {
            seq_bits: self.seq_bits,
            dom_bits: self.dom_bits,
        }
    }
}

#[derive(Parser, Debug)]
#[command(arg_required_else_help(true))]
pub struct SearchArgs {
    #[clap(flatten)]
    pub input: InputArgs,

    #[clap(flatten)]
    pub matcher: MatcherArgs,

    #[clap(long = "top")]
    #[clap(value_name = "N")]
    #[clap(help = "Number of best walks reported per component")]
    #[clap(default_value = "10")]
    #[arg(value_parser = positive_count)]
    pub top: usize,

    #[clap(long = "min-size")]
    #[clap(value_name = "N")]
    #[clap(help = "Components with fewer edge pairs are reported as their seed edge")]
    #[clap(default_value = "2")]
    pub min_size: usize,

    #[clap(long = "max-size")]
    #[clap(value_name = "N")]
    #[clap(help = "Components with more edge pairs are skipped")]
    #[clap(default_value = "1000")]
    pub max_size: usize,

    #[clap(long = "no-save")]
    #[clap(help = "Do not write FASTA outputs")]
    pub no_save: bool,

    #[clap(long = "no-rescore")]
    #[clap(help = "Do not write edge path files for rescoring")]
    pub no_rescore: bool,

    #[clap(long = "debug")]
    #[clap(help = "Log every seed hit at info level")]
    pub debug: bool,

    #[clap(short = 't')]
    #[clap(long = "threads")]
    #[clap(help = "Number of threads")]
    #[clap(value_name = "THREADS")]
    #[clap(default_value = "1")]
    #[arg(value_parser = threads_in_range)]
    pub num_threads: usize,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "max-states")]
    #[clap(value_name = "N")]
    #[clap(help = "Search states expanded per component before returning the best walks so far")]
    #[clap(default_value = "10000000")]
    #[arg(value_parser = positive_count)]
    pub max_states: usize,
}

impl SearchArgs {
    pub fn params(&self) -> Params {
        Params {
            top: self.top,
            edge_id: edge_filter(self.input.edge_id),
            min_size: self.min_size,
            max_size: self.max_size,
            max_states: self.max_states,
            thresholds: self.matcher.thresholds(),
            debug: self.debug,
            cancel: None,
        }
    }
}

#[derive(Parser, Debug)]
#[command(arg_required_else_help(true))]
pub struct SeedsArgs {
    #[clap(flatten)]
    pub input: InputArgs,

    #[clap(flatten)]
    pub matcher: MatcherArgs,
}

/// Edge id 0 selects every edge.
pub fn edge_filter(edge_id: u64) -> Option<u64> {
    (edge_id != 0).then_some(edge_id)
}

pub fn init_verbose(args: &Cli) {
    let filter_level: LevelFilter = match args.verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };

    env_logger::Builder::from_default_env()
        .format(|buf, record| {
            let level = record.level();
            let mut style = buf.style();
            match record.level() {
                Level::Error => style.set_color(Color::Red),
                Level::Warn => style.set_color(Color::Yellow),
                Level::Info => style.set_color(Color::Green),
                Level::Debug => style.set_color(Color::Blue),
                Level::Trace => style.set_color(Color::Cyan),
            };

            writeln!(
                buf,
                "{} [{}] - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                style.value(level),
                record.args()
            )
        })
        .filter_level(filter_level)
        .init();
}

fn check_output_dir(s: &str) -> Result<PathBuf> {
    let path = Path::new(s);
    if path.exists() && !path.is_dir() {
        return Err(format!("Not a directory: {}", path.display()));
    }
    if let Some(parent_dir) = path.parent() {
        if !parent_dir.as_os_str().is_empty() && !parent_dir.exists() {
            return Err(format!("Path does not exist: {}", parent_dir.display()));
        }
    }
    Ok(path.to_path_buf())
}

fn threads_in_range(s: &str) -> Result<usize> {
    let thread: usize = s
        .parse()
        .map_err(|_| format!("`{}` is not a valid thread number", s))?;
    if thread >= 1 {
        Ok(thread)
    } else {
        Err("Number of threads must be at least 1".into())
    }
}

fn positive_count(s: &str) -> Result<usize> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("`{}` is not a valid count", s))?;
    if value >= 1 {
        Ok(value)
    } else {
        Err("Value must be at least 1".into())
    }
}

fn k_in_range(s: &str) -> Result<usize> {
    let k: usize = s
        .parse()
        .map_err(|_| format!("`{}` is not a valid k-mer size", s))?;
    if k >= 1 {
        Ok(k)
    } else {
        Err("k must be at least 1".into())
    }
}

fn check_file_exists(s: &str) -> Result<PathBuf> {
    let path = Path::new(s);
    if !path.exists() {
        Err(format!("File does not exist: {}", path.display()))
    } else {
        Ok(path.to_path_buf())
    }
}

fn finite_float(s: &str) -> Result<f64> {
    let value = s
        .parse::<f64>()
        .map_err(|e| format!("Could not parse float: {}", e))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(format!("The value must be finite, got: {}", value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validators_reject_bad_values() {
        assert_eq!(threads_in_range("4"), Ok(4));
        assert!(threads_in_range("0").is_err());
        assert!(positive_count("x").is_err());
        assert!(k_in_range("0").is_err());
        assert!(finite_float("inf").is_err());
        assert_eq!(finite_float("12.5"), Ok(12.5));
        assert!(check_file_exists("/no/such/file.hmm").is_err());
    }

    #[test]
    fn parses_search_arguments() {
        let dir = tempfile::tempdir().unwrap();
        let hmm = dir.path().join("q.hmm");
        let gfa = dir.path().join("g.gfa");
        std::fs::write(&hmm, "").unwrap();
        std::fs::write(&gfa, "").unwrap();

        let cli = Cli::try_parse_from([
            "graph-hmm",
            "-vv",
            "search",
            hmm.to_str().unwrap(),
            gfa.to_str().unwrap(),
            "55",
            "--top",
            "3",
            "--edge-id",
            "7",
            "--domT",
            "5",
            "--no-rescore",
        ])
        .unwrap();
        assert_eq!(cli.verbosity, 2);
        let Command::Search(args) = cli.command else {
            panic!("expected the search command");
        };
        assert_eq!(args.input.k, 55);
        assert!(args.no_rescore && !args.no_save);
        let params = args.params();
        assert_eq!(params.top, 3);
        assert_eq!(params.edge_id, Some(7));
        assert_eq!(params.max_size, 1000);
        assert_eq!(params.thresholds.seq_bits, 10.0);
        assert_eq!(params.thresholds.dom_bits, Some(5.0));
        assert_eq!(edge_filter(0), None);
    }
}
