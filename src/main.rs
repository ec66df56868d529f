use clap::Parser;
use graph_hmm::{
    cli::{init_verbose, Cli, Command, FULL_VERSION},
    commands::{search, seeds},
    utils::{handle_error_and_exit, Result},
};

fn runner() -> Result<()> {
    let cli = Cli::parse();
    init_verbose(&cli);
    let subcommand_name = match cli.command {
        Command::Search(_) => "search",
        Command::Seeds(_) => "seeds",
    };

    log::info!(
        "Running {}-{} [{}]",
        env!("CARGO_PKG_NAME"),
        *FULL_VERSION,
        subcommand_name
    );
    match cli.command {
        Command::Search(args) => search::search(args)?,
        Command::Seeds(args) => seeds::seeds(args)?,
    }
    log::info!("{} end", env!("CARGO_PKG_NAME"));
    Ok(())
}

fn main() {
    if let Err(e) = runner() {
        handle_error_and_exit(e);
    }
}
