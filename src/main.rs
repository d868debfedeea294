//! `bashgen` binary entry point.
use anyhow::Result;
use clap::Parser;

use bashgen::cli::{Cli, Command};
use bashgen::commands;
use bashgen::logging::{self, Logger};

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = Cli::parse();
    logging::init_subscriber(args.verbose);

    // Questions block on stdin; leave with the conventional SIGINT status.
    if let Err(e) = ctrlc::set_handler(|| {
        Logger::new("bashgen").warn("Cancelled.");
        std::process::exit(130);
    }) {
        tracing::debug!("could not install Ctrl-C handler: {e}");
    }

    match args.command {
        Command::Generate(opts) => commands::generate::run(&opts, &Logger::new("generate")),
        Command::Matrix(opts) => commands::matrix::run(&opts, &Logger::new("matrix")),
        Command::Version => commands::version::run(),
    }
}
