// outmask/src/main.rs
//! outmask entry point.
//!
//! Parses the command line, builds the shared skip table from config and
//! command-line secrets, then dispatches to `filter` or `run`.

use anyhow::Result;
use clap::Parser;
use log::LevelFilter;
use outmask::cli::{Cli, Commands};
use outmask::commands::{self, RunOptions};
use outmask::logger;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.quiet {
        logger::init_logger(Some(LevelFilter::Off));
    } else if cli.debug {
        logger::init_logger(Some(LevelFilter::Debug));
    } else {
        logger::init_logger(None);
    }

    let table = commands::build_skip_table(&cli.secrets, cli.quiet)?;
    let opts = RunOptions {
        quiet: cli.quiet,
        report_path: cli.secrets.report.clone(),
    };

    let exit_code = match &cli.command {
        Commands::Filter(cmd) => commands::filter::run_filter(table, cmd, &opts)?,
        Commands::Run(cmd) => commands::run::run_job(table, cmd, &opts).await?,
    };

    if exit_code != 0 {
        std::process::exit(exit_code);
    }
    Ok(())
}
