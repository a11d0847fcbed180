//! `outmask filter`: redacts stdin (or a file) to stdout.

use std::fs::File;
use std::io;
use std::sync::Arc;

use anyhow::{Context, Result};
use log::{debug, info};
use outmask_core::{redact_reader, Redactor, RunReport, SkipTable, StreamReport};

use crate::cli::FilterCommand;
use crate::commands::{finalize_run, RunOptions};

/// Runs the filter to completion. Returns the process exit code.
pub fn run_filter(table: Arc<SkipTable>, cmd: &FilterCommand, opts: &RunOptions) -> Result<i32> {
    info!("Starting outmask filter.");
    let mut report = RunReport::start(None, table.needles().len());

    let stdout = io::stdout();
    let mut redactor = Redactor::with_table(stdout.lock(), Arc::clone(&table));
    let stats = match &cmd.input_file {
        Some(path) => {
            debug!("Reading input from file: {}", path.display());
            let file = File::open(path)
                .with_context(|| format!("Failed to open input file '{}'", path.display()))?;
            redact_reader(file, &mut redactor, cmd.chunk_size)
        }
        None => {
            debug!("Reading input from stdin.");
            redact_reader(io::stdin().lock(), &mut redactor, cmd.chunk_size)
        }
    }
    .context("Failed to forward redacted output")?;
    drop(redactor);

    debug!("Filter read {} byte(s), wrote {} byte(s).", stats.bytes_in, stats.bytes_out);
    report.add_stream(StreamReport::from_stats("stdout", &table, &stats));
    report.finish(Some(0));
    finalize_run(&report, opts)?;
    Ok(0)
}
