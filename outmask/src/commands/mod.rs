//! Subcommand implementations and the helpers they share.

pub mod filter;
pub mod run;

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use is_terminal::IsTerminal;
use log::debug;
use outmask_core::{resolve_needles, RedactionConfig, RunReport, SkipTable};

use crate::cli::SecretArgs;
use crate::ui::output_format;

/// Settings common to every subcommand once the CLI has been parsed.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub quiet: bool,
    pub report_path: Option<PathBuf>,
}

/// Helper for printing informational messages to stderr.
pub fn info_msg(msg: impl AsRef<str>) {
    let stderr_supports_color = io::stderr().is_terminal();
    let _ = output_format::print_info_message(&mut io::stderr(), msg.as_ref(), stderr_supports_color);
}

/// Helper for printing warning messages to stderr.
pub fn warn_msg(msg: impl AsRef<str>) {
    let stderr_supports_color = io::stderr().is_terminal();
    let _ = output_format::print_warn_message(&mut io::stderr(), msg.as_ref(), stderr_supports_color);
}

/// Loads the config (explicit path or discovery), applies command-line
/// overrides, resolves secret values and compiles the shared skip table.
pub fn build_skip_table(args: &SecretArgs, quiet: bool) -> Result<Arc<SkipTable>> {
    let base = match &args.config {
        Some(path) => RedactionConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config '{}'", path.display()))?,
        None => RedactionConfig::discover().context("Failed to load discovered config")?,
    };
    let config = base.merge(args.overrides());

    let needles = resolve_needles(&config, |name| std::env::var(name).ok())
        .context("Failed to resolve secret values")?;
    if needles.is_empty() && !quiet {
        warn_msg("No secret values configured; output is passed through unchanged.");
    }

    let table = SkipTable::compile(needles, config.replacement.into_bytes());
    debug!(
        "Compiled {} needle(s), lengths {}..={}.",
        table.needles().len(),
        table.min_len(),
        table.max_len()
    );
    Ok(Arc::new(table))
}

/// Writes the JSON report if requested and prints the summary line unless quiet.
pub fn finalize_run(report: &RunReport, opts: &RunOptions) -> Result<()> {
    if let Some(path) = &opts.report_path {
        write_report(report, path)?;
    }
    if !opts.quiet {
        let stderr_supports_color = io::stderr().is_terminal();
        output_format::print_summary(&mut io::stderr(), report.total_redactions(), stderr_supports_color)
            .context("Failed to print redaction summary")?;
    }
    Ok(())
}

fn write_report(report: &RunReport, path: &Path) -> Result<()> {
    report
        .write_to_file(path)
        .with_context(|| format!("Failed to write report to '{}'", path.display()))
}
