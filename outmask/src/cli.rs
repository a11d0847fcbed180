//! This file defines the command-line interface (CLI) for the outmask application,
//! including all available commands and their arguments.
//! License: MIT OR Apache-2.0

use clap::{Args, Parser, Subcommand};
use outmask_core::{ConfigOverrides, PIPE_BUFFER_SIZE};
use std::path::PathBuf;

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(
    name = "outmask",
    version = env!("CARGO_PKG_VERSION"),
    about = "Redact secret values from CI job output as it streams",
    long_about = "outmask sits between a running job and its log sink. Every occurrence of a configured secret value is replaced with a fixed placeholder before the bytes are written out, including secrets split across pipe reads. Completed lines are forwarded immediately.",
    arg_required_else_help = true,
)]
pub struct Cli {
    /// Disable informational messages
    #[arg(long, short = 'q', global = true, help = "Suppress logging and the redaction summary.")]
    pub quiet: bool,

    /// Enable debug logging (overrides RUST_LOG for outmask crates)
    #[arg(long, short = 'd', global = true, help = "Enable debug logging.")]
    pub debug: bool,

    #[command(flatten)]
    pub secrets: SecretArgs,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Where secret values come from and how matches are rendered.
#[derive(Args, Debug, Default, Clone)]
pub struct SecretArgs {
    /// Path to a redaction configuration file (YAML).
    #[arg(long = "config", value_name = "FILE", global = true, help = "Path to a redaction configuration file (YAML).")]
    pub config: Option<PathBuf>,

    /// A literal secret value; may be repeated.
    #[arg(long = "secret", value_name = "VALUE", global = true, help = "Redact this literal value (repeatable).")]
    pub secrets: Vec<String>,

    /// Name of an environment variable holding a secret; may be repeated.
    #[arg(long = "secret-env", value_name = "NAME", global = true, help = "Redact the value of this environment variable (repeatable).")]
    pub secret_env: Vec<String>,

    /// File whose contents are a secret; may be repeated.
    #[arg(long = "secret-file", value_name = "FILE", global = true, help = "Redact the contents of this file (repeatable).")]
    pub secret_files: Vec<PathBuf>,

    /// Placeholder written instead of each secret.
    #[arg(long = "replacement", value_name = "TEXT", global = true, help = "Text written in place of each secret (default: [REDACTED]).")]
    pub replacement: Option<String>,

    /// Write a JSON run report here.
    #[arg(long = "report", value_name = "FILE", global = true, help = "Write a JSON run report (counts and fingerprints, never values).")]
    pub report: Option<PathBuf>,
}

impl SecretArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            replacement: self.replacement.clone(),
            secrets: self.secrets.clone(),
            secret_env: self.secret_env.clone(),
            secret_files: self.secret_files.clone(),
        }
    }
}

/// All available commands for the `outmask` CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Redacts stdin (or a file) to stdout.
    #[command(about = "Redact stdin (or a file) to stdout.")]
    Filter(FilterCommand),

    /// Runs a job command and redacts its stdout and stderr.
    #[command(about = "Run a command and redact its stdout and stderr.")]
    Run(RunCommand),
}

/// Arguments for the `filter` command.
#[derive(Parser, Debug)]
pub struct FilterCommand {
    /// Path to an input file (reads from stdin if not provided).
    #[arg(long = "input", short = 'i', value_name = "FILE", help = "Read input from a specified file instead of stdin.")]
    pub input_file: Option<PathBuf>,

    /// Read size in bytes.
    #[arg(long = "chunk-size", value_name = "BYTES", default_value_t = PIPE_BUFFER_SIZE, help = "Maximum number of bytes read per chunk.")]
    pub chunk_size: usize,
}

/// Arguments for the `run` command.
#[derive(Parser, Debug)]
pub struct RunCommand {
    /// Send the job's stderr to stdout as well.
    #[arg(long = "merge-output", help = "Write the job's stderr into stdout (one combined log).")]
    pub merge_output: bool,

    /// Read size in bytes.
    #[arg(long = "chunk-size", value_name = "BYTES", default_value_t = PIPE_BUFFER_SIZE, help = "Maximum number of bytes read per chunk.")]
    pub chunk_size: usize,

    /// The job command and its arguments.
    #[arg(value_name = "COMMAND", required = true, num_args = 1.., trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_with_trailing_command() {
        let cli = Cli::try_parse_from([
            "outmask", "--secret", "hunter2", "run", "--merge-output", "--", "sh", "-c", "echo hi",
        ])
        .unwrap();
        assert_eq!(cli.secrets.secrets, vec!["hunter2".to_string()]);
        match cli.command {
            Commands::Run(run) => {
                assert!(run.merge_output);
                assert_eq!(run.chunk_size, PIPE_BUFFER_SIZE);
                assert_eq!(run.command, vec!["sh", "-c", "echo hi"]);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_secret_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "outmask", "filter", "--secret-env", "TOKEN", "--replacement", "***", "--chunk-size", "3",
        ])
        .unwrap();
        let overrides = cli.secrets.overrides();
        assert_eq!(overrides.secret_env, vec!["TOKEN".to_string()]);
        assert_eq!(overrides.replacement.as_deref(), Some("***"));
        match cli.command {
            Commands::Filter(filter) => assert_eq!(filter.chunk_size, 3),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_run_requires_a_command() {
        assert!(Cli::try_parse_from(["outmask", "run"]).is_err());
    }
}
