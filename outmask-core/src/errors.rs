//! errors.rs - Custom error types for the outmask-core library.
//!
//! The streaming path (`Redactor`) never wraps errors: whatever the sink returns is
//! handed back as the same `std::io::Error`. This enum covers everything around it,
//! i.e. loading configuration, resolving secret values and writing reports.
//!
//! License: MIT OR APACHE 2.0

use std::path::PathBuf;
use thiserror::Error;

/// This enum represents all possible error types in the `outmask-core` library.
///
/// By using `#[non_exhaustive]`, we signal to consumers of this library that
/// new variants may be added in future versions.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum OutmaskError {
    #[error("Failed to read config file {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yml::Error,
    },

    /// Never carries the secret value, only the variable name.
    #[error("Secret environment variable '{0}' is not set")]
    MissingSecretEnv(String),

    #[error("Failed to read secret file {}: {source}", path.display())]
    SecretFileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize run report: {0}")]
    ReportSerialization(#[from] serde_json::Error),

    #[error("An unexpected I/O error occurred: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result alias used across the non-streaming parts of the library.
pub type Result<T> = std::result::Result<T, OutmaskError>;
