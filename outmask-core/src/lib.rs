// outmask-core/src/lib.rs
//! # outmask Core Library
//!
//! `outmask-core` removes known secret values from a job's output while it streams.
//! Bytes arrive in arbitrary chunks (whatever a pipe read returned), every occurrence
//! of a configured literal is replaced with a fixed placeholder, and the redacted
//! bytes are forwarded to a sink with as little delay as possible.
//!
//! ## Modules
//!
//! * `sanitizers`: Compiles secret values into the byte-indexed [`SkipTable`].
//! * `redactor`: The streaming [`Redactor`], an `io::Write` decorator.
//! * `shared`: [`SharedWriter`], for several redactors writing into one sink.
//! * `config`: [`RedactionConfig`], loaded from YAML and merged with overrides.
//! * `secrets`: Resolves configured sources into the needle list.
//! * `report`: Statistics, fingerprints and the per-run JSON report.
//! * `headless`: One-shot helpers for in-memory data and readers.
//! * `errors`: [`OutmaskError`].
//!
//! ## Usage Example
//!
//! ```rust
//! use outmask_core::Redactor;
//!
//! let mut redactor = Redactor::new(Vec::new(), "[REDACTED]", ["hunter2", "s3cr3t"]);
//! redactor.write_chunk(b"password is hun").unwrap();
//! redactor.write_chunk(b"ter2 and key is s3cr3t\n").unwrap();
//! let out = redactor.into_inner().unwrap();
//! assert_eq!(out, b"password is [REDACTED] and key is [REDACTED]\n");
//! ```
//!
//! ## Error Handling
//!
//! Streaming calls return the sink's `std::io::Error` untouched. Configuration and
//! secret resolution use [`OutmaskError`].
//!
//! ---
//! License: MIT OR Apache-2.0

pub mod config;
pub mod errors;
pub mod headless;
pub mod redactor;
pub mod report;
pub mod sanitizers;
pub mod secrets;
pub mod shared;

pub use config::{config_candidate_paths, ConfigOverrides, RedactionConfig, DEFAULT_REPLACEMENT};
pub use errors::OutmaskError;
pub use headless::{redact_bytes, redact_reader};
pub use redactor::{Redactor, PIPE_BUFFER_SIZE};
pub use report::{needle_fingerprint, NeedleSummary, RedactionStats, RunReport, StreamReport};
pub use sanitizers::compiler::{SkipEntry, SkipTable};
pub use secrets::resolve_needles;
pub use shared::SharedWriter;
