//! Terminal output helpers (stderr messages and the redaction summary).

pub mod output_format;
