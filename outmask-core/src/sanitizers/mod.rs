//! Pattern compilation for the streaming redactor.
//!
//! Secrets are literal byte strings, so "compiling" them means building the
//! byte-indexed skip table the scan loop consults for every byte it lands on.

pub mod compiler;
