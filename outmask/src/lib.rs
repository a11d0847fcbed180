// outmask/src/lib.rs
//! # outmask CLI Application
//!
//! This crate provides the command-line interface around `outmask-core`: a
//! `filter` mode for piped input and a `run` mode that wraps a job command and
//! redacts both of its output streams.

pub mod cli;
pub mod commands;
pub mod logger;
pub mod ui;
