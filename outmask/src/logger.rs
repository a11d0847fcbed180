//! Logging setup for the `outmask` binary.
//!
//! Logs always go to stderr so they never mix with redacted output on stdout.

use env_logger::{Builder, Env, Target};
use log::LevelFilter;

/// Initializes `env_logger`.
///
/// With `None`, `RUST_LOG` decides and defaults to `warn`. `Some(level)` pins the
/// level for the outmask crates (`Off` silences everything).
pub fn init_logger(level: Option<LevelFilter>) {
    let mut builder = Builder::from_env(Env::default().default_filter_or("warn"));
    match level {
        Some(LevelFilter::Off) => {
            builder.filter_level(LevelFilter::Off);
        }
        Some(level) => {
            builder.filter_module("outmask", level);
            builder.filter_module("outmask_core", level);
        }
        None => {}
    }
    builder.target(Target::Stderr).format_timestamp_millis();

    // A second init (e.g. in tests) is harmless.
    let _ = builder.try_init();
}
