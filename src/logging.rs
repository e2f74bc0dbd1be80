//! Logging setup for the REPL.
//!
//! Writes to stderr so command output on stdout stays clean. Set
//! `DEBUG_LOGGING=1` to enable debug output for the eqlog crates.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

pub fn init() {
    let debug_logging = std::env::var("DEBUG_LOGGING").is_ok();

    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(true);

    let filter_directive = if debug_logging {
        "info,eqlog=debug,eqlog_core=debug"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(EnvFilter::new(filter_directive))
        .init();

    tracing::debug!(debug_logging, "logging initialized");
}
