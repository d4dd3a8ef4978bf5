//! Tracing setup for `wlog`.
//!
//! Diagnostics go to stderr; stdout carries only command output (JSON, CSV,
//! date lists) so it can be piped.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const FALLBACK_LEVEL: &str = "info";

/// Pick the active filter: `RUST_LOG` wins, then the configured level.
/// A directive that does not parse falls back to `info`.
fn env_filter(configured: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(configured))
        .unwrap_or_else(|_| EnvFilter::new(FALLBACK_LEVEL))
}

pub fn init() {
    init_with_level(FALLBACK_LEVEL)
}

/// Install the global subscriber using `level` (e.g. `debug`, or a directive
/// such as `workout_core=trace`) unless `RUST_LOG` is set.
///
/// A second call is a no-op.
pub fn init_with_level(level: &str) {
    let installed = tracing_subscriber::registry()
        .with(env_filter(level))
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .try_init();
    if installed.is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
}

#[cfg(test)]
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::new("debug"))
        .try_init();
}
