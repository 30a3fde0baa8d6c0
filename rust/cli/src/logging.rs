//! Tracing subscriber setup for the binary.
//!
//! Events go to stderr so stdout stays machine-readable. The filter comes
//! from `TABLELOG_LOG` (same syntax as `RUST_LOG`) and defaults to `warn`,
//! which still shows synthesized auto-actions.

use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "TABLELOG_LOG";

pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Installs the global subscriber. Safe to call more than once.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
