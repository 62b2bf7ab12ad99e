//! Tracing bootstrap shared by every binary and test harness that mounts the
//! timeline.

use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Install a fmt subscriber filtered by `RUST_LOG`, falling back to the
/// configured `JOURNEY_LOG_LEVEL`.
///
/// Returns `false` when a global subscriber was already installed; calling
/// this more than once is harmless.
pub fn init_tracing(config: &Config) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}
