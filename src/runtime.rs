//! Runtime helpers shared across binaries.
//!
//! Centralizes logging setup and boolean env flags so the CLIs behave the same
//! way instead of re-implementing it.

use std::env;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "PROMPT_DIRECTORY_LOG";
const DEFAULT_LOG_FILTER: &str = "warn";

/// Install a stderr `tracing` subscriber.
///
/// The filter comes from `PROMPT_DIRECTORY_LOG`, then `RUST_LOG`, then
/// `warn`. A second call (or a subscriber installed by a test harness) is
/// ignored.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(log_filter())
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn log_filter() -> EnvFilter {
    env::var(LOG_ENV)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .and_then(|value| EnvFilter::try_new(value).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Whether an env flag is set to something other than empty or `0`.
pub fn env_flag(name: &str) -> bool {
    env::var(name)
        .ok()
        .map(|v| !v.trim().is_empty() && v != "0")
        .unwrap_or(false)
}
