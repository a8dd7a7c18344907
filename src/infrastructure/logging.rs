//! Logging setup for the command line.

use anyhow::{anyhow, Result};
use tracing::Level;

/// Map the 0 (most verbose) to 5 (least verbose) scale onto tracing levels.
pub fn verbosity_to_level(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::TRACE,
        1 => Level::DEBUG,
        2 => Level::INFO,
        3 => Level::WARN,
        _ => Level::ERROR,
    }
}

/// Install the global fmt subscriber. `RUST_LOG`, when set, overrides the verbosity.
pub fn init_logging(verbosity: u8) -> Result<()> {
    let level = verbosity_to_level(verbosity);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level.as_str()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("Failed to install logger: {}", e))
}
