//! Tracing subscriber setup

use curlarc_common::config::{Config, LogFormat};
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber
///
/// Fails if one is already installed.
pub fn init_tracing(config: &Config) -> Result<(), anyhow::Error> {
    let filter = EnvFilter::try_new(&config.rust_log)
        .map_err(|e| anyhow::anyhow!("Invalid RUST_LOG directive '{}': {}", config.rust_log, e))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = match config.log_format {
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    installed.map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {}", e))
}
