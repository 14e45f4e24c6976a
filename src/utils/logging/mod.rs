//! Tracing subscriber setup

use crate::config::{LogFormat, LoggingConfig};
use crate::utils::error::{ConsoleError, Result};
use tracing_subscriber::EnvFilter;

/// Filter from `RUST_LOG`, falling back to the configured level
pub fn env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&config.level)
            .map_err(|e| {
                ConsoleError::config(format!("invalid log level {:?}: {e}", config.level))
            }),
    }
}

/// Install the global subscriber; fails if one is already set
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = env_filter(config)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false);

    let installed = match config.format {
        LogFormat::Json => builder.json().with_current_span(false).try_init(),
        LogFormat::Text => builder.try_init(),
    };

    installed.map_err(|e| ConsoleError::config(format!("failed to initialise logging: {e}")))
}
