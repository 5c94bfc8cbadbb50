//! Tracing setup and named spans for each pipeline stage.

pub mod spans;

use tracing_subscriber::EnvFilter;

use crate::config::ObservabilityConfig;
use crate::errors::{PccError, PccResult};

/// Install the global `tracing` subscriber.
///
/// Returns `Ok(false)` when a subscriber was already installed (tests, host
/// applications), which is not an error.
pub fn init_tracing(config: &ObservabilityConfig) -> PccResult<bool> {
    let filter = EnvFilter::try_new(&config.log_level)
        .map_err(|e| PccError::ConfigError(format!("invalid log_level: {e}")))?;

    let installed = if config.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .try_init()
            .is_ok()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .try_init()
            .is_ok()
    };

    Ok(installed)
}
