//! Tracing subscriber setup.

use larder_core::config::GeneralConfig;
use tracing_subscriber::EnvFilter;

use crate::error::{Result, ServiceError};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise `config.log_level` is used. With
/// `config.json_logs` each event is one JSON object per line.
///
/// # Errors
/// [`ServiceError::Telemetry`] if the filter is invalid or a global
/// subscriber is already installed.
pub fn init_tracing(config: &GeneralConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log_level)
            .map_err(|e| ServiceError::Telemetry(format!("bad log level '{}': {e}", config.log_level)))?,
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = if config.json_logs {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| ServiceError::Telemetry(e.to_string()))
}
