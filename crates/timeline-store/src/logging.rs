//! Tracing subscriber setup for applications embedding the store.
//!
//! The store itself only emits `tracing` events. The host application calls
//! [`init_tracing`] once at startup; `RUST_LOG` wins over the configured
//! level when set.

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::error::StoreError;

/// Install a global fmt subscriber built from `config`.
///
/// Returns [`StoreError::Config`] if the level is not a valid filter or a
/// global subscriber is already installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), StoreError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)
            .map_err(|e| StoreError::Config(format!("invalid log level {}: {e}", config.level)))?,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    installed.map_err(|e| StoreError::Config(format!("tracing already initialized: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_reports_error() {
        let config = LoggingConfig::default();
        // The first call may race other tests in the binary; the second must fail.
        let _ = init_tracing(&config);
        assert!(matches!(init_tracing(&config), Err(StoreError::Config(_))));
    }
}
