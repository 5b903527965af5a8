//! Tracing subscriber initialization for the server binary.

use greenlight_error::ConfigError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Initialize the global subscriber.
///
/// `RUST_LOG` wins when set; otherwise the configured level applies. Model
/// output is never logged at any level, only lengths and fingerprints.
pub fn init_tracing(log_level: &str, json_logs: bool) -> Result<(), ConfigError> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .map_err(|e| ConfigError::new(format!("bad log filter '{}': {}", log_level, e)))?;

    let fmt_layer = if json_logs {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_level(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_level(true)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    Ok(())
}
