//! Server configuration from the environment.

use config::{Config, Environment};
use greenlight_error::ConfigError;
use greenlight_models::{ModelAttempt, ProviderKind};
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;

/// Everything the binary needs to assemble the pipeline.
///
/// Read from `GREENLIGHT_*` environment variables; `.env` files are loaded
/// by the binary before this runs.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Socket address to bind, e.g. "0.0.0.0:8080"
    pub bind_addr: String,
    /// Which wire shape the provider endpoint speaks
    pub provider: String,
    /// Base URL of the provider endpoint
    pub base_url: String,
    /// Provider API key
    pub api_key: String,
    /// Fallback chain as "model@timeout_secs" entries, comma separated
    pub model_chain: String,
    /// Database pool size
    pub db_pool_size: u32,
    /// Log filter when RUST_LOG is unset
    pub log_level: String,
    /// Emit JSON-formatted logs
    pub json_logs: bool,
}

impl ServerConfig {
    /// Load from `GREENLIGHT_*` environment variables over defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("bind_addr", "0.0.0.0:8080")
            .map_err(|e| ConfigError::new(e.to_string()))?
            .set_default("provider", "openai")
            .map_err(|e| ConfigError::new(e.to_string()))?
            .set_default("db_pool_size", 10)
            .map_err(|e| ConfigError::new(e.to_string()))?
            .set_default("log_level", "info")
            .map_err(|e| ConfigError::new(e.to_string()))?
            .set_default("json_logs", false)
            .map_err(|e| ConfigError::new(e.to_string()))?
            .add_source(Environment::with_prefix("GREENLIGHT"))
            .build()
            .map_err(|e| ConfigError::new(format!("failed to build configuration: {}", e)))?
            .try_deserialize()
            .map_err(|e| ConfigError::new(format!("failed to parse configuration: {}", e)))
    }

    /// The provider tag selecting the wire codec.
    pub fn provider_kind(&self) -> Result<ProviderKind, ConfigError> {
        ProviderKind::from_str(&self.provider).map_err(|_| {
            ConfigError::new(format!(
                "unknown provider '{}'; expected openai, anthropic, or google",
                self.provider
            ))
        })
    }

    /// Parse the fallback chain specification.
    ///
    /// Each entry is `model@timeout_secs`; a bare `model` gets the default
    /// 60 second budget.
    pub fn chain(&self) -> Result<Vec<ModelAttempt>, ConfigError> {
        parse_chain(&self.model_chain)
    }
}

const DEFAULT_TIMEOUT_SECS: u64 = 60;

fn parse_chain(spec: &str) -> Result<Vec<ModelAttempt>, ConfigError> {
    let mut attempts = Vec::new();

    for entry in spec.split(',') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        let (model, timeout) = match entry.split_once('@') {
            Some((model, secs)) => {
                let secs: u64 = secs.trim().parse().map_err(|_| {
                    ConfigError::new(format!("bad timeout in chain entry '{}'", entry))
                })?;
                (model.trim(), Duration::from_secs(secs))
            }
            None => (entry, Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
        };
        if model.is_empty() {
            return Err(ConfigError::new(format!("empty model in chain entry '{}'", entry)));
        }
        attempts.push(ModelAttempt::new(model, timeout));
    }

    if attempts.is_empty() {
        return Err(ConfigError::new(
            "GREENLIGHT_MODEL_CHAIN must name at least one model".to_string(),
        ));
    }

    Ok(attempts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_entries_parse_with_and_without_timeouts() {
        let attempts = parse_chain("fast-drafter@30, sturdy-writer@120, plain-model").unwrap();
        assert_eq!(attempts.len(), 3);
        assert_eq!(attempts[0].model, "fast-drafter");
        assert_eq!(attempts[0].timeout, Duration::from_secs(30));
        assert_eq!(attempts[2].timeout, Duration::from_secs(60));
    }

    #[test]
    fn empty_chain_is_rejected() {
        assert!(parse_chain("").is_err());
        assert!(parse_chain(" , ,").is_err());
    }

    #[test]
    fn garbage_timeout_is_rejected() {
        assert!(parse_chain("model@soon").is_err());
    }
}
