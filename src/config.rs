// Engine configuration, loaded from the environment or JSON
use crate::selection::PaymentMethod;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const ENV_GATEWAY_URL: &str = "BOOKING_GATEWAY_URL";
pub const ENV_GATEWAY_API_KEY: &str = "BOOKING_GATEWAY_API_KEY";
pub const ENV_GATEWAY_TIMEOUT_MS: &str = "BOOKING_GATEWAY_TIMEOUT_MS";
pub const ENV_RETRY_MAX: &str = "BOOKING_RETRY_MAX";
pub const ENV_DEFAULT_PAYMENT: &str = "BOOKING_DEFAULT_PAYMENT";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Configuration error: {key} has invalid value '{value}'")]
    InvalidValue { key: String, value: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Initialization error: {0}")]
    InitError(String),
}

// Backoff parameters for user-triggered retries
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub backoff_multiplier: f64,
    pub jitter_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff_ms: 100,
            max_backoff_ms: 10000,
            backoff_multiplier: 2.0,
            jitter_factor: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout_ms: u64,
    pub retry: RetryConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api".to_string(),
            api_key: String::new(),
            timeout_ms: 15000,
            retry: RetryConfig::default(),
        }
    }
}

impl GatewayConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                key: "base_url".to_string(),
                value: self.base_url.clone(),
            });
        }
        if self.timeout_ms == 0 {
            return Err(ConfigError::ConfigError(
                "timeout_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    pub gateway: GatewayConfig,
    pub default_payment_method: PaymentMethod,
}

impl EngineConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for the `BOOKING_*` keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_GATEWAY_URL) {
            config.gateway.base_url = url;
        }
        if let Some(key) = lookup(ENV_GATEWAY_API_KEY) {
            config.gateway.api_key = key;
        }
        if let Some(timeout) = lookup(ENV_GATEWAY_TIMEOUT_MS) {
            config.gateway.timeout_ms = parse_value(ENV_GATEWAY_TIMEOUT_MS, &timeout)?;
        }
        if let Some(retries) = lookup(ENV_RETRY_MAX) {
            config.gateway.retry.max_retries = parse_value(ENV_RETRY_MAX, &retries)?;
        }
        if let Some(method) = lookup(ENV_DEFAULT_PAYMENT) {
            config.default_payment_method = parse_value(ENV_DEFAULT_PAYMENT, &method)?;
        }

        config.gateway.validate()?;
        Ok(config)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::ConfigError(e.to_string()))?;
        config.gateway.validate()?;
        Ok(config)
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: raw.to_string(),
    })
}
