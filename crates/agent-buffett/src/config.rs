//! Configuration for the analysis service

use crate::error::{BuffettError, Result};
use agent_llm::providers::{DEFAULT_GEMINI_API_BASE, GeminiConfig};
use agent_utils::LogFormat;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

/// Model used by every tier unless overridden
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Model identifiers for the three capability tiers
///
/// The trigger and quant stages run on `high`, both researchers on `mid`.
/// `low` is accepted for configuration parity; no stage uses it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelTiers {
    pub low: String,
    pub mid: String,
    pub high: String,
}

impl Default for ModelTiers {
    fn default() -> Self {
        Self {
            low: DEFAULT_MODEL.to_string(),
            mid: DEFAULT_MODEL.to_string(),
            high: DEFAULT_MODEL.to_string(),
        }
    }
}

/// Configuration for the analysis service
#[derive(Clone, Serialize, Deserialize)]
pub struct BuffettConfig {
    /// Address the HTTP server listens on
    pub bind_addr: SocketAddr,

    /// Credential for the Generative Language API
    #[serde(skip_serializing)]
    pub api_key: String,

    /// Base URL of the Generative Language API
    pub api_base: String,

    /// Model per tier
    pub models: ModelTiers,

    /// Posts of one request analyzed at the same time
    pub max_concurrent_posts: usize,

    /// Timeout of a single upstream request
    pub request_timeout: Duration,

    /// Max output tokens per completion
    pub max_tokens: usize,

    /// Log output format
    pub log_format: LogFormat,
}

impl Default for BuffettConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 5000)),
            api_key: String::new(),
            api_base: DEFAULT_GEMINI_API_BASE.to_string(),
            models: ModelTiers::default(),
            max_concurrent_posts: 4,
            request_timeout: Duration::from_secs(120),
            max_tokens: 8192,
            log_format: LogFormat::Pretty,
        }
    }
}

impl fmt::Debug for BuffettConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuffettConfig")
            .field("bind_addr", &self.bind_addr)
            .field("api_key", &"<redacted>")
            .field("api_base", &self.api_base)
            .field("models", &self.models)
            .field("max_concurrent_posts", &self.max_concurrent_posts)
            .field("request_timeout", &self.request_timeout)
            .field("max_tokens", &self.max_tokens)
            .field("log_format", &self.log_format)
            .finish()
    }
}

impl BuffettConfig {
    /// Create a new configuration builder
    pub fn builder() -> BuffettConfigBuilder {
        BuffettConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(BuffettError::Config(
                "API key is required (set GOOGLE_API_KEY or --api-key)".to_string(),
            ));
        }

        if self.max_concurrent_posts == 0 {
            return Err(BuffettError::Config(
                "max_concurrent_posts must be greater than 0".to_string(),
            ));
        }

        if self.request_timeout.is_zero() {
            return Err(BuffettError::Config(
                "request_timeout must be greater than 0".to_string(),
            ));
        }

        if self.max_tokens == 0 {
            return Err(BuffettError::Config(
                "max_tokens must be greater than 0".to_string(),
            ));
        }

        let tiers = [
            ("low", &self.models.low),
            ("mid", &self.models.mid),
            ("high", &self.models.high),
        ];
        if let Some((tier, _)) = tiers.iter().find(|(_, model)| model.trim().is_empty()) {
            return Err(BuffettError::Config(format!(
                "model for tier '{tier}' must not be empty"
            )));
        }

        Ok(())
    }

    /// Provider configuration derived from this config
    pub fn gemini_config(&self) -> GeminiConfig {
        GeminiConfig::new(&self.api_key)
            .with_api_base(&self.api_base)
            .with_timeout(self.request_timeout.as_secs())
    }
}

/// Builder for BuffettConfig
#[derive(Debug, Default)]
pub struct BuffettConfigBuilder {
    bind_addr: Option<SocketAddr>,
    api_key: Option<String>,
    api_base: Option<String>,
    models: Option<ModelTiers>,
    max_concurrent_posts: Option<usize>,
    request_timeout: Option<Duration>,
    max_tokens: Option<usize>,
    log_format: Option<LogFormat>,
}

impl BuffettConfigBuilder {
    /// Set the listen address
    pub fn bind_addr(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = Some(addr);
        self
    }

    /// Set the API key
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the API base URL
    pub fn api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = Some(base.into());
        self
    }

    /// Set the model tiers
    pub fn models(mut self, models: ModelTiers) -> Self {
        self.models = Some(models);
        self
    }

    /// Set the per-request concurrency limit
    pub fn max_concurrent_posts(mut self, limit: usize) -> Self {
        self.max_concurrent_posts = Some(limit);
        self
    }

    /// Set the upstream request timeout
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Set max output tokens
    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set the log format
    pub fn log_format(mut self, format: LogFormat) -> Self {
        self.log_format = Some(format);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<BuffettConfig> {
        let defaults = BuffettConfig::default();

        let config = BuffettConfig {
            bind_addr: self.bind_addr.unwrap_or(defaults.bind_addr),
            api_key: self.api_key.unwrap_or(defaults.api_key),
            api_base: self.api_base.unwrap_or(defaults.api_base),
            models: self.models.unwrap_or(defaults.models),
            max_concurrent_posts: self
                .max_concurrent_posts
                .unwrap_or(defaults.max_concurrent_posts),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            max_tokens: self.max_tokens.unwrap_or(defaults.max_tokens),
            log_format: self.log_format.unwrap_or(defaults.log_format),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BuffettConfig::default();
        assert_eq!(config.bind_addr.port(), 5000);
        assert_eq!(config.max_concurrent_posts, 4);
        assert_eq!(config.request_timeout, Duration::from_secs(120));
        assert_eq!(config.models.high, DEFAULT_MODEL);
        // No credential by default
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_builder() {
        let config = BuffettConfig::builder()
            .api_key("test-key")
            .max_concurrent_posts(1)
            .request_timeout(Duration::from_secs(30))
            .log_format(LogFormat::Json)
            .build()
            .unwrap();

        assert_eq!(config.max_concurrent_posts, 1);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.api_base, DEFAULT_GEMINI_API_BASE);
    }

    #[test]
    fn test_validation_rejects_zero_limits() {
        let zero_posts = BuffettConfig::builder()
            .api_key("k")
            .max_concurrent_posts(0)
            .build();
        assert!(matches!(zero_posts, Err(BuffettError::Config(_))));

        let zero_timeout = BuffettConfig::builder()
            .api_key("k")
            .request_timeout(Duration::ZERO)
            .build();
        assert!(matches!(zero_timeout, Err(BuffettError::Config(_))));
    }

    #[test]
    fn test_validation_rejects_empty_model() {
        let result = BuffettConfig::builder()
            .api_key("k")
            .models(ModelTiers {
                mid: " ".to_string(),
                ..ModelTiers::default()
            })
            .build();

        assert!(matches!(result, Err(BuffettError::Config(msg)) if msg.contains("'mid'")));
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = BuffettConfig::builder()
            .api_key("super-secret")
            .build()
            .unwrap();

        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_gemini_config_carries_settings() {
        let config = BuffettConfig::builder()
            .api_key("k")
            .api_base("http://localhost:8080")
            .request_timeout(Duration::from_secs(15))
            .build()
            .unwrap();

        let gemini = config.gemini_config();
        assert_eq!(gemini.api_key, "k");
        assert_eq!(gemini.api_base, "http://localhost:8080");
        assert_eq!(gemini.timeout_secs, 15);
    }
}
