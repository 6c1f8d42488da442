//! Runtime for building agents with dependency injection
//!
//! The AgentRuntime owns the shared LLM provider and the defaults applied to
//! every agent it creates.

use agent_core::Result;
use agent_llm::LLMProvider;
use std::sync::Arc;

use crate::agents::{LlmAgent, LlmAgentConfig};

/// Configuration for the agent runtime
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Default model to use
    pub default_model: String,

    /// Default max tokens per completion
    pub default_max_tokens: usize,

    /// Default sampling temperature (provider default when `None`)
    pub default_temperature: Option<f32>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            default_model: "gemini-2.0-flash".to_string(),
            default_max_tokens: 8192,
            default_temperature: None,
        }
    }
}

/// Runtime for building agents with dependency injection
///
/// # Example
///
/// ```no_run
/// use agent_runtime::AgentRuntime;
/// use std::sync::Arc;
///
/// # fn example(provider: Arc<dyn agent_llm::LLMProvider>) -> agent_core::Result<()> {
/// let runtime = AgentRuntime::builder()
///     .provider(provider)
///     .default_model("gemini-2.0-flash")
///     .build()?;
///
/// let mut config = runtime.llm_agent_config();
/// config.description = "You summarize posts.".to_string();
/// let agent = runtime.create_llm_agent(config, "summarizer");
/// # Ok(())
/// # }
/// ```
pub struct AgentRuntime {
    provider: Arc<dyn LLMProvider>,
    config: RuntimeConfig,
}

impl AgentRuntime {
    /// Create a new agent runtime
    pub fn new(provider: Arc<dyn LLMProvider>, config: RuntimeConfig) -> Self {
        Self { provider, config }
    }

    /// Create a new runtime builder
    pub fn builder() -> AgentRuntimeBuilder {
        AgentRuntimeBuilder::new()
    }

    /// Get a reference to the LLM provider
    pub fn provider(&self) -> &Arc<dyn LLMProvider> {
        &self.provider
    }

    /// Get a reference to the runtime configuration
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Agent configuration seeded with the runtime defaults
    pub fn llm_agent_config(&self) -> LlmAgentConfig {
        LlmAgentConfig {
            model: self.config.default_model.clone(),
            max_tokens: self.config.default_max_tokens,
            temperature: self.config.default_temperature,
            ..LlmAgentConfig::default()
        }
    }

    /// Create an LLM agent sharing the runtime's provider
    ///
    /// # Arguments
    ///
    /// * `config` - Configuration for the agent
    /// * `name` - Name of the agent
    pub fn create_llm_agent(&self, config: LlmAgentConfig, name: impl Into<String>) -> LlmAgent {
        LlmAgent::new(Arc::clone(&self.provider), config, name)
    }
}

/// Builder for AgentRuntime
pub struct AgentRuntimeBuilder {
    provider: Option<Arc<dyn LLMProvider>>,
    config: RuntimeConfig,
}

impl AgentRuntimeBuilder {
    /// Create a new runtime builder
    pub fn new() -> Self {
        Self {
            provider: None,
            config: RuntimeConfig::default(),
        }
    }

    /// Set the LLM provider
    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set the runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the default model
    pub fn default_model(mut self, model: impl Into<String>) -> Self {
        self.config.default_model = model.into();
        self
    }

    /// Set the default max tokens
    pub fn default_max_tokens(mut self, max_tokens: usize) -> Self {
        self.config.default_max_tokens = max_tokens;
        self
    }

    /// Set the default temperature
    pub fn default_temperature(mut self, temperature: f32) -> Self {
        self.config.default_temperature = Some(temperature);
        self
    }

    /// Build the runtime
    ///
    /// # Errors
    ///
    /// Returns an error if the provider is not set
    pub fn build(self) -> Result<AgentRuntime> {
        let provider = self.provider.ok_or_else(|| {
            agent_core::Error::InitializationFailed("Provider not set".to_string())
        })?;

        Ok(AgentRuntime::new(provider, self.config))
    }
}

impl Default for AgentRuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
