//! LLM agent implementation (one completion per invocation, hosted tools only)

use agent_core::{Agent, Context, Event, Result};
use agent_llm::{
    CompletionRequest, HostedTool, LLMProvider, Message, StopReason, merge_consecutive,
};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

/// Configuration for an LLM agent
#[derive(Debug, Clone)]
pub struct LlmAgentConfig {
    /// Model to use
    pub model: String,

    /// Description of the agent, also shown to the model
    pub description: String,

    /// Additional instruction appended to the system prompt
    pub instruction: String,

    /// Max tokens per completion
    pub max_tokens: usize,

    /// Temperature for sampling (provider default when `None`)
    pub temperature: Option<f32>,

    /// Hosted tools the provider may run for this agent
    pub hosted_tools: Vec<HostedTool>,
}

impl Default for LlmAgentConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.0-flash".to_string(),
            description: String::new(),
            instruction: String::new(),
            max_tokens: 8192,
            temperature: None,
            hosted_tools: Vec::new(),
        }
    }
}

/// An agent that answers with a single LLM completion
///
/// The agent replays the invocation's conversation history to the model:
/// user turns as user messages, its own earlier output as assistant
/// messages, and output of other agents as attributed context. The
/// response is recorded back into the context as an event.
///
/// # Example
///
/// ```no_run
/// use agent_runtime::{LlmAgent, LlmAgentConfig};
/// use agent_core::{Agent, Context};
/// use agent_llm::HostedTool;
///
/// # async fn example(provider: std::sync::Arc<dyn agent_llm::LLMProvider>) -> agent_core::Result<()> {
/// let config = LlmAgentConfig {
///     description: "You research recent market news.".to_string(),
///     hosted_tools: vec![HostedTool::WebSearch],
///     ..LlmAgentConfig::default()
/// };
///
/// let agent = LlmAgent::new(provider, config, "news_researcher");
/// let mut context = Context::new();
/// let response = agent.process("Tariffs are up".to_string(), &mut context).await?;
/// # Ok(())
/// # }
/// ```
pub struct LlmAgent {
    provider: Arc<dyn LLMProvider>,
    config: LlmAgentConfig,
    name: String,
}

impl LlmAgent {
    /// Create a new LLM agent
    ///
    /// # Arguments
    ///
    /// * `provider` - The LLM provider to use
    /// * `config` - Configuration for the agent
    /// * `name` - Name of the agent
    pub fn new(
        provider: Arc<dyn LLMProvider>,
        config: LlmAgentConfig,
        name: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            config,
            name: name.into(),
        }
    }

    /// Get the agent's configuration
    pub fn config(&self) -> &LlmAgentConfig {
        &self.config
    }

    /// System prompt sent with every completion
    pub fn system_prompt(&self) -> String {
        let mut prompt = format!(
            "You are an agent. Your internal name is \"{}\".",
            self.name
        );
        if !self.config.description.is_empty() {
            prompt.push_str(&format!(
                "\n\nThe description about you is \"{}\"",
                self.config.description.trim()
            ));
        }
        if !self.config.instruction.is_empty() {
            prompt.push_str("\n\n");
            prompt.push_str(self.config.instruction.trim());
        }
        prompt
    }

    /// Build the conversation sent to the model
    ///
    /// Falls back to `input` as a single user turn when the context carries
    /// no history.
    pub fn build_messages(&self, input: &str, context: &Context) -> Vec<Message> {
        let messages: Vec<Message> = context
            .history()
            .iter()
            .filter_map(|event| {
                let text = event.text.as_deref().filter(|t| !t.is_empty())?;
                Some(if event.is_user() {
                    Message::user(text)
                } else if event.author == self.name {
                    Message::assistant(text)
                } else {
                    Message::user(format!("For context:\n[{}] said: {text}", event.author))
                })
            })
            .collect();

        if messages.is_empty() {
            return vec![Message::user(input)];
        }
        merge_consecutive(messages)
    }
}

#[async_trait]
impl Agent for LlmAgent {
    async fn process(&self, input: String, context: &mut Context) -> Result<String> {
        let mut builder = CompletionRequest::builder(&self.config.model)
            .messages(self.build_messages(&input, context))
            .system(self.system_prompt())
            .max_tokens(self.config.max_tokens)
            .hosted_tools(self.config.hosted_tools.clone());
        if let Some(temperature) = self.config.temperature {
            builder = builder.temperature(temperature);
        }

        debug!("Agent {} calling {}", self.name, self.provider.name());
        let response = self.provider.complete(builder.build()).await?;

        match response.stop_reason {
            StopReason::MaxTokens => warn!("Agent {} hit the token limit", self.name),
            StopReason::Blocked => warn!("Agent {} response was blocked", self.name),
            StopReason::EndTurn | StopReason::StopSequence => {}
        }
        debug!(
            "Agent {} done - tokens: {}, sources: {}",
            self.name,
            response.usage.total(),
            response.sources.len()
        );

        let text = response.message.content;
        let event = Event::agent(context.invocation_id(), &self.name, text.clone());
        context.record(event);

        Ok(text)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.config.description
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedProvider;
    use agent_llm::Role;

    fn agent_with(provider: Arc<ScriptedProvider>, name: &str) -> LlmAgent {
        let config = LlmAgentConfig {
            description: "You research things.".to_string(),
            hosted_tools: vec![HostedTool::WebSearch],
            ..LlmAgentConfig::default()
        };
        LlmAgent::new(provider, config, name)
    }

    #[test]
    fn test_llm_config_default() {
        let config = LlmAgentConfig::default();
        assert_eq!(config.model, "gemini-2.0-flash");
        assert_eq!(config.max_tokens, 8192);
        assert!(config.temperature.is_none());
        assert!(config.hosted_tools.is_empty());
    }

    #[test]
    fn test_system_prompt_contains_identity() {
        let provider = Arc::new(ScriptedProvider::constant("ok"));
        let agent = agent_with(provider, "researcher");

        let prompt = agent.system_prompt();
        assert!(prompt.contains("\"researcher\""));
        assert!(prompt.contains("You research things."));
    }

    #[test]
    fn test_build_messages_without_history_uses_input() {
        let provider = Arc::new(ScriptedProvider::constant("ok"));
        let agent = agent_with(provider, "researcher");

        let messages = agent.build_messages("hello", &Context::new());
        assert_eq!(messages, vec![Message::user("hello")]);
    }

    #[test]
    fn test_build_messages_attributes_other_agents() {
        let provider = Arc::new(ScriptedProvider::constant("ok"));
        let agent = agent_with(provider, "quant");

        let mut ctx = Context::new();
        ctx.record(Event::user("inv", "Trump - tariffs"));
        ctx.record(Event::agent("inv", "trigger", "AAPL, F"));
        ctx.record(Event::agent("inv", "quant", "earlier answer"));

        let messages = agent.build_messages("ignored", &ctx);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::User);
        assert!(messages[0].content.starts_with("Trump - tariffs"));
        assert!(messages[0].content.contains("[trigger] said: AAPL, F"));
        assert_eq!(messages[1], Message::assistant("earlier answer"));
    }

    #[tokio::test]
    async fn test_process_records_event() {
        let provider = Arc::new(ScriptedProvider::constant("AAPL looks affected"));
        let agent = agent_with(Arc::clone(&provider), "trigger");

        let mut ctx = Context::new().with_invocation_id("inv-9");
        ctx.record(Event::user("inv-9", "post"));

        let output = agent.process("post".to_string(), &mut ctx).await.unwrap();
        assert_eq!(output, "AAPL looks affected");

        let last = ctx.history().last().unwrap();
        assert_eq!(last.author, "trigger");
        assert_eq!(last.invocation_id, "inv-9");
        assert!(!last.turn_complete);

        let requests = provider.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].hosted_tools, vec![HostedTool::WebSearch]);
        assert!(requests[0].system.as_deref().unwrap().contains("trigger"));
    }

    #[tokio::test]
    async fn test_process_propagates_provider_error() {
        let provider = Arc::new(ScriptedProvider::failing("upstream down"));
        let agent = agent_with(provider, "trigger");

        let mut ctx = Context::new();
        let result = agent.process("post".to_string(), &mut ctx).await;

        assert!(matches!(result, Err(agent_core::Error::ProcessingFailed(_))));
        assert!(ctx.history().is_empty());
    }
}
