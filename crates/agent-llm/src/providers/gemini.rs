//! Google Gemini provider implementation
//!
//! This module implements the LLMProvider trait for the Generative Language
//! API (`models/{model}:generateContent`), including the hosted Google Search
//! grounding tool.
//! See: https://ai.google.dev/api/generate-content
//!
//! # Example
//!
//! ```rust,ignore
//! use agent_llm::{CompletionRequest, HostedTool, LLMProvider, Message};
//! use agent_llm::providers::{GeminiConfig, GeminiProvider};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = GeminiProvider::with_config(GeminiConfig::from_env()?)?;
//!
//!     let request = CompletionRequest::builder("gemini-2.0-flash")
//!         .add_message(Message::user("Which stocks does a steel tariff affect?"))
//!         .hosted_tools(vec![HostedTool::WebSearch])
//!         .build();
//!
//!     let response = provider.complete(request).await?;
//!     println!("{}", response.message.content);
//!     Ok(())
//! }
//! ```

use crate::{
    CompletionRequest, CompletionResponse, HostedTool, LLMError, LLMProvider, Message, Result,
    Role, StopReason, TokenUsage,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{debug, instrument};

pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Configuration for the Gemini provider
#[derive(Clone)]
pub struct GeminiConfig {
    /// API key sent in the `x-goog-api-key` header
    pub api_key: String,

    /// Base URL of the API (default: "https://generativelanguage.googleapis.com/v1beta")
    pub api_base: String,

    /// Request timeout in seconds (default: 120)
    pub timeout_secs: u64,
}

impl GeminiConfig {
    /// Create a new config with the given API key and default settings
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base: DEFAULT_GEMINI_API_BASE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Create config from environment variables
    ///
    /// Reads the API key from `GOOGLE_API_KEY` and optionally the base URL
    /// from `GEMINI_API_BASE`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GOOGLE_API_KEY").map_err(|_| {
            LLMError::ConfigurationError("GOOGLE_API_KEY environment variable not set".to_string())
        })?;

        let api_base = std::env::var("GEMINI_API_BASE")
            .unwrap_or_else(|_| DEFAULT_GEMINI_API_BASE.to_string());

        Ok(Self {
            api_key,
            api_base,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        })
    }

    /// Set custom API base URL
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Set request timeout in seconds
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"<redacted>")
            .field("api_base", &self.api_base)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Gemini provider
///
/// Supports Gemini models including:
/// - gemini-2.0-flash
/// - gemini-2.5-flash
/// - gemini-2.5-pro
pub struct GeminiProvider {
    client: Client,
    config: GeminiConfig,
}

impl GeminiProvider {
    /// Create a new Gemini provider with default settings
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(GeminiConfig::new(api_key))
    }

    /// Create a provider with custom configuration
    pub fn with_config(config: GeminiConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(LLMError::ConfigurationError(
                "Gemini API key must not be empty".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    /// Get the provider configuration
    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/models/{model}:generateContent",
            self.config.api_base.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl LLMProvider for GeminiProvider {
    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        debug!(
            "Sending request to Gemini API ({} message(s), {} hosted tool(s))",
            request.messages.len(),
            request.hosted_tools.len()
        );

        let model = request.model.clone();
        let gemini_request = GeminiRequest::from(request);

        let response = self
            .client
            .post(self.endpoint(&model))
            .header("x-goog-api-key", &self.config.api_key)
            .json(&gemini_request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;

            return Err(match status.as_u16() {
                401 | 403 => LLMError::AuthenticationFailed,
                429 => LLMError::RateLimitExceeded(error_text),
                400 => LLMError::InvalidRequest(error_text),
                404 => LLMError::ModelNotFound(model),
                _ => LLMError::RequestFailed(format!("HTTP {status}: {error_text}")),
            });
        }

        let gemini_response: GeminiResponse = response.json().await.map_err(|e| {
            LLMError::UnexpectedResponse(format!("Failed to parse response: {e}"))
        })?;

        let completion = gemini_response.into_completion();
        debug!(
            "Received response - stop_reason: {:?}, tokens: {}/{}, sources: {}",
            completion.stop_reason,
            completion.usage.input_tokens,
            completion.usage.output_tokens,
            completion.sources.len()
        );

        Ok(completion)
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}

// Gemini-specific request/response types
// These match the Generative Language REST format

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<GeminiTool>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiTool {
    #[serde(skip_serializing_if = "Option::is_none")]
    google_search: Option<serde_json::Map<String, serde_json::Value>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop_sequences: Option<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    /// Set on reasoning parts of thinking models
    #[serde(default, skip_serializing)]
    thought: Option<bool>,
}

impl GeminiContent {
    fn text(role: Option<&str>, text: String) -> Self {
        Self {
            role: role.map(str::to_string),
            parts: vec![GeminiPart {
                text: Some(text),
                thought: None,
            }],
        }
    }
}

impl From<CompletionRequest> for GeminiRequest {
    fn from(request: CompletionRequest) -> Self {
        let contents = request
            .messages
            .into_iter()
            .map(|message: Message| {
                let role = match message.role {
                    Role::User => "user",
                    Role::Assistant => "model",
                };
                GeminiContent::text(Some(role), message.content)
            })
            .collect();

        let tools = request
            .hosted_tools
            .iter()
            .map(|tool| match tool {
                HostedTool::WebSearch => GeminiTool {
                    google_search: Some(serde_json::Map::new()),
                },
            })
            .collect();

        Self {
            contents,
            system_instruction: request.system.map(|s| GeminiContent::text(None, s)),
            tools,
            generation_config: GenerationConfig {
                max_output_tokens: request.max_tokens,
                temperature: request.temperature,
                stop_sequences: request.stop_sequences,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<GeminiContent>,
    #[serde(default)]
    finish_reason: Option<String>,
    #[serde(default)]
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: usize,
    #[serde(default)]
    candidates_token_count: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Deserialize)]
struct GroundingChunk {
    #[serde(default)]
    web: Option<WebSource>,
}

#[derive(Debug, Deserialize)]
struct WebSource {
    #[serde(default)]
    uri: Option<String>,
}

impl GeminiResponse {
    fn into_completion(self) -> CompletionResponse {
        let usage = self
            .usage_metadata
            .map(|u| TokenUsage {
                input_tokens: u.prompt_token_count,
                output_tokens: u.candidates_token_count,
            })
            .unwrap_or_default();

        let prompt_blocked = self
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .is_some();

        let Some(candidate) = self.candidates.into_iter().next() else {
            let stop_reason = if prompt_blocked {
                StopReason::Blocked
            } else {
                StopReason::EndTurn
            };
            return CompletionResponse {
                message: Message::assistant(""),
                stop_reason,
                usage,
                sources: Vec::new(),
            };
        };

        // Search grounding may split the answer across several parts
        let text: String = candidate
            .content
            .map(|c| c.parts)
            .unwrap_or_default()
            .into_iter()
            .filter(|p| !p.thought.unwrap_or(false))
            .filter_map(|p| p.text)
            .collect();

        let sources = candidate
            .grounding_metadata
            .map(|m| m.grounding_chunks)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|chunk| chunk.web.and_then(|w| w.uri))
            .collect();

        let stop_reason = match candidate.finish_reason.as_deref() {
            None | Some("STOP" | "FINISH_REASON_UNSPECIFIED") => StopReason::EndTurn,
            Some("MAX_TOKENS") => StopReason::MaxTokens,
            Some("SAFETY" | "RECITATION" | "BLOCKLIST" | "PROHIBITED_CONTENT" | "SPII") => {
                StopReason::Blocked
            }
            Some(other) => {
                debug!("Unknown finish reason: {}", other);
                StopReason::EndTurn
            }
        };

        CompletionResponse {
            message: Message::assistant(text),
            stop_reason,
            usage,
            sources,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_provider_creation() {
        let provider = GeminiProvider::new("test-key");
        assert!(provider.is_ok());
        assert_eq!(provider.unwrap().name(), "gemini");
    }

    #[test]
    fn test_empty_key_rejected() {
        let result = GeminiProvider::new("  ");
        assert!(matches!(result, Err(LLMError::ConfigurationError(_))));
    }

    #[test]
    fn test_endpoint() {
        let provider = GeminiProvider::with_config(
            GeminiConfig::new("k").with_api_base("http://localhost:8080/v1beta/"),
        )
        .unwrap();
        assert_eq!(
            provider.endpoint("gemini-2.0-flash"),
            "http://localhost:8080/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }

    #[test]
    fn test_config_debug_redacts_key() {
        let config = GeminiConfig::new("super-secret");
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_request_conversion() {
        let request = CompletionRequest::builder("gemini-2.0-flash")
            .system("You are a researcher")
            .add_message(Message::user("hello"))
            .add_message(Message::assistant("hi"))
            .max_tokens(512)
            .temperature(0.2)
            .hosted_tools(vec![HostedTool::WebSearch])
            .build();

        let value = serde_json::to_value(GeminiRequest::from(request)).unwrap();

        assert_eq!(
            value["contents"],
            json!([
                {"role": "user", "parts": [{"text": "hello"}]},
                {"role": "model", "parts": [{"text": "hi"}]},
            ])
        );
        assert_eq!(
            value["systemInstruction"],
            json!({"parts": [{"text": "You are a researcher"}]})
        );
        assert_eq!(value["tools"], json!([{"googleSearch": {}}]));
        assert_eq!(value["generationConfig"]["maxOutputTokens"], 512);
        assert!(value["generationConfig"].get("stopSequences").is_none());
    }

    #[test]
    fn test_request_without_tools_omits_field() {
        let request = CompletionRequest::builder("m")
            .add_message(Message::user("x"))
            .build();
        let value = serde_json::to_value(GeminiRequest::from(request)).unwrap();
        assert!(value.get("tools").is_none());
        assert!(value.get("systemInstruction").is_none());
    }

    #[test]
    fn test_response_conversion() {
        let raw = json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [{"text": "AAPL and "}, {"text": "MSFT"}]
                },
                "finishReason": "STOP",
                "groundingMetadata": {
                    "groundingChunks": [
                        {"web": {"uri": "https://example.com/a", "title": "A"}},
                        {"web": {"title": "no uri"}}
                    ]
                }
            }],
            "usageMetadata": {
                "promptTokenCount": 12,
                "candidatesTokenCount": 5,
                "totalTokenCount": 17
            }
        });

        let response: GeminiResponse = serde_json::from_value(raw).unwrap();
        let completion = response.into_completion();

        assert_eq!(completion.message.role, Role::Assistant);
        assert_eq!(completion.message.content, "AAPL and MSFT");
        assert_eq!(completion.stop_reason, StopReason::EndTurn);
        assert_eq!(completion.usage.total(), 17);
        assert_eq!(completion.sources, vec!["https://example.com/a".to_string()]);
    }

    #[test]
    fn test_response_skips_thought_parts() {
        let raw = json!({
            "candidates": [{
                "content": {"parts": [
                    {"text": "thinking...", "thought": true},
                    {"text": "answer"}
                ]},
                "finishReason": "MAX_TOKENS"
            }]
        });

        let response: GeminiResponse = serde_json::from_value(raw).unwrap();
        let completion = response.into_completion();
        assert_eq!(completion.message.content, "answer");
        assert_eq!(completion.stop_reason, StopReason::MaxTokens);
    }

    #[test]
    fn test_blocked_prompt_yields_empty_message() {
        let raw = json!({
            "promptFeedback": {"blockReason": "SAFETY"}
        });

        let response: GeminiResponse = serde_json::from_value(raw).unwrap();
        let completion = response.into_completion();
        assert_eq!(completion.message.text(), None);
        assert_eq!(completion.stop_reason, StopReason::Blocked);
    }
}
