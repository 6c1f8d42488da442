//! Test doubles for code that drives an [`LLMProvider`]

use agent_llm::{
    CompletionRequest, CompletionResponse, LLMError, LLMProvider, Message, StopReason, TokenUsage,
};
use async_trait::async_trait;
use std::sync::Mutex;

type Handler = dyn Fn(&CompletionRequest) -> agent_llm::Result<String> + Send + Sync;

/// Provider that answers from a closure and records every request
pub struct ScriptedProvider {
    handler: Box<Handler>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedProvider {
    /// Answer every request through `handler`
    pub fn new(
        handler: impl Fn(&CompletionRequest) -> agent_llm::Result<String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            handler: Box::new(handler),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Answer every request with the same text
    pub fn constant(text: impl Into<String>) -> Self {
        let text = text.into();
        Self::new(move |_| Ok(text.clone()))
    }

    /// Fail every request
    pub fn failing(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::new(move |_| Err(LLMError::RequestFailed(message.clone())))
    }

    /// Requests received so far, in arrival order, including failed ones
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl LLMProvider for ScriptedProvider {
    async fn complete(&self, request: CompletionRequest) -> agent_llm::Result<CompletionResponse> {
        let result = (self.handler)(&request);
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }
        let text = result?;

        Ok(CompletionResponse {
            message: Message::assistant(text),
            stop_reason: StopReason::EndTurn,
            usage: TokenUsage::default(),
            sources: Vec::new(),
        })
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
