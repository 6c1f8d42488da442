//! Concrete agent implementations
//!
//! - LlmAgent: answers with one LLM completion, optionally grounded by hosted tools

pub mod llm;

pub use llm::{LlmAgent, LlmAgentConfig};
