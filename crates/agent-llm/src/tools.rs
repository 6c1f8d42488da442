//! Hosted tools executed by the provider on the model's behalf
//!
//! Unlike client-side function calling, hosted tools never round-trip
//! through the agent: the provider runs them while generating and folds the
//! results into the completion.

use serde::{Deserialize, Serialize};

/// A tool the LLM provider runs server-side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostedTool {
    /// Web search grounding
    WebSearch,
}

impl HostedTool {
    /// Stable name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::WebSearch => "web_search",
        }
    }
}
