//! Core Agent trait definition

use crate::{Context, Result};
use async_trait::async_trait;

/// Core trait that all agents must implement
///
/// Agents read the conversation so far from the [`Context`] and record their
/// own output back into it, so composite agents can chain and fan out
/// without knowing what their children do.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Process input and return output
    ///
    /// The returned text may be empty when the agent produced nothing.
    async fn process(&self, input: String, context: &mut Context) -> Result<String>;

    /// Get the agent's name
    fn name(&self) -> &str;

    /// Short description of what the agent does
    fn description(&self) -> &str {
        ""
    }
}
