//! Agent runtime for executing agents with dependency injection
//!
//! This crate provides the runtime infrastructure for executing agents:
//! the AgentRuntime factory, the LLM-backed agent, session storage and the
//! Runner that turns one user turn into a stream of events.

pub mod agents;
pub mod runner;
pub mod runtime;
pub mod session;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

// Re-export key types
pub use agents::{LlmAgent, LlmAgentConfig};
pub use runner::{EventStream, Runner};
pub use runtime::{AgentRuntime, AgentRuntimeBuilder, RuntimeConfig};
pub use session::{InMemorySessionService, Session, SessionKey, SessionService};
