//! Multi-agent orchestration for agent-rs
//!
//! Composite agents that coordinate other agents while sharing one
//! invocation context:
//!
//! - [`SequentialAgent`] runs its steps in order, feeding each step the
//!   previous output.
//! - [`ParallelAgent`] fans the same input out to every branch
//!   concurrently and joins their events back in declaration order.

pub mod parallel;
pub mod sequential;

// Re-export for convenience
pub use parallel::{ParallelAgent, ParallelAgentBuilder};
pub use sequential::{SequentialAgent, SequentialAgentBuilder};
