//! Parallel fan-out of agents

use agent_core::{Agent, Context, Error, Result};
use async_trait::async_trait;
use futures::future::join_all;
use std::sync::Arc;
use tracing::{Instrument, debug, debug_span};

/// Runs every branch concurrently on the same input
///
/// Each branch works on a fork of the caller's context: it sees everything
/// recorded before the fan-out but not what its siblings record. Once all
/// branches finish, their events are joined back into the caller's context
/// in declaration order, so later agents see every branch's contribution.
///
/// The output is the non-empty branch outputs joined by blank lines, in
/// declaration order. Every branch is allowed to settle; if any failed, the
/// error of the first failing branch in declaration order is returned and
/// nothing is joined.
///
/// # Example
///
/// ```no_run
/// use agent_workflow::ParallelAgent;
/// use std::sync::Arc;
///
/// # fn example(
/// #     filings: Arc<dyn agent_core::Agent>,
/// #     news: Arc<dyn agent_core::Agent>,
/// # ) -> agent_core::Result<()> {
/// let research = ParallelAgent::builder("research")
///     .add_agent(filings)
///     .add_agent(news)
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ParallelAgent {
    name: String,
    description: String,
    branches: Vec<Arc<dyn Agent>>,
}

impl ParallelAgent {
    /// Create a new parallel agent builder
    pub fn builder(name: impl Into<String>) -> ParallelAgentBuilder {
        ParallelAgentBuilder::new(name)
    }

    /// Branches in declaration order
    pub fn branches(&self) -> &[Arc<dyn Agent>] {
        &self.branches
    }
}

#[async_trait]
impl Agent for ParallelAgent {
    async fn process(&self, input: String, context: &mut Context) -> Result<String> {
        debug!("{}: fanning out to {} branches", self.name, self.branches.len());

        let runs = self.branches.iter().map(|branch| {
            let mut child = context.fork(&format!("{}.{}", self.name, branch.name()));
            let input = input.clone();
            let span = debug_span!("branch", agent = branch.name());
            async move {
                let output = branch.process(input, &mut child).await?;
                Ok::<_, Error>((child, output))
            }
            .instrument(span)
        });
        let results = join_all(runs).await.into_iter().collect::<Result<Vec<_>>>()?;

        let mut outputs = Vec::with_capacity(results.len());
        for (child, output) in results {
            context.join(child);
            if !output.trim().is_empty() {
                outputs.push(output);
            }
        }

        Ok(outputs.join("\n\n"))
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Builder for constructing parallel agents
pub struct ParallelAgentBuilder {
    name: String,
    description: String,
    branches: Vec<Arc<dyn Agent>>,
}

impl ParallelAgentBuilder {
    /// Create a new builder
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            branches: Vec::new(),
        }
    }

    /// Set the description
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Add a branch
    pub fn add_agent(mut self, agent: Arc<dyn Agent>) -> Self {
        self.branches.push(agent);
        self
    }

    /// Build the parallel agent
    ///
    /// # Errors
    ///
    /// Returns an error if no branches were added
    pub fn build(self) -> Result<ParallelAgent> {
        if self.branches.is_empty() {
            return Err(Error::InitializationFailed(format!(
                "Parallel agent '{}' has no branches",
                self.name
            )));
        }

        Ok(ParallelAgent {
            name: self.name,
            description: self.description,
            branches: self.branches,
        })
    }
}
