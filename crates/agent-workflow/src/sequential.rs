//! Sequential composition of agents

use agent_core::{Agent, Context, Error, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Runs its steps one after another in a shared context
///
/// Each step receives the previous step's output as input; the first step
/// receives the original input. Every step also sees the events recorded by
/// the steps before it. The output of the last step is the output of the
/// whole sequence, and the first failing step aborts it.
///
/// # Example
///
/// ```no_run
/// use agent_workflow::SequentialAgent;
/// use std::sync::Arc;
///
/// # fn example(
/// #     first: Arc<dyn agent_core::Agent>,
/// #     second: Arc<dyn agent_core::Agent>,
/// # ) -> agent_core::Result<()> {
/// let pipeline = SequentialAgent::builder("pipeline")
///     .add_agent(first)
///     .add_agent(second)
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct SequentialAgent {
    name: String,
    description: String,
    steps: Vec<Arc<dyn Agent>>,
}

impl SequentialAgent {
    /// Create a new sequential agent builder
    pub fn builder(name: impl Into<String>) -> SequentialAgentBuilder {
        SequentialAgentBuilder::new(name)
    }

    /// Steps in execution order
    pub fn steps(&self) -> &[Arc<dyn Agent>] {
        &self.steps
    }
}

#[async_trait]
impl Agent for SequentialAgent {
    async fn process(&self, input: String, context: &mut Context) -> Result<String> {
        let mut current_output = input;

        for (index, step) in self.steps.iter().enumerate() {
            debug!(
                "{}: step {}/{} ({})",
                self.name,
                index + 1,
                self.steps.len(),
                step.name()
            );
            current_output = step.process(current_output, context).await?;
        }

        Ok(current_output)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Builder for constructing sequential agents
pub struct SequentialAgentBuilder {
    name: String,
    description: String,
    steps: Vec<Arc<dyn Agent>>,
}

impl SequentialAgentBuilder {
    /// Create a new builder
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            steps: Vec::new(),
        }
    }

    /// Set the description
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Append a step
    pub fn add_agent(mut self, agent: Arc<dyn Agent>) -> Self {
        self.steps.push(agent);
        self
    }

    /// Build the sequential agent
    ///
    /// # Errors
    ///
    /// Returns an error if no steps were added
    pub fn build(self) -> Result<SequentialAgent> {
        if self.steps.is_empty() {
            return Err(Error::InitializationFailed(format!(
                "Sequential agent '{}' has no steps",
                self.name
            )));
        }

        Ok(SequentialAgent {
            name: self.name,
            description: self.description,
            steps: self.steps,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_core::Event;
    use agent_llm::Role;
    use agent_runtime::LlmAgent;
    use agent_runtime::testing::ScriptedProvider;
    use tokio_test::assert_ok;

    /// Appends its name to the input and records it
    struct Suffix(&'static str);

    #[async_trait]
    impl Agent for Suffix {
        async fn process(&self, input: String, context: &mut Context) -> Result<String> {
            let output = format!("{input}+{}", self.0);
            let event = Event::agent(context.invocation_id(), self.0, output.clone());
            context.record(event);
            Ok(output)
        }

        fn name(&self) -> &str {
            self.0
        }
    }

    struct Failing;

    #[async_trait]
    impl Agent for Failing {
        async fn process(&self, _input: String, _context: &mut Context) -> Result<String> {
            Err(Error::ProcessingFailed("step failed".to_string()))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    #[test]
    fn test_builder_rejects_empty_sequence() {
        let result = SequentialAgent::builder("empty").build();
        assert!(matches!(result, Err(Error::InitializationFailed(_))));
    }

    #[tokio::test]
    async fn test_steps_run_in_order() {
        let agent = assert_ok!(
            SequentialAgent::builder("seq")
                .description("chain")
                .add_agent(Arc::new(Suffix("a")))
                .add_agent(Arc::new(Suffix("b")))
                .add_agent(Arc::new(Suffix("c")))
                .build()
        );
        assert_eq!(agent.steps().len(), 3);
        assert_eq!(agent.description(), "chain");

        let mut ctx = Context::new();
        let output = agent.process("x".to_string(), &mut ctx).await.unwrap();

        assert_eq!(output, "x+a+b+c");
        let authors: Vec<_> = ctx.history().iter().map(|e| e.author.as_str()).collect();
        assert_eq!(authors, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_failure_stops_sequence() {
        let agent = SequentialAgent::builder("seq")
            .add_agent(Arc::new(Suffix("a")))
            .add_agent(Arc::new(Failing))
            .add_agent(Arc::new(Suffix("c")))
            .build()
            .unwrap();

        let mut ctx = Context::new();
        let result = agent.process("x".to_string(), &mut ctx).await;

        assert!(matches!(result, Err(Error::ProcessingFailed(_))));
        assert_eq!(ctx.history().len(), 1);
    }

    #[tokio::test]
    async fn test_later_llm_step_sees_earlier_output() {
        let first = Arc::new(ScriptedProvider::constant("tickers: AAPL"));
        let second = Arc::new(ScriptedProvider::constant("report"));

        let agent = SequentialAgent::builder("seq")
            .add_agent(Arc::new(LlmAgent::new(first, Default::default(), "trigger")))
            .add_agent(Arc::new(LlmAgent::new(
                Arc::clone(&second) as _,
                Default::default(),
                "quant",
            )))
            .build()
            .unwrap();

        let mut ctx = Context::new();
        ctx.record(Event::user("inv", "post text"));
        let output = agent.process("post text".to_string(), &mut ctx).await.unwrap();
        assert_eq!(output, "report");

        let requests = second.requests();
        let messages = &requests[0].messages;
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, Role::User);
        assert!(messages[0].content.contains("[trigger] said: tickers: AAPL"));
    }
}
