//! Inference sessions: one pipeline run per post

use agent_runtime::{AgentRuntime, InMemorySessionService, Runner, SessionService};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::config::ModelTiers;
use crate::error::Result;
use crate::pipeline::{Pipeline, build_pipeline};
use crate::post::Post;

/// Something that turns a post into the pipeline's final text
///
/// `Ok(None)` means the pipeline finished without a final response.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostAnalyzer: Send + Sync {
    async fn analyze(&self, post: Post) -> Result<Option<String>>;
}

/// Runs posts through the analysis pipeline
///
/// Every call gets a fresh session that is deleted afterwards, so
/// concurrent calls never see each other's turns.
pub struct BuffettInference {
    runner: Runner,
    user_id: String,
}

impl BuffettInference {
    /// Bind a pipeline to a session store
    pub fn new(pipeline: Pipeline, sessions: Arc<dyn SessionService>) -> Self {
        Self {
            runner: Runner::new(pipeline.app_name, pipeline.root, sessions),
            user_id: pipeline.user_id,
        }
    }

    /// Build the pipeline and bind it to an in-memory session store
    pub fn from_runtime(runtime: &AgentRuntime, models: &ModelTiers) -> Result<Self> {
        let pipeline = build_pipeline(runtime, models)?;
        Ok(Self::new(pipeline, Arc::new(InMemorySessionService::new())))
    }

    pub fn runner(&self) -> &Runner {
        &self.runner
    }

    /// Run one post and return the first final response, if any
    ///
    /// The session is removed when the call returns or its future is
    /// dropped, and dropping the future aborts the pipeline run.
    #[instrument(skip_all, fields(handle = %post.handle))]
    pub async fn call_agent(&self, post: &Post) -> Result<Option<String>> {
        let session = SessionGuard::create(&self.runner, &self.user_id)?;
        self.run_in_session(&session.session_id, post.format_query())
            .await
    }

    async fn run_in_session(&self, session_id: &str, query: String) -> Result<Option<String>> {
        let mut events = self.runner.run(&self.user_id, session_id, query)?;

        while let Some(event) = events.recv().await {
            let event = event?;
            debug!("Event from {} (branch: {:?})", event.author, event.branch);
            if event.is_final_response() {
                info!("Final response from {}", event.author);
                return Ok(event.text);
            }
        }

        info!("Pipeline finished without a final response");
        Ok(None)
    }
}

/// Deletes its session when dropped
struct SessionGuard {
    sessions: Arc<dyn SessionService>,
    app_name: String,
    user_id: String,
    session_id: String,
}

impl SessionGuard {
    fn create(runner: &Runner, user_id: &str) -> Result<Self> {
        let session = runner.sessions().create_session(runner.app_name(), user_id)?;
        Ok(Self {
            sessions: Arc::clone(runner.sessions()),
            app_name: runner.app_name().to_string(),
            user_id: user_id.to_string(),
            session_id: session.id().to_string(),
        })
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        if let Err(e) = self
            .sessions
            .delete_session(&self.app_name, &self.user_id, &self.session_id)
        {
            warn!("Failed to delete session {}: {}", self.session_id, e);
        }
    }
}

#[async_trait]
impl PostAnalyzer for BuffettInference {
    async fn analyze(&self, post: Post) -> Result<Option<String>> {
        self.call_agent(&post).await
    }
}
