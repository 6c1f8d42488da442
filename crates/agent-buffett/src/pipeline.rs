//! Assembly of the three-stage analysis pipeline
//!
//! ```text
//! main_pipeline_agent (sequential)
//! ├── trigger_handler_agent            high tier, web search
//! ├── main_researcher_agent (parallel)
//! │   ├── sec_researcher_agent         mid tier, web search
//! │   └── recentnews_researcher_agent  mid tier, web search
//! └── quant_researcher_agent           high tier, web search
//! ```

use agent_core::{Agent, Result};
use agent_llm::HostedTool;
use agent_runtime::AgentRuntime;
use agent_workflow::{ParallelAgent, SequentialAgent};
use std::sync::Arc;
use tracing::info;

use crate::config::ModelTiers;
use crate::prompts;

/// The composed root agent plus the identity its sessions are stored under
#[derive(Clone)]
pub struct Pipeline {
    pub root: Arc<dyn Agent>,
    pub app_name: String,
    pub user_id: String,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("root", &self.root.name())
            .field("app_name", &self.app_name)
            .field("user_id", &self.user_id)
            .finish()
    }
}

fn search_agent(
    runtime: &AgentRuntime,
    name: &str,
    description: &str,
    model: &str,
) -> Arc<dyn Agent> {
    let mut config = runtime.llm_agent_config();
    config.model = model.to_string();
    config.description = description.to_string();
    config.hosted_tools = vec![HostedTool::WebSearch];
    Arc::new(runtime.create_llm_agent(config, name))
}

/// Build the analysis pipeline on top of the runtime's provider
///
/// Pure assembly; no request is sent.
pub fn build_pipeline(runtime: &AgentRuntime, models: &ModelTiers) -> Result<Pipeline> {
    let trigger_handler = search_agent(
        runtime,
        prompts::TRIGGER_HANDLER_AGENT,
        prompts::TRIGGER_HANDLER_DESCRIPTION,
        &models.high,
    );

    let main_researcher = ParallelAgent::builder(prompts::MAIN_RESEARCHER_AGENT)
        .description(prompts::MAIN_RESEARCHER_DESCRIPTION)
        .add_agent(search_agent(
            runtime,
            prompts::SEC_RESEARCHER_AGENT,
            prompts::SEC_RESEARCHER_DESCRIPTION,
            &models.mid,
        ))
        .add_agent(search_agent(
            runtime,
            prompts::RECENT_NEWS_RESEARCHER_AGENT,
            prompts::RECENT_NEWS_RESEARCHER_DESCRIPTION,
            &models.mid,
        ))
        .build()?;

    let quant_researcher = search_agent(
        runtime,
        prompts::QUANT_RESEARCHER_AGENT,
        prompts::QUANT_RESEARCHER_DESCRIPTION,
        &models.high,
    );

    let root = SequentialAgent::builder(prompts::ROOT_AGENT)
        .description(prompts::ROOT_DESCRIPTION)
        .add_agent(trigger_handler)
        .add_agent(Arc::new(main_researcher))
        .add_agent(quant_researcher)
        .build()?;

    info!(
        "Pipeline built (high: {}, mid: {})",
        models.high, models.mid
    );

    Ok(Pipeline {
        root: Arc::new(root),
        app_name: prompts::APP_NAME.to_string(),
        user_id: prompts::USER_ID.to_string(),
    })
}
