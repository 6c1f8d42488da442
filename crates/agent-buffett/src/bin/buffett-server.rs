//! HTTP server for post analysis
//!
//! # Usage
//!
//! ```bash
//! # Credentials and overrides can also live in a .env file
//! export GOOGLE_API_KEY="..."
//!
//! cargo run --bin buffett-server -p agent-buffett -- --bind 127.0.0.1:5000
//! ```

use agent_buffett::{AppState, BuffettConfig, BuffettInference, ModelTiers, router, serve};
use agent_llm::providers::GeminiProvider;
use agent_runtime::AgentRuntime;
use agent_utils::LogFormat;
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;

#[derive(Parser)]
#[command(name = "buffett-server")]
#[command(about = "Analyze the market impact of social-media posts", long_about = None)]
struct Args {
    /// Address to listen on
    #[arg(long, env = "BUFFETT_BIND_ADDR", default_value = "0.0.0.0:5000")]
    bind: SocketAddr,

    /// Generative Language API key
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    api_key: String,

    /// Generative Language API base URL
    #[arg(long, env = "GEMINI_API_BASE")]
    api_base: Option<String>,

    /// Model for the low tier
    #[arg(long, env = "BUFFETT_MODEL_LOW", default_value = agent_buffett::config::DEFAULT_MODEL)]
    model_low: String,

    /// Model for the researcher stages
    #[arg(long, env = "BUFFETT_MODEL_MID", default_value = agent_buffett::config::DEFAULT_MODEL)]
    model_mid: String,

    /// Model for the trigger and quant stages
    #[arg(long, env = "BUFFETT_MODEL_HIGH", default_value = agent_buffett::config::DEFAULT_MODEL)]
    model_high: String,

    /// Posts of one request analyzed at the same time
    #[arg(long, env = "BUFFETT_MAX_CONCURRENT_POSTS", default_value_t = 4)]
    max_concurrent_posts: usize,

    /// Timeout of a single upstream request, in seconds
    #[arg(long, env = "BUFFETT_REQUEST_TIMEOUT_SECS", default_value_t = 120)]
    request_timeout_secs: u64,

    /// Max output tokens per completion
    #[arg(long, env = "BUFFETT_MAX_TOKENS", default_value_t = 8192)]
    max_tokens: usize,

    /// Log format: pretty or json
    #[arg(long, env = "LOG_FORMAT", default_value = "pretty")]
    log_format: LogFormat,
}

impl Args {
    fn into_config(self) -> agent_buffett::Result<BuffettConfig> {
        let mut builder = BuffettConfig::builder()
            .bind_addr(self.bind)
            .api_key(self.api_key)
            .models(ModelTiers {
                low: self.model_low,
                mid: self.model_mid,
                high: self.model_high,
            })
            .max_concurrent_posts(self.max_concurrent_posts)
            .request_timeout(Duration::from_secs(self.request_timeout_secs))
            .max_tokens(self.max_tokens)
            .log_format(self.log_format);
        if let Some(api_base) = self.api_base {
            builder = builder.api_base(api_base);
        }
        builder.build()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Args::parse().into_config()?;

    agent_utils::init_tracing_with(
        &agent_utils::Config::new("buffett-server")
            .with_log_format(config.log_format)
            .with_default_filter("info,tower_http=info"),
    )?;
    info!("Starting buffett-server with {:?}", config);

    let provider = GeminiProvider::with_config(config.gemini_config())?;
    let runtime = AgentRuntime::builder()
        .provider(Arc::new(provider))
        .default_model(&config.models.high)
        .default_max_tokens(config.max_tokens)
        .build()?;

    let inference = BuffettInference::from_runtime(&runtime, &config.models)?;
    let app = router(AppState::new(
        Arc::new(inference),
        config.max_concurrent_posts,
    ));

    let listener = TcpListener::bind(config.bind_addr).await?;
    serve(listener, app).await?;

    Ok(())
}
