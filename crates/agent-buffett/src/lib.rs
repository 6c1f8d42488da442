//! Market-impact analysis of social-media posts
//!
//! A post (author handle plus text) is run through a three-stage agent
//! pipeline backed by Gemini with hosted web search:
//!
//! 1. `trigger_handler_agent` identifies the securities the post plausibly
//!    affects.
//! 2. `main_researcher_agent` fans out to a filings researcher and a
//!    recent-news researcher running concurrently.
//! 3. `quant_researcher_agent` condenses everything into a JSON report with
//!    per-ticker rating splits.
//!
//! The service exposes the pipeline over HTTP (`POST /analyze`,
//! `GET /health`); see the `buffett-server` binary.
//!
//! # Example
//!
//! ```rust,ignore
//! use agent_buffett::{BuffettInference, ModelTiers, Post};
//! use agent_llm::providers::GeminiProvider;
//! use agent_runtime::AgentRuntime;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let provider = GeminiProvider::new(std::env::var("GOOGLE_API_KEY")?)?;
//!     let runtime = AgentRuntime::builder().provider(Arc::new(provider)).build()?;
//!
//!     let inference = BuffettInference::from_runtime(&runtime, &ModelTiers::default())?;
//!     let post = Post::new("Donald Trump", "Tariff revenue is at a record high");
//!     if let Some(report) = inference.call_agent(&post).await? {
//!         println!("{report}");
//!     }
//!     Ok(())
//! }
//! ```

pub mod analysis;
pub mod config;
pub mod error;
pub mod inference;
pub mod pipeline;
pub mod post;
pub mod prompts;
pub mod recommendation;
pub mod server;

// Re-export main types for convenience
pub use analysis::{AnalysisOutput, AnalysisStatus, Instance, analyze_instances};
pub use config::{BuffettConfig, BuffettConfigBuilder, ModelTiers};
pub use error::{BuffettError, Result};
pub use inference::{BuffettInference, PostAnalyzer};
pub use pipeline::{Pipeline, build_pipeline};
pub use post::Post;
pub use recommendation::{QuantReport, RatingSplit, ReportError, Sentiment, TickerRecommendation};
pub use server::{AppState, router, serve};
