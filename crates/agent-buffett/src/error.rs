//! Error types for post analysis

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::recommendation::ReportError;

/// Errors raised while configuring or running the analysis service
#[derive(Debug, Error)]
pub enum BuffettError {
    /// Invalid or missing configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// The agent pipeline failed
    #[error("Agent error: {0}")]
    Agent(#[from] agent_core::Error),

    /// The upstream model could not be reached or configured
    #[error("LLM error: {0}")]
    Llm(#[from] agent_llm::LLMError),

    /// Socket or filesystem failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The quant report did not pass validation
    #[error("Report error: {0}")]
    Report(#[from] ReportError),
}

/// Result type alias for analysis operations
pub type Result<T> = std::result::Result<T, BuffettError>;

impl BuffettError {
    /// HTTP status this error maps to
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Agent(_) | Self::Llm(_) => StatusCode::BAD_GATEWAY,
            Self::Report(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Config(_) | Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for BuffettError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
