//! Error types for agent-utils

use thiserror::Error;

#[derive(Error, Debug)]
pub enum UtilsError {
    /// Unknown log format name
    #[error("Unknown log format '{0}' (expected 'pretty' or 'json')")]
    InvalidLogFormat(String),

    /// A global subscriber was already installed
    #[error("Failed to initialize tracing: {0}")]
    TracingInit(#[from] tracing_subscriber::util::TryInitError),
}
