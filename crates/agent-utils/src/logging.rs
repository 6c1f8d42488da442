//! Logging and tracing utilities

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Config, LogFormat};
use crate::error::UtilsError;

/// Initialize tracing subscriber with default configuration
pub fn init_tracing() -> Result<(), UtilsError> {
    init_tracing_with(&Config::default())
}

/// Initialize tracing subscriber from a [`Config`]
///
/// `RUST_LOG` takes precedence over `config.default_filter`.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed
pub fn init_tracing_with(config: &Config) -> Result<(), UtilsError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_filter));
    let registry = tracing_subscriber::registry().with(filter);

    match config.log_format {
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).try_init()?,
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
            .try_init()?,
    }

    Ok(())
}
