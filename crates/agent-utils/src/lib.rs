//! Shared utilities for agent-rs
//!
//! This crate provides common functionality used across the agent-rs workspace,
//! including logging setup and configuration management.

pub mod config;
pub mod error;
pub mod logging;

pub use config::{Config, LogFormat};
pub use error::UtilsError;
pub use logging::{init_tracing, init_tracing_with};
