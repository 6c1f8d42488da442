//! Core abstractions for agent-rs
//!
//! This crate defines the fundamental traits and types used throughout the
//! workspace: the `Agent` trait, the invocation `Context`, conversation
//! `Event`s and the core error type.

pub mod agent;
pub mod context;
pub mod error;
pub mod event;

pub use agent::Agent;
pub use context::{Context, EventSink};
pub use error::{Error, Result};
pub use event::{Event, USER_AUTHOR};
