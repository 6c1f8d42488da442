//! Invocation context for agents
//!
//! The `Context` struct carries everything an agent needs while it runs:
//! a key-value store for runtime configuration, the conversation history of
//! the current invocation, and an optional sink that streams recorded events
//! to the runner.

use crate::event::Event;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

/// Well-known context keys for common configuration
pub mod keys {
    /// Application name of the session
    pub const APP_NAME: &str = "app_name";
    /// User ID owning the session
    pub const USER_ID: &str = "user_id";
    /// Session ID for tracking
    pub const SESSION_ID: &str = "session_id";
}

/// Sender half used to stream events out of a running invocation
pub type EventSink = UnboundedSender<Event>;

/// Context passed to agents during execution
///
/// # Example
///
/// ```
/// use agent_core::{Context, Event};
///
/// let mut ctx = Context::new()
///     .with_invocation_id("inv-1")
///     .with_session_id("session-123");
///
/// ctx.record(Event::user("inv-1", "hello"));
///
/// assert_eq!(ctx.session_id(), Some("session-123"));
/// assert_eq!(ctx.history().len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Key-value storage for context data
    data: HashMap<String, serde_json::Value>,
    /// Conversation history visible to this context
    history: Vec<Event>,
    invocation_id: String,
    branch: Option<String>,
    /// History length at the moment this context was forked
    fork_point: usize,
    sink: Option<EventSink>,
}

impl Context {
    /// Create a new empty context
    pub fn new() -> Self {
        Self::default()
    }

    // =========== Builder Methods ===========

    /// Set the invocation ID
    pub fn with_invocation_id(mut self, invocation_id: impl Into<String>) -> Self {
        self.invocation_id = invocation_id.into();
        self
    }

    /// Seed the conversation history (e.g. from a stored session)
    pub fn with_history(mut self, history: Vec<Event>) -> Self {
        self.history = history;
        self
    }

    /// Stream every recorded event into `sink`
    pub fn with_event_sink(mut self, sink: EventSink) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Set the application name
    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.insert(keys::APP_NAME, serde_json::json!(app_name.into()));
        self
    }

    /// Set the session ID
    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.insert(keys::SESSION_ID, serde_json::json!(session_id.into()));
        self
    }

    /// Set the user ID
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.insert(keys::USER_ID, serde_json::json!(user_id.into()));
        self
    }

    // =========== Common Accessors ===========

    /// Get the invocation ID
    pub fn invocation_id(&self) -> &str {
        &self.invocation_id
    }

    /// Get the branch path of this context
    pub fn branch(&self) -> Option<&str> {
        self.branch.as_deref()
    }

    /// Get the application name
    pub fn app_name(&self) -> Option<&str> {
        self.get(keys::APP_NAME).and_then(|v| v.as_str())
    }

    /// Get the session ID
    pub fn session_id(&self) -> Option<&str> {
        self.get(keys::SESSION_ID).and_then(|v| v.as_str())
    }

    /// Get the user ID
    pub fn user_id(&self) -> Option<&str> {
        self.get(keys::USER_ID).and_then(|v| v.as_str())
    }

    // =========== Conversation History ===========

    /// Events visible to this context, oldest first
    pub fn history(&self) -> &[Event] {
        &self.history
    }

    /// Record an event: append it to the history and stream it to the sink
    ///
    /// The event is tagged with this context's branch.
    pub fn record(&mut self, event: Event) {
        let event = event.with_branch(self.branch.clone());
        if let Some(sink) = &self.sink {
            if sink.send(event.clone()).is_err() {
                debug!("Event receiver dropped, event {} not streamed", event.id);
            }
        }
        self.history.push(event);
    }

    /// Create an isolated child context for a parallel branch
    ///
    /// The child sees the history recorded so far, but events it records are
    /// not visible to siblings. Use [`Context::join`] to merge them back.
    pub fn fork(&self, branch: &str) -> Self {
        let branch = match &self.branch {
            Some(parent) => format!("{parent}.{branch}"),
            None => branch.to_string(),
        };
        Self {
            data: self.data.clone(),
            history: self.history.clone(),
            invocation_id: self.invocation_id.clone(),
            branch: Some(branch),
            fork_point: self.history.len(),
            sink: self.sink.clone(),
        }
    }

    /// Merge the events a forked child recorded since the fork
    ///
    /// Events are appended without being streamed again.
    pub fn join(&mut self, child: Context) {
        let start = child.fork_point.min(child.history.len());
        self.history.extend(child.history.into_iter().skip(start));
    }

    // =========== Generic Key-Value Operations ===========

    /// Insert a value into the context
    pub fn insert(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.data.insert(key.into(), value);
    }

    /// Get a value from the context
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.data.get(key)
    }

    /// Insert a typed value into the context
    ///
    /// Serializes the value to JSON before storing.
    pub fn insert_typed<T: Serialize>(
        &mut self,
        key: impl Into<String>,
        value: &T,
    ) -> crate::Result<()> {
        let json_value = serde_json::to_value(value).map_err(|e| {
            crate::Error::ProcessingFailed(format!("Failed to serialize context value: {e}"))
        })?;
        self.data.insert(key.into(), json_value);
        Ok(())
    }

    /// Get a typed value from the context
    ///
    /// Deserializes the JSON value into the specified type.
    pub fn get_typed<T: for<'de> Deserialize<'de>>(&self, key: &str) -> crate::Result<Option<T>> {
        match self.data.get(key) {
            None => Ok(None),
            Some(value) => {
                let typed = serde_json::from_value(value.clone()).map_err(|e| {
                    crate::Error::ProcessingFailed(format!(
                        "Failed to deserialize context value: {e}"
                    ))
                })?;
                Ok(Some(typed))
            }
        }
    }

    /// Check if a key exists in the context
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Remove a value from the context
    pub fn remove(&mut self, key: &str) -> Option<serde_json::Value> {
        self.data.remove(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use tokio::sync::mpsc;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct TestData {
        value: i32,
        text: String,
    }

    #[test]
    fn test_basic_operations() {
        let mut ctx = Context::new();
        ctx.insert("key", serde_json::json!("value"));
        assert!(ctx.contains_key("key"));
        assert_eq!(ctx.get("key"), Some(&serde_json::json!("value")));

        ctx.remove("key");
        assert!(!ctx.contains_key("key"));
    }

    #[test]
    fn test_typed_insert_get() {
        let mut ctx = Context::new();
        let data = TestData {
            value: 42,
            text: "hello".to_string(),
        };

        ctx.insert_typed("test", &data).unwrap();

        let retrieved: TestData = ctx.get_typed("test").unwrap().unwrap();
        assert_eq!(retrieved, data);
    }

    #[test]
    fn test_builder_chain() {
        let ctx = Context::new()
            .with_invocation_id("inv-1")
            .with_app_name("app")
            .with_session_id("sess-123")
            .with_user_id("user-456");

        assert_eq!(ctx.invocation_id(), "inv-1");
        assert_eq!(ctx.app_name(), Some("app"));
        assert_eq!(ctx.session_id(), Some("sess-123"));
        assert_eq!(ctx.user_id(), Some("user-456"));
    }

    #[test]
    fn test_record_streams_to_sink() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut ctx = Context::new().with_event_sink(tx);

        ctx.record(Event::user("inv", "hello"));

        let streamed = rx.try_recv().unwrap();
        assert_eq!(streamed.text.as_deref(), Some("hello"));
        assert_eq!(ctx.history().len(), 1);
    }

    #[test]
    fn test_record_without_receiver_keeps_history() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let mut ctx = Context::new().with_event_sink(tx);

        ctx.record(Event::user("inv", "hello"));
        assert_eq!(ctx.history().len(), 1);
    }

    #[test]
    fn test_fork_isolates_siblings() {
        let mut parent = Context::new().with_invocation_id("inv");
        parent.record(Event::user("inv", "post"));

        let mut left = parent.fork("left");
        let mut right = parent.fork("right");
        left.record(Event::agent("inv", "a", "from left"));
        right.record(Event::agent("inv", "b", "from right"));

        assert_eq!(left.history().len(), 2);
        assert_eq!(right.history().len(), 2);
        assert_eq!(left.history()[1].branch.as_deref(), Some("left"));

        parent.join(left);
        parent.join(right);

        let authors: Vec<&str> = parent.history().iter().map(|e| e.author.as_str()).collect();
        assert_eq!(authors, vec!["user", "a", "b"]);
    }

    #[test]
    fn test_nested_fork_branch_path() {
        let parent = Context::new();
        let child = parent.fork("research").fork("sec");
        assert_eq!(child.branch(), Some("research.sec"));
    }

    #[test]
    fn test_get_typed_missing_key() {
        let ctx = Context::new();
        let result: crate::Result<Option<TestData>> = ctx.get_typed("missing");
        assert!(result.unwrap().is_none());
    }
}
