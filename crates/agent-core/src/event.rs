//! Events recorded while an invocation runs
//!
//! Every user turn and every agent response is captured as an [`Event`].
//! Events form the conversation history that later stages read from and
//! that session stores persist.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Author name used for events that carry the user's turn
pub const USER_AUTHOR: &str = "user";

/// A single entry in a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Unique event ID
    pub id: String,

    /// ID of the invocation that produced this event
    pub invocation_id: String,

    /// `"user"` or the name of the agent that produced the event
    pub author: String,

    /// Dotted path of the parallel branch the event was produced in, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,

    /// Text content of the event
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Marks the last event of an invocation
    pub turn_complete: bool,

    /// Creation time
    pub timestamp: DateTime<Utc>,
}

impl Event {
    fn new(
        invocation_id: impl Into<String>,
        author: impl Into<String>,
        text: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            invocation_id: invocation_id.into(),
            author: author.into(),
            branch: None,
            text,
            turn_complete: false,
            timestamp: Utc::now(),
        }
    }

    /// Create an event carrying the user's turn
    pub fn user(invocation_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(invocation_id, USER_AUTHOR, Some(text.into()))
    }

    /// Create an intermediate event produced by an agent
    ///
    /// Empty text is stored as `None`.
    pub fn agent(
        invocation_id: impl Into<String>,
        author: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        let text = text.into();
        Self::new(invocation_id, author, (!text.is_empty()).then_some(text))
    }

    /// Create the event that closes an invocation
    pub fn final_response(
        invocation_id: impl Into<String>,
        author: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        let mut event = Self::agent(invocation_id, author, text);
        event.turn_complete = true;
        event
    }

    /// Attach the branch path
    pub fn with_branch(mut self, branch: Option<String>) -> Self {
        self.branch = branch;
        self
    }

    /// Whether this event was produced by the user
    pub fn is_user(&self) -> bool {
        self.author == USER_AUTHOR
    }

    /// Whether this event is the final response of its invocation
    ///
    /// Only events with `turn_complete` set and non-empty text qualify.
    pub fn is_final_response(&self) -> bool {
        self.turn_complete && self.text.as_deref().is_some_and(|t| !t.is_empty())
    }
}
