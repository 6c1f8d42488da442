//! Incoming social-media posts

use serde::{Deserialize, Serialize};

/// A post to analyze
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Author handle or display name
    pub handle: String,
    /// Post body
    pub content: String,
}

impl Post {
    pub fn new(handle: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
            content: content.into(),
        }
    }

    /// Render the post as the single user turn sent to the pipeline
    pub fn format_query(&self) -> String {
        format!("{} - {}", self.handle, self.content)
    }
}
