//! LLM abstraction and an OpenAI-compatible chat-completion client.
//!
//! The bot only needs single-shot, non-streaming completions; `CompletionBackend` is the seam
//! the region extractor depends on so it can be driven by a fake in tests.

mod openai;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use openai::{LlmError, OpenAiClient};

/// One role-tagged chat message (`user`, `system`, `assistant`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    #[serde(default)]
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// A backend that turns a list of messages into one completion text.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Returns the assistant's text content (untrimmed) or a typed error.
    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String, LlmError>;
}
