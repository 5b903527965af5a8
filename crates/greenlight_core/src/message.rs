//! Chat message type.

use crate::Role;
use serde::{Deserialize, Serialize};

/// One message in a chat-completion conversation.
///
/// # Examples
///
/// ```
/// use greenlight_core::{ChatMessage, Role};
///
/// let msg = ChatMessage::user("Write a logline for a heist film.");
/// assert_eq!(msg.role, Role::User);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Who is speaking
    pub role: Role,
    /// Plain text content
    pub content: String,
}

impl ChatMessage {
    /// Build a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// Build a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Build an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}
