//! Generation request type.

use crate::{ChatMessage, ToolDefinition};
use serde::{Deserialize, Serialize};

/// A provider-neutral chat-completion request.
///
/// # Examples
///
/// ```
/// use greenlight_core::{ChatMessage, GenerateRequest};
///
/// let request = GenerateRequest::builder()
///     .model("draft-writer-large".to_string())
///     .messages(vec![
///         ChatMessage::system("You are a screenplay assistant."),
///         ChatMessage::user("Outline a three-act structure."),
///     ])
///     .max_tokens(Some(4096))
///     .build()
///     .unwrap();
///
/// assert_eq!(request.messages.len(), 2);
/// assert_eq!(request.max_tokens, Some(4096));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default, derive_builder::Builder)]
#[builder(default)]
pub struct GenerateRequest {
    /// Model identifier to use
    pub model: String,
    /// The conversation messages to send
    pub messages: Vec<ChatMessage>,
    /// Maximum number of tokens to generate
    pub max_tokens: Option<u32>,
    /// Sampling temperature (0.0 to 1.0)
    pub temperature: Option<f32>,
    /// Tools the model may call
    pub tools: Option<Vec<ToolDefinition>>,
    /// Forced tool choice, if any ("auto" or a tool name)
    pub tool_choice: Option<String>,
}

impl GenerateRequest {
    /// Start building a request.
    pub fn builder() -> GenerateRequestBuilder {
        GenerateRequestBuilder::default()
    }
}
