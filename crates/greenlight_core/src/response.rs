//! Normalized generation response types.

use crate::ToolCall;
use serde::{Deserialize, Serialize};

/// The unified response object, normalized across providers.
///
/// # Examples
///
/// ```
/// use greenlight_core::GenerateResponse;
///
/// let response = GenerateResponse {
///     text: Some("FADE IN:".to_string()),
///     tool_call: None,
///     usage: None,
/// };
///
/// assert!(response.tool_call.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct GenerateResponse {
    /// Plain text content, if the model produced any
    pub text: Option<String>,
    /// The first tool call, if the model produced one
    pub tool_call: Option<ToolCall>,
    /// Token usage counters, when the provider reports them
    pub usage: Option<TokenUsage>,
}

impl GenerateResponse {
    /// A text-only response.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// Whether the response carries neither text nor a tool call.
    pub fn is_empty(&self) -> bool {
        self.text.as_deref().map_or(true, |t| t.trim().is_empty()) && self.tool_call.is_none()
    }
}

/// Token usage counters reported by a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TokenUsage {
    /// Tokens consumed by the prompt
    pub prompt_tokens: u32,
    /// Tokens generated in the completion
    pub completion_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_only_text_counts_as_empty() {
        let response = GenerateResponse::from_text("  \n ");
        assert!(response.is_empty());
        assert!(!GenerateResponse::from_text("INT. VAULT - NIGHT").is_empty());
    }
}
