//! Conversation roles.

use serde::{Deserialize, Serialize};

/// The speaker of a chat message.
///
/// # Examples
///
/// ```
/// use greenlight_core::Role;
///
/// assert_eq!(serde_json::to_string(&Role::System).unwrap(), "\"system\"");
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    /// System instruction framing the task
    System,
    /// Caller-provided prompt content
    User,
    /// Model-generated content
    Assistant,
}
