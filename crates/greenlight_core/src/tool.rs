//! Tool-call types for structured model output.

use serde::{Deserialize, Serialize};

/// A tool/function call made by the model.
///
/// The `arguments` field is kept as the raw string the provider returned.
/// Models routinely truncate or mangle it, so decoding is deferred to the
/// recovery parser rather than done eagerly at the wire boundary.
///
/// # Examples
///
/// ```
/// use greenlight_core::ToolCall;
///
/// let call = ToolCall {
///     id: "call_123".to_string(),
///     name: "emit_keyframes".to_string(),
///     arguments: r#"{"frames": []}"#.to_string(),
/// };
///
/// assert_eq!(call.name, "emit_keyframes");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique identifier for this tool call
    pub id: String,
    /// Name of the tool/function the model invoked
    pub name: String,
    /// Raw argument payload, undecoded
    pub arguments: String,
}

/// A tool/function the model is allowed to call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Name of the tool
    pub name: String,
    /// What the tool does, shown to the model
    pub description: String,
    /// JSON Schema for the tool's arguments
    pub parameters: serde_json::Value,
}
