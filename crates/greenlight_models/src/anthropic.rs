//! Anthropic messages-API wire codec.

use greenlight_core::{GenerateRequest, GenerateResponse, Role, TokenUsage, ToolCall};
use greenlight_error::{ModelError, ModelErrorKind};
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};

/// Anthropic requires an explicit output budget.
const DEFAULT_MAX_TOKENS: u32 = 4096;

pub(crate) fn encode(req: &GenerateRequest) -> Result<JsonValue, ModelError> {
    // System instructions ride in a dedicated top-level field.
    let system: Vec<&str> = req
        .messages
        .iter()
        .filter(|m| m.role == Role::System)
        .map(|m| m.content.as_str())
        .collect();

    let messages: Vec<JsonValue> = req
        .messages
        .iter()
        .filter(|m| m.role != Role::System)
        .map(|m| json!({"role": m.role.to_string(), "content": m.content}))
        .collect();

    if messages.is_empty() {
        return Err(ModelError::new(ModelErrorKind::RequestBuild(
            "anthropic request needs at least one non-system message".to_string(),
        )));
    }

    let mut body = json!({
        "model": req.model,
        "max_tokens": req.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        "messages": messages,
    });

    if !system.is_empty() {
        body["system"] = json!(system.join("\n\n"));
    }
    if let Some(temperature) = req.temperature {
        body["temperature"] = json!(temperature);
    }
    if let Some(tools) = &req.tools {
        body["tools"] = JsonValue::Array(
            tools
                .iter()
                .map(|tool| {
                    json!({
                        "name": tool.name,
                        "description": tool.description,
                        "input_schema": tool.parameters,
                    })
                })
                .collect(),
        );
        if let Some(choice) = &req.tool_choice {
            body["tool_choice"] = if choice == "auto" {
                json!({"type": "auto"})
            } else {
                json!({"type": "tool", "name": choice})
            };
        }
    }

    Ok(body)
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    content: Vec<WireBlock>,
    usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum WireBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "tool_use")]
    ToolUse {
        id: String,
        name: String,
        input: JsonValue,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct WireUsage {
    input_tokens: u32,
    output_tokens: u32,
}

pub(crate) fn decode(model: &str, body: &str) -> Result<GenerateResponse, ModelError> {
    let wire: WireResponse = serde_json::from_str(body).map_err(|e| {
        ModelError::new(ModelErrorKind::MalformedResponse {
            model: model.to_string(),
            message: format!("undecodable response body: {}", e),
        })
    })?;

    if wire.content.is_empty() {
        return Err(ModelError::new(ModelErrorKind::MalformedResponse {
            model: model.to_string(),
            message: "response carried no content blocks".to_string(),
        }));
    }

    let mut text_parts = Vec::new();
    let mut tool_call = None;
    for block in wire.content {
        match block {
            WireBlock::Text { text } => text_parts.push(text),
            WireBlock::ToolUse { id, name, input } if tool_call.is_none() => {
                tool_call = Some(ToolCall {
                    id,
                    name,
                    arguments: input.to_string(),
                });
            }
            _ => {}
        }
    }

    Ok(GenerateResponse {
        text: if text_parts.is_empty() {
            None
        } else {
            Some(text_parts.join("\n"))
        },
        tool_call,
        usage: wire.usage.map(|u| TokenUsage {
            prompt_tokens: u.input_tokens,
            completion_tokens: u.output_tokens,
        }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use greenlight_core::ChatMessage;

    #[test]
    fn system_messages_lift_into_the_system_field() {
        let req = GenerateRequest::builder()
            .model("m".to_string())
            .messages(vec![
                ChatMessage::system("You design soundscapes."),
                ChatMessage::user("Score the vault scene."),
            ])
            .build()
            .unwrap();

        let body = encode(&req).unwrap();
        assert_eq!(body["system"], "You design soundscapes.");
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
        assert_eq!(body["max_tokens"], DEFAULT_MAX_TOKENS);
    }

    #[test]
    fn tool_use_block_becomes_a_tool_call_with_string_arguments() {
        let body = r#"{
            "content": [
                {"type": "text", "text": "Calling the tool."},
                {"type": "tool_use", "id": "t1", "name": "emit_keyframes", "input": {"frames": []}}
            ],
            "usage": {"input_tokens": 10, "output_tokens": 3}
        }"#;
        let response = decode("m", body).unwrap();
        let call = response.tool_call.unwrap();
        assert_eq!(call.name, "emit_keyframes");
        assert_eq!(call.arguments, r#"{"frames":[]}"#);
        assert_eq!(response.usage.unwrap().prompt_tokens, 10);
    }

    #[test]
    fn empty_content_is_malformed() {
        let err = decode("m", r#"{"content": []}"#).unwrap_err();
        assert!(matches!(err.kind, ModelErrorKind::MalformedResponse { .. }));
    }
}
