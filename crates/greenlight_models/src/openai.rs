//! OpenAI-compatible wire codec.

use greenlight_core::{GenerateRequest, GenerateResponse, TokenUsage, ToolCall};
use greenlight_error::{ModelError, ModelErrorKind};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};

#[derive(Debug, Serialize)]
struct WireRequest {
    model: String,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<JsonValue>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<JsonValue>,
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    choices: Vec<WireChoice>,
    usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    message: WireChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct WireChoiceMessage {
    content: Option<String>,
    tool_calls: Option<Vec<WireToolCall>>,
}

#[derive(Debug, Deserialize)]
struct WireToolCall {
    id: String,
    function: WireFunction,
}

#[derive(Debug, Deserialize)]
struct WireFunction {
    name: String,
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct WireUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

pub(crate) fn encode(req: &GenerateRequest) -> Result<JsonValue, ModelError> {
    let tools = req.tools.as_ref().map(|tools| {
        tools
            .iter()
            .map(|tool| {
                json!({
                    "type": "function",
                    "function": {
                        "name": tool.name,
                        "description": tool.description,
                        "parameters": tool.parameters,
                    },
                })
            })
            .collect()
    });

    let tool_choice = req.tool_choice.as_ref().map(|choice| {
        if choice == "auto" {
            json!("auto")
        } else {
            json!({"type": "function", "function": {"name": choice}})
        }
    });

    let wire = WireRequest {
        model: req.model.clone(),
        messages: req
            .messages
            .iter()
            .map(|m| WireMessage {
                role: m.role.to_string(),
                content: m.content.clone(),
            })
            .collect(),
        max_tokens: req.max_tokens,
        temperature: req.temperature,
        tools,
        tool_choice,
    };

    serde_json::to_value(&wire)
        .map_err(|e| ModelError::new(ModelErrorKind::RequestBuild(e.to_string())))
}

pub(crate) fn decode(model: &str, body: &str) -> Result<GenerateResponse, ModelError> {
    let wire: WireResponse = serde_json::from_str(body).map_err(|e| {
        ModelError::new(ModelErrorKind::MalformedResponse {
            model: model.to_string(),
            message: format!("undecodable response body: {}", e),
        })
    })?;

    let choice = wire.choices.into_iter().next().ok_or_else(|| {
        ModelError::new(ModelErrorKind::MalformedResponse {
            model: model.to_string(),
            message: "response carried no choices".to_string(),
        })
    })?;

    let tool_call = choice
        .message
        .tool_calls
        .and_then(|calls| calls.into_iter().next())
        .map(|call| ToolCall {
            id: call.id,
            name: call.function.name,
            arguments: call.function.arguments,
        });

    Ok(GenerateResponse {
        text: choice.message.content,
        tool_call,
        usage: wire.usage.map(|u| TokenUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
        }),
    })
}
