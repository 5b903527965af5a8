//! Google generative-language wire codec.
//!
//! Tool calling is not wired for this shape; chains that need structured
//! tool output run on the OpenAI- or Anthropic-shaped endpoints.

use greenlight_core::{GenerateRequest, GenerateResponse, Role, TokenUsage};
use greenlight_error::{ModelError, ModelErrorKind};
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};

pub(crate) fn encode(req: &GenerateRequest) -> Result<JsonValue, ModelError> {
    let system: Vec<&str> = req
        .messages
        .iter()
        .filter(|m| m.role == Role::System)
        .map(|m| m.content.as_str())
        .collect();

    let contents: Vec<JsonValue> = req
        .messages
        .iter()
        .filter(|m| m.role != Role::System)
        .map(|m| {
            let role = match m.role {
                Role::Assistant => "model",
                _ => "user",
            };
            json!({"role": role, "parts": [{"text": m.content}]})
        })
        .collect();

    if contents.is_empty() {
        return Err(ModelError::new(ModelErrorKind::RequestBuild(
            "google request needs at least one non-system message".to_string(),
        )));
    }

    let mut body = json!({"contents": contents});
    if !system.is_empty() {
        body["systemInstruction"] = json!({"parts": [{"text": system.join("\n\n")}]});
    }

    let mut generation_config = serde_json::Map::new();
    if let Some(max_tokens) = req.max_tokens {
        generation_config.insert("maxOutputTokens".to_string(), json!(max_tokens));
    }
    if let Some(temperature) = req.temperature {
        generation_config.insert("temperature".to_string(), json!(temperature));
    }
    if !generation_config.is_empty() {
        body["generationConfig"] = JsonValue::Object(generation_config);
    }

    Ok(body)
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    candidates: Vec<WireCandidate>,
    #[serde(rename = "usageMetadata")]
    usage_metadata: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
struct WireCandidate {
    content: WireContent,
}

#[derive(Debug, Deserialize)]
struct WireContent {
    parts: Vec<WirePart>,
}

#[derive(Debug, Deserialize)]
struct WirePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireUsage {
    #[serde(rename = "promptTokenCount")]
    prompt_token_count: Option<u32>,
    #[serde(rename = "candidatesTokenCount")]
    candidates_token_count: Option<u32>,
}

pub(crate) fn decode(model: &str, body: &str) -> Result<GenerateResponse, ModelError> {
    let wire: WireResponse = serde_json::from_str(body).map_err(|e| {
        ModelError::new(ModelErrorKind::MalformedResponse {
            model: model.to_string(),
            message: format!("undecodable response body: {}", e),
        })
    })?;

    let candidate = wire.candidates.into_iter().next().ok_or_else(|| {
        ModelError::new(ModelErrorKind::MalformedResponse {
            model: model.to_string(),
            message: "response carried no candidates".to_string(),
        })
    })?;

    let text: Vec<String> = candidate
        .content
        .parts
        .into_iter()
        .filter_map(|part| part.text)
        .collect();

    Ok(GenerateResponse {
        text: if text.is_empty() {
            None
        } else {
            Some(text.join("\n"))
        },
        tool_call: None,
        usage: wire.usage_metadata.map(|u| TokenUsage {
            prompt_tokens: u.prompt_token_count.unwrap_or(0),
            completion_tokens: u.candidates_token_count.unwrap_or(0),
        }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use greenlight_core::ChatMessage;

    #[test]
    fn assistant_turns_map_to_model_role() {
        let req = GenerateRequest::builder()
            .model("m".to_string())
            .messages(vec![
                ChatMessage::user("Draft scene one."),
                ChatMessage::assistant("INT. VAULT - NIGHT"),
                ChatMessage::user("Continue."),
            ])
            .max_tokens(Some(1024))
            .build()
            .unwrap();

        let body = encode(&req).unwrap();
        assert_eq!(body["contents"][1]["role"], "model");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 1024);
    }

    #[test]
    fn decodes_candidate_text() {
        let body = r#"{
            "candidates": [{"content": {"parts": [{"text": "EXT. ROOF - DAY"}]}}],
            "usageMetadata": {"promptTokenCount": 9, "candidatesTokenCount": 4}
        }"#;
        let response = decode("m", body).unwrap();
        assert_eq!(response.text.as_deref(), Some("EXT. ROOF - DAY"));
        assert_eq!(response.usage.unwrap().completion_tokens, 4);
    }

    #[test]
    fn no_candidates_is_malformed() {
        let err = decode("m", r#"{"candidates": []}"#).unwrap_err();
        assert!(matches!(err.kind, ModelErrorKind::MalformedResponse { .. }));
    }
}
