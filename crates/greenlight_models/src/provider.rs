//! Provider tags and codec dispatch.

use greenlight_core::{GenerateRequest, GenerateResponse};
use greenlight_error::ModelError;
use serde_json::Value as JsonValue;

/// The wire shape a provider endpoint speaks.
///
/// Selected explicitly by configuration; the tag picks a narrow
/// encoder/decoder pair, so an unexpected response shape fails structural
/// validation instead of being mis-sniffed into the wrong codec.
///
/// # Examples
///
/// ```
/// use greenlight_models::ProviderKind;
/// use std::str::FromStr;
///
/// assert_eq!(ProviderKind::from_str("openai").unwrap(), ProviderKind::OpenAi);
/// assert_eq!(ProviderKind::Anthropic.to_string(), "anthropic");
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString,
)]
#[strum(serialize_all = "lowercase")]
pub enum ProviderKind {
    /// OpenAI-compatible chat completions (`/chat/completions`)
    OpenAi,
    /// Anthropic messages API (`/v1/messages`)
    Anthropic,
    /// Google generative language API (`:generateContent`)
    Google,
}

impl ProviderKind {
    /// Static provider name for tracing fields.
    pub fn name(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::Google => "google",
        }
    }

    /// The full endpoint URL for one generation call.
    pub fn endpoint(&self, base_url: &str, model: &str) -> String {
        let base = base_url.trim_end_matches('/');
        match self {
            Self::OpenAi => format!("{}/chat/completions", base),
            Self::Anthropic => format!("{}/v1/messages", base),
            Self::Google => format!("{}/v1beta/models/{}:generateContent", base, model),
        }
    }

    /// Encode a neutral request into this provider's wire format.
    pub fn encode(&self, req: &GenerateRequest) -> Result<JsonValue, ModelError> {
        match self {
            Self::OpenAi => crate::openai::encode(req),
            Self::Anthropic => crate::anthropic::encode(req),
            Self::Google => crate::google::encode(req),
        }
    }

    /// Decode this provider's response body into the normalized shape.
    pub fn decode(&self, model: &str, body: &str) -> Result<GenerateResponse, ModelError> {
        match self {
            Self::OpenAi => crate::openai::decode(model, body),
            Self::Anthropic => crate::anthropic::decode(model, body),
            Self::Google => crate::google::decode(model, body),
        }
    }

    /// Attach this provider's authentication headers.
    pub fn apply_auth(
        &self,
        builder: reqwest::RequestBuilder,
        api_key: &str,
    ) -> reqwest::RequestBuilder {
        match self {
            Self::OpenAi => builder.header("Authorization", format!("Bearer {}", api_key)),
            Self::Anthropic => builder
                .header("x-api-key", api_key)
                .header("anthropic-version", "2023-06-01"),
            Self::Google => builder.header("x-goog-api-key", api_key),
        }
    }
}
