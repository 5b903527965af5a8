//! HTTP driver speaking one provider-shaped endpoint.

use async_trait::async_trait;
use greenlight_core::{GenerateRequest, GenerateResponse};
use greenlight_error::{ModelError, ModelErrorKind};
use greenlight_interface::ModelDriver;
use tracing::debug;

/// Drives generation calls against a single provider endpoint.
///
/// The provider tag is fixed at construction, so every request and response
/// on this driver goes through one codec pair.
#[derive(Debug, Clone)]
pub struct HttpModelDriver {
    client: reqwest::Client,
    provider: crate::ProviderKind,
    base_url: String,
    api_key: String,
}

impl HttpModelDriver {
    /// Build a driver for one provider endpoint.
    pub fn new(
        provider: crate::ProviderKind,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            provider,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    fn classify_status(&self, model: &str, status: reqwest::StatusCode, body: String) -> ModelError {
        let kind = match status.as_u16() {
            429 => ModelErrorKind::RateLimited(format!("{}: {}", model, truncate(&body))),
            402 => ModelErrorKind::QuotaExhausted(format!("{}: {}", model, truncate(&body))),
            code => ModelErrorKind::Api {
                status: code,
                message: truncate(&body).to_string(),
            },
        };
        ModelError::new(kind)
    }
}

/// Error bodies can be arbitrarily large; keep a readable prefix.
fn truncate(body: &str) -> &str {
    let end = body
        .char_indices()
        .map(|(i, c)| i + c.len_utf8())
        .take_while(|&end| end <= 512)
        .last()
        .unwrap_or(0);
    &body[..end]
}

#[async_trait]
impl ModelDriver for HttpModelDriver {
    async fn generate(&self, req: &GenerateRequest) -> Result<GenerateResponse, ModelError> {
        let url = self.provider.endpoint(&self.base_url, &req.model);
        let body = self.provider.encode(req)?;

        debug!(provider = self.provider.name(), model = %req.model, "dispatching generation request");

        let builder = self.client.post(&url).json(&body);
        let response = self
            .provider
            .apply_auth(builder, &self.api_key)
            .send()
            .await
            .map_err(|e| ModelError::new(ModelErrorKind::Http(e.to_string())))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ModelError::new(ModelErrorKind::Http(e.to_string())))?;

        if !status.is_success() {
            return Err(self.classify_status(&req.model, status, text));
        }

        self.provider.decode(&req.model, &text)
    }

    fn provider_name(&self) -> &'static str {
        self.provider.name()
    }
}
