//! Deadline-bounded single model invocation.

use greenlight_core::{GenerateRequest, GenerateResponse};
use greenlight_error::{ModelError, ModelErrorKind};
use greenlight_interface::ModelDriver;
use std::time::Duration;
use tracing::warn;

/// Run one generation call under a hard deadline.
///
/// The timeout drops the driver future, which cancels the in-flight HTTP
/// request rather than leaving it running in the background. Responses with
/// neither text nor a tool call are rejected as empty so the caller can move
/// on to the next model in its chain.
pub async fn invoke(
    driver: &dyn ModelDriver,
    req: &GenerateRequest,
    budget: Duration,
) -> Result<GenerateResponse, ModelError> {
    let response = match tokio::time::timeout(budget, driver.generate(req)).await {
        Ok(result) => result?,
        Err(_) => {
            warn!(model = %req.model, budget_secs = budget.as_secs(), "model call exceeded its deadline");
            return Err(ModelError::new(ModelErrorKind::Timeout {
                model: req.model.clone(),
                budget_secs: budget.as_secs(),
            }));
        }
    };

    if response.is_empty() {
        return Err(ModelError::new(ModelErrorKind::EmptyResponse {
            model: req.model.clone(),
        }));
    }

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use greenlight_core::ChatMessage;

    struct HangingDriver;

    #[async_trait]
    impl ModelDriver for HangingDriver {
        async fn generate(&self, _req: &GenerateRequest) -> Result<GenerateResponse, ModelError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(GenerateResponse::from_text("too late"))
        }

        fn provider_name(&self) -> &'static str {
            "test"
        }
    }

    struct EmptyDriver;

    #[async_trait]
    impl ModelDriver for EmptyDriver {
        async fn generate(&self, _req: &GenerateRequest) -> Result<GenerateResponse, ModelError> {
            Ok(GenerateResponse {
                text: None,
                tool_call: None,
                usage: None,
            })
        }

        fn provider_name(&self) -> &'static str {
            "test"
        }
    }

    fn request() -> GenerateRequest {
        GenerateRequest::builder()
            .model("m".to_string())
            .messages(vec![ChatMessage::user("go")])
            .build()
            .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_overrun_becomes_timeout() {
        let err = invoke(&HangingDriver, &request(), Duration::from_secs(30))
            .await
            .unwrap_err();
        match err.kind {
            ModelErrorKind::Timeout { budget_secs, .. } => assert_eq!(budget_secs, 30),
            other => panic!("unexpected kind: {other}"),
        }
    }

    #[tokio::test]
    async fn empty_response_is_rejected() {
        let err = invoke(&EmptyDriver, &request(), Duration::from_secs(30))
            .await
            .unwrap_err();
        assert!(matches!(err.kind, ModelErrorKind::EmptyResponse { .. }));
        assert_eq!(err.code(), greenlight_error::ErrorCode::EmptyInput);
    }
}
