//! HTTP routes and error-code-to-status mapping.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use greenlight_error::{ErrorCode, GreenlightError, GreenlightErrorKind};
use greenlight_pipeline::Orchestrator;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    orchestrator: Arc<Orchestrator>,
}

impl AppState {
    /// Wrap the orchestrator for handler access.
    pub fn new(orchestrator: Arc<Orchestrator>) -> Self {
        Self { orchestrator }
    }
}

/// Build the API router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/v1/records/:id/run", post(run_record))
        .with_state(state)
}

async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}

/// Run the next pending stage for one record.
async fn run_record(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    match state.orchestrator.run(id).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(err) => error_response(&err),
    }
}

/// Map a pipeline error to the HTTP surface.
///
/// 409 for the concurrency guard, 404 for a missing record, 500 for
/// everything else. The body always carries the stable error code.
fn error_response(err: &GreenlightError) -> Response {
    let code = err.code();
    let status = match code {
        ErrorCode::InProgress => StatusCode::CONFLICT,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let stage_failed = match err.kind() {
        GreenlightErrorKind::Pipeline(e) => e.stage_failed().map(str::to_string),
        _ => None,
    };

    (
        status,
        Json(json!({
            "success": false,
            "error_code": code.to_string(),
            "error": err.to_string(),
            "stage_failed": stage_failed,
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use greenlight_error::{PipelineError, PipelineErrorKind};

    fn pipeline_err(kind: PipelineErrorKind) -> GreenlightError {
        PipelineError::new(kind).into()
    }

    #[test]
    fn in_progress_maps_to_conflict() {
        let response = error_response(&pipeline_err(PipelineErrorKind::InProgress {
            retry_after_secs: 45,
        }));
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn not_found_maps_to_404() {
        let response = error_response(&pipeline_err(PipelineErrorKind::NotFound(
            "abc".to_string(),
        )));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn stage_failure_maps_to_500() {
        let response = error_response(&pipeline_err(PipelineErrorKind::StageFailed {
            stage: "keyframes".to_string(),
            code: ErrorCode::MalformedResponse,
            detail: "every model rejected".to_string(),
        }));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn max_attempts_maps_to_500() {
        let response = error_response(&pipeline_err(PipelineErrorKind::MaxAttemptsExceeded {
            attempts: 6,
            ceiling: 5,
        }));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
