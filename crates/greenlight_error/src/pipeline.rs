//! Pipeline orchestration error types.

use crate::ErrorCode;

/// Specific error conditions for pipeline orchestration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum PipelineErrorKind {
    /// No record exists for the requested identifier
    #[display("Generation record '{}' not found", _0)]
    NotFound(String),
    /// Another invocation owns the record and its heartbeat is fresh
    #[display("Generation already in progress; retry after {}s", retry_after_secs)]
    InProgress {
        /// Suggested delay before the caller retries
        retry_after_secs: u64,
    },
    /// The per-record attempt ceiling was reached
    #[display("Max attempts exceeded: {} of {}", attempts, ceiling)]
    MaxAttemptsExceeded {
        /// Attempts consumed so far
        attempts: i32,
        /// The configured ceiling
        ceiling: i32,
    },
    /// A stage exhausted the fallback chain and failed
    #[display("Stage '{}' failed ({}): {}", stage, code, detail)]
    StageFailed {
        /// Stage identifier that failed
        stage: String,
        /// Terminal error code observed
        code: ErrorCode,
        /// Human-readable detail for the caller
        detail: String,
    },
}

/// Error type for pipeline orchestration.
///
/// # Examples
///
/// ```
/// use greenlight_error::{ErrorCode, PipelineError, PipelineErrorKind};
///
/// let err = PipelineError::new(PipelineErrorKind::InProgress { retry_after_secs: 45 });
/// assert_eq!(err.code(), ErrorCode::InProgress);
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Pipeline Error: {} at line {} in {}", kind, line, file)]
pub struct PipelineError {
    /// The specific error condition
    pub kind: PipelineErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl PipelineError {
    /// Create a new PipelineError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: PipelineErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// The stable error code for this failure.
    pub fn code(&self) -> ErrorCode {
        match &self.kind {
            PipelineErrorKind::NotFound(_) => ErrorCode::NotFound,
            PipelineErrorKind::InProgress { .. } => ErrorCode::InProgress,
            PipelineErrorKind::MaxAttemptsExceeded { .. } => ErrorCode::MaxAttemptsExceeded,
            PipelineErrorKind::StageFailed { code, .. } => *code,
        }
    }

    /// The stage that failed, if this error came out of a stage execution.
    pub fn stage_failed(&self) -> Option<&str> {
        match &self.kind {
            PipelineErrorKind::StageFailed { stage, .. } => Some(stage),
            _ => None,
        }
    }
}
