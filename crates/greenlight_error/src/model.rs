//! Model invocation error types.

use crate::ErrorCode;

/// Specific error conditions for outbound model calls.
///
/// The fallback chain classifies these into "abort the chain" (caller-level
/// conditions) and "try the next model" (per-model flukiness).
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ModelErrorKind {
    /// Provider returned HTTP 429
    #[display("Rate limited by provider: {}", _0)]
    RateLimited(String),
    /// Provider returned HTTP 402
    #[display("Provider quota exhausted: {}", _0)]
    QuotaExhausted(String),
    /// The hard per-attempt deadline elapsed
    #[display("Model '{}' timed out after {}s", model, budget_secs)]
    Timeout {
        /// Model identifier that timed out
        model: String,
        /// The deadline that elapsed, in seconds
        budget_secs: u64,
    },
    /// Response decoded but its shape was unusable
    #[display("Malformed response from '{}': {}", model, message)]
    MalformedResponse {
        /// Model identifier that produced the response
        model: String,
        /// What was wrong with the response shape
        message: String,
    },
    /// The recovery parser exhausted every strategy on the output
    #[display("Unparseable output from '{}': {}", model, message)]
    ParseFailed {
        /// Model identifier that produced the output
        model: String,
        /// Recovery warnings and fingerprint
        message: String,
    },
    /// Parsed structure was rejected by a structural validator
    #[display("Validation rejected output from '{}': {}", model, message)]
    ValidationFailed {
        /// Model identifier that produced the output
        model: String,
        /// The validator's findings
        message: String,
    },
    /// Response carried neither text nor a tool call
    #[display("Empty response from '{}'", model)]
    EmptyResponse {
        /// Model identifier that produced the response
        model: String,
    },
    /// Transport-level failure (connection, TLS, body read)
    #[display("HTTP transport error: {}", _0)]
    Http(String),
    /// Provider returned a non-success status other than 429/402
    #[display("Provider API error {}: {}", status, message)]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body or reason phrase
        message: String,
    },
    /// Outbound request could not be constructed
    #[display("Failed to build request: {}", _0)]
    RequestBuild(String),
    /// The fallback chain was configured with no attempts
    #[display("Fallback chain has no model attempts configured")]
    EmptyChain,
}

/// Error type for model invocation operations.
///
/// # Examples
///
/// ```
/// use greenlight_error::{ErrorCode, ModelError, ModelErrorKind};
///
/// let err = ModelError::new(ModelErrorKind::RateLimited("slow down".into()));
/// assert_eq!(err.code(), ErrorCode::RateLimited);
/// assert!(err.is_chain_fatal());
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Model Error: {} at line {} in {}", kind, line, file)]
pub struct ModelError {
    /// The specific error condition
    pub kind: ModelErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl ModelError {
    /// Create a new ModelError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ModelErrorKind) -> Self {
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
            ModelErrorKind::RateLimited(_) => ErrorCode::RateLimited,
            ModelErrorKind::QuotaExhausted(_) => ErrorCode::QuotaExhausted,
            ModelErrorKind::Timeout { .. } => ErrorCode::Timeout,
            ModelErrorKind::MalformedResponse { .. } => ErrorCode::MalformedResponse,
            ModelErrorKind::ParseFailed { .. } => ErrorCode::ParseError,
            ModelErrorKind::ValidationFailed { .. } => ErrorCode::ValidationError,
            ModelErrorKind::EmptyResponse { .. } => ErrorCode::EmptyInput,
            ModelErrorKind::Http(_) | ModelErrorKind::Api { .. } => ErrorCode::MalformedResponse,
            ModelErrorKind::RequestBuild(_) | ModelErrorKind::EmptyChain => {
                ErrorCode::MalformedResponse
            }
        }
    }

    /// Whether this failure aborts the fallback chain outright.
    ///
    /// Rate limiting and quota exhaustion are caller-level conditions: a
    /// different model under the same account will hit the same wall, so the
    /// chain surfaces them immediately instead of burning further attempts.
    pub fn is_chain_fatal(&self) -> bool {
        matches!(
            self.kind,
            ModelErrorKind::RateLimited(_) | ModelErrorKind::QuotaExhausted(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_is_retryable_within_the_chain() {
        let err = ModelError::new(ModelErrorKind::Timeout {
            model: "draft-writer-large".to_string(),
            budget_secs: 90,
        });
        assert_eq!(err.code(), ErrorCode::Timeout);
        assert!(!err.is_chain_fatal());
    }

    #[test]
    fn quota_exhaustion_aborts_the_chain() {
        let err = ModelError::new(ModelErrorKind::QuotaExhausted("payment required".into()));
        assert!(err.is_chain_fatal());
        assert_eq!(err.code(), ErrorCode::QuotaExhausted);
    }

    #[test]
    fn output_rejections_keep_their_distinct_codes() {
        let parse = ModelError::new(ModelErrorKind::ParseFailed {
            model: "m".to_string(),
            message: "exhausted".to_string(),
        });
        let validation = ModelError::new(ModelErrorKind::ValidationFailed {
            model: "m".to_string(),
            message: "frames missing".to_string(),
        });
        let empty = ModelError::new(ModelErrorKind::EmptyResponse {
            model: "m".to_string(),
        });
        assert_eq!(parse.code(), ErrorCode::ParseError);
        assert_eq!(validation.code(), ErrorCode::ValidationError);
        assert_eq!(empty.code(), ErrorCode::EmptyInput);
        assert!(!parse.is_chain_fatal());
        assert!(!validation.is_chain_fatal());
        assert!(!empty.is_chain_fatal());
    }

    #[test]
    fn errors_capture_call_site() {
        let err = ModelError::new(ModelErrorKind::EmptyChain);
        assert!(err.file.ends_with("model.rs"));
        assert!(err.line > 0);
    }
}
