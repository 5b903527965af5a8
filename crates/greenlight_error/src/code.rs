//! Stable machine-readable error codes.

/// The error taxonomy surfaced to API callers.
///
/// Codes serialize as `SCREAMING_SNAKE_CASE` strings and are stable across
/// releases so callers can build retry policy on them (auto-resume on
/// `TIMEOUT`/`VALIDATION_ERROR`, surface-and-stop on `QUOTA_EXHAUSTED`).
///
/// # Examples
///
/// ```
/// use greenlight_error::ErrorCode;
/// use std::str::FromStr;
///
/// assert_eq!(ErrorCode::RateLimited.to_string(), "RATE_LIMITED");
/// assert_eq!(ErrorCode::from_str("TIMEOUT").unwrap(), ErrorCode::Timeout);
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::IntoStaticStr,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Provider refused the call with HTTP 429; retry after a delay.
    RateLimited,
    /// Provider refused the call with HTTP 402; fatal until remediated.
    QuotaExhausted,
    /// The hard per-attempt deadline elapsed; retryable.
    Timeout,
    /// Provider accepted the call but returned an unusable response shape.
    MalformedResponse,
    /// The recovery parser exhausted every strategy.
    ParseError,
    /// Parsed structure failed the stage's structural validator.
    ValidationError,
    /// The orchestrator attempts ceiling was reached; permanently failed.
    MaxAttemptsExceeded,
    /// A live run already owns the record; not an error, a guard signal.
    InProgress,
    /// Datastore read or write failed.
    DbError,
    /// No record exists for the given identifier.
    NotFound,
    /// Input to the recovery parser was empty or whitespace-only.
    EmptyInput,
}

impl ErrorCode {
    /// Whether a caller can safely retry the operation after seeing this code.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited
                | Self::Timeout
                | Self::MalformedResponse
                | Self::ParseError
                | Self::ValidationError
                | Self::InProgress
                | Self::EmptyInput
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn codes_round_trip_as_screaming_snake() {
        for (code, s) in [
            (ErrorCode::RateLimited, "RATE_LIMITED"),
            (ErrorCode::QuotaExhausted, "QUOTA_EXHAUSTED"),
            (ErrorCode::MaxAttemptsExceeded, "MAX_ATTEMPTS_EXCEEDED"),
            (ErrorCode::InProgress, "IN_PROGRESS"),
            (ErrorCode::DbError, "DB_ERROR"),
        ] {
            assert_eq!(code.to_string(), s);
            assert_eq!(ErrorCode::from_str(s).unwrap(), code);
        }
    }

    #[test]
    fn fatal_codes_are_not_retryable() {
        assert!(!ErrorCode::QuotaExhausted.is_retryable());
        assert!(!ErrorCode::MaxAttemptsExceeded.is_retryable());
        assert!(ErrorCode::Timeout.is_retryable());
    }
}
