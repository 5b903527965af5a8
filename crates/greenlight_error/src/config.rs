//! Configuration error type.

/// Error raised when configuration is missing or invalid.
///
/// # Examples
///
/// ```
/// use greenlight_error::ConfigError;
///
/// let err = ConfigError::new("GREENLIGHT_API_KEY not set");
/// assert!(format!("{}", err).contains("API_KEY"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Configuration Error: {} at line {} in {}", message, line, file)]
pub struct ConfigError {
    /// Description of the configuration problem
    pub message: String,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl ConfigError {
    /// Create a new ConfigError with automatic location tracking.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }
}
