//! Top-level error wrapper types.

use crate::{ConfigError, DatabaseError, ErrorCode, ModelError, PipelineError};

/// The foundation error enum for the Greenlight workspace.
///
/// # Examples
///
/// ```
/// use greenlight_error::{ConfigError, GreenlightError};
///
/// let cfg_err = ConfigError::new("missing DATABASE_URL");
/// let err: GreenlightError = cfg_err.into();
/// assert!(format!("{}", err).contains("Configuration Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum GreenlightErrorKind {
    /// Model invocation error
    #[from(ModelError)]
    Model(ModelError),
    /// Datastore error
    #[from(DatabaseError)]
    Database(DatabaseError),
    /// Pipeline orchestration error
    #[from(PipelineError)]
    Pipeline(PipelineError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
}

/// Greenlight error with kind discrimination.
///
/// # Examples
///
/// ```
/// use greenlight_error::{GreenlightResult, ModelError, ModelErrorKind};
///
/// fn might_fail() -> GreenlightResult<()> {
///     Err(ModelError::new(ModelErrorKind::EmptyChain))?
/// }
///
/// assert!(might_fail().is_err());
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Greenlight Error: {}", _0)]
pub struct GreenlightError(Box<GreenlightErrorKind>);

impl GreenlightError {
    /// Create a new error from a kind.
    pub fn new(kind: GreenlightErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &GreenlightErrorKind {
        &self.0
    }

    /// The stable error code for this failure, for API surfaces.
    pub fn code(&self) -> ErrorCode {
        match self.kind() {
            GreenlightErrorKind::Model(e) => e.code(),
            GreenlightErrorKind::Database(_) => ErrorCode::DbError,
            GreenlightErrorKind::Pipeline(e) => e.code(),
            GreenlightErrorKind::Config(_) => ErrorCode::DbError,
        }
    }
}

// Generic From implementation for any type that converts to GreenlightErrorKind
impl<T> From<T> for GreenlightError
where
    T: Into<GreenlightErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Greenlight operations.
///
/// # Examples
///
/// ```
/// use greenlight_error::{ConfigError, GreenlightResult};
///
/// fn read_key() -> GreenlightResult<String> {
///     Err(ConfigError::new("key missing"))?
/// }
/// ```
pub type GreenlightResult<T> = std::result::Result<T, GreenlightError>;
