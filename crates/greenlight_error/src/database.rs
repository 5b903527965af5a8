//! Datastore error types.

/// Specific error conditions for datastore operations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum DatabaseErrorKind {
    /// Failed to obtain a connection from the pool
    #[display("Connection error: {}", _0)]
    Connection(String),
    /// Query execution failed
    #[display("Query error: {}", _0)]
    Query(String),
    /// Stored column value could not be converted to a domain type
    #[display("Conversion error: {}", _0)]
    Conversion(String),
}

/// Error type for datastore operations.
///
/// # Examples
///
/// ```
/// use greenlight_error::{DatabaseError, DatabaseErrorKind};
///
/// let err = DatabaseError::new(DatabaseErrorKind::Query("deadlock".into()));
/// assert!(format!("{}", err).contains("deadlock"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Database Error: {} at line {} in {}", kind, line, file)]
pub struct DatabaseError {
    /// The specific error condition
    pub kind: DatabaseErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl DatabaseError {
    /// Create a new DatabaseError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: DatabaseErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
