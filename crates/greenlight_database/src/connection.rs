//! Database connection utilities.

use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use greenlight_error::{DatabaseError, DatabaseErrorKind};

/// Shared r2d2 connection pool over PostgreSQL.
pub type PgPool = Pool<ConnectionManager<PgConnection>>;

/// Build a connection pool from the `DATABASE_URL` environment variable.
///
/// # Errors
///
/// Returns an error if:
/// - `DATABASE_URL` is not set
/// - The pool cannot establish its first connection
pub fn establish_pool(max_size: u32) -> Result<PgPool, DatabaseError> {
    let database_url = std::env::var("DATABASE_URL").map_err(|_| {
        DatabaseError::new(DatabaseErrorKind::Connection(
            "DATABASE_URL environment variable not set".to_string(),
        ))
    })?;

    let manager = ConnectionManager::<PgConnection>::new(database_url);
    let pool = Pool::builder()
        .max_size(max_size)
        .build(manager)
        .map_err(|e| DatabaseError::new(DatabaseErrorKind::Connection(e.to_string())))?;

    // Fail fast on a bad URL instead of at first query.
    {
        let _conn = pool
            .get()
            .map_err(|e| DatabaseError::new(DatabaseErrorKind::Connection(e.to_string())))?;
    }

    Ok(pool)
}
