//! PostgreSQL persistence for Greenlight generation records.
//!
//! The [`PostgresRecordStore`] implements the record-store seam with
//! field-scoped single-row updates, so heartbeat writers and payload writers
//! never clobber each other. [`InMemoryRecordStore`] mirrors the same write
//! discipline for tests and local runs without a database.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod connection;
mod memory;
mod row;
/// Diesel schema definitions.
pub mod schema;
mod store;

pub use connection::{establish_pool, PgPool};
pub use memory::InMemoryRecordStore;
pub use row::{
    BeginAttemptChangeset, FailureChangeset, FinalizeChangeset, GenerationRecordRow,
    HeartbeatChangeset, NewGenerationRecordRow, StageCompletionChangeset,
};
pub use store::PostgresRecordStore;
