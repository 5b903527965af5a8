//! Error types for the Greenlight generation pipeline.
//!
//! This crate provides the foundation error types used throughout the
//! Greenlight ecosystem.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern for clean error
//! handling:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! On top of the hierarchy sits [`ErrorCode`], the stable machine-readable
//! taxonomy surfaced to API callers so they can make programmatic retry
//! decisions.
//!
//! # Examples
//!
//! ```
//! use greenlight_error::{GreenlightResult, ConfigError};
//!
//! fn load_settings() -> GreenlightResult<String> {
//!     Err(ConfigError::new("DATABASE_URL not set"))?
//! }
//!
//! match load_settings() {
//!     Ok(url) => println!("Got: {}", url),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod code;
mod config;
mod database;
mod error;
mod model;
mod pipeline;

pub use code::ErrorCode;
pub use config::ConfigError;
pub use database::{DatabaseError, DatabaseErrorKind};
pub use error::{GreenlightError, GreenlightErrorKind, GreenlightResult};
pub use model::{ModelError, ModelErrorKind};
pub use pipeline::{PipelineError, PipelineErrorKind};
