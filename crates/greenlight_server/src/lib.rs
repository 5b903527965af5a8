//! HTTP trigger for the Greenlight generation pipeline.
//!
//! One route does the work: `POST /v1/records/{id}/run` invokes the
//! orchestrator for the next pending stage and maps its error codes onto
//! HTTP statuses (409 in progress, 404 not found, 500 stage failure).

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod observability;
mod routes;

pub use config::ServerConfig;
pub use observability::init_tracing;
pub use routes::{create_router, AppState};
