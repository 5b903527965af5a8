//! Core request/response types for Greenlight.
//!
//! These are the provider-neutral chat-completion primitives shared by the
//! model invoker, the fallback chain, and the stage runner. Provider wire
//! formats live in `greenlight_models`; everything here is already
//! normalized.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod message;
mod request;
mod response;
mod role;
mod tool;

pub use message::ChatMessage;
pub use request::{GenerateRequest, GenerateRequestBuilder};
pub use response::{GenerateResponse, TokenUsage};
pub use role::Role;
pub use tool::{ToolCall, ToolDefinition};
