//! Model invoker and fallback chain for Greenlight.
//!
//! One [`HttpModelDriver`] speaks to one provider-shaped chat-completion
//! endpoint; the provider is an explicit tag selecting a narrow wire codec,
//! never structural sniffing. [`invoke`] bounds a single call with a hard
//! deadline that cancels the in-flight request. [`FallbackChain`] walks an
//! ordered list of (model, timeout) attempts, stopping at the first
//! acceptable result and aborting outright on caller-level failures.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod anthropic;
mod chain;
mod driver;
mod google;
mod invoker;
mod openai;
mod provider;

pub use chain::{AttemptRecord, CallParams, ChainSuccess, FallbackChain, ModelAttempt};
pub use driver::HttpModelDriver;
pub use invoker::invoke;
pub use provider::ProviderKind;
