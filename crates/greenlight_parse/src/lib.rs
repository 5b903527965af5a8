//! Defensive recovery parser for LLM output.
//!
//! Model responses that should be JSON are frequently truncated mid-token,
//! fenced in markdown, surrounded by prose, or peppered with smart quotes
//! and trailing commas. This crate turns such a blob into a parsed value
//! through a ladder of strictly-more-aggressive passes, and **never fails
//! loudly**: every outcome, including total defeat, is an ordinary
//! [`ParseOutcome`] value.
//!
//! ```
//! use greenlight_parse::{recover, ParseStrategy};
//!
//! let outcome = recover("```json\n{\"title\": \"Heat Death\"}\n```", "outline");
//! assert!(outcome.ok);
//! assert_eq!(outcome.strategy, ParseStrategy::FenceStripped);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod message;
mod outcome;
mod recover;

pub use message::{recover_response, recover_tool_arguments};
pub use outcome::{ParseOutcome, ParseStrategy};
pub use recover::recover;
