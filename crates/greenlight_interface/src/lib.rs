//! Seam traits and shared record types for Greenlight.
//!
//! Defines the two injection points the pipeline is built around:
//! [`ModelDriver`] for outbound LLM calls and [`RecordStore`] for the
//! persisted generation record. Callers choose which implementation to
//! inject; there is no global state.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod record;
mod traits;

pub use record::{GenerationRecord, RecordStatus, StageCompletion};
pub use traits::{ModelDriver, RecordStore};
