//! Stage runner, heartbeat monitor, and pipeline orchestrator.
//!
//! One orchestrator invocation runs at most one stage. The persisted record
//! is the only shared state: the completion ledger makes resumption
//! idempotent, the heartbeat makes crashed runs detectable, and the attempts
//! ceiling bounds retries. Stage output flows through the fallback chain and
//! the recovery parser before a structural validator accepts it.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod heartbeat;
mod merge;
mod orchestrator;
mod report;
mod runner;
mod stage;
mod validate;

pub use config::PipelineConfig;
pub use heartbeat::HeartbeatGuard;
pub use merge::{mark_stage_done, merge_payload};
pub use orchestrator::Orchestrator;
pub use report::RunReport;
pub use runner::{StageOutput, StageRunner};
pub use stage::StageId;
pub use validate::validate;
