//! The persisted generation record — the unit of resumable work.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// Lifecycle status of a generation record.
///
/// Exactly one record may be `generating` at a time for a given logical job;
/// the heartbeat staleness check is what enforces it.
///
/// # Examples
///
/// ```
/// use greenlight_interface::RecordStatus;
/// use std::str::FromStr;
///
/// assert_eq!(RecordStatus::Generating.to_string(), "generating");
/// assert_eq!(RecordStatus::from_str("timeout").unwrap(), RecordStatus::Timeout);
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RecordStatus {
    /// No invocation owns the record: freshly created, or between stages
    Queued,
    /// An invocation owns the record and is running a stage
    Generating,
    /// Every stage is done; terminal
    Completed,
    /// A stage failed for a non-deadline reason
    Failed,
    /// A stage failed because its deadline elapsed
    Timeout,
    /// An unexpected internal failure
    Error,
}

impl RecordStatus {
    /// Whether this status is terminal success.
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Whether a caller may re-invoke the orchestrator on this status.
    pub fn is_resumable(&self) -> bool {
        matches!(
            self,
            Self::Queued | Self::Generating | Self::Failed | Self::Timeout | Self::Error
        )
    }
}

/// One entry in the stage completion map — the durable resumability ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageCompletion {
    /// Whether this stage finished successfully
    pub done: bool,
    /// When the stage finished
    pub completed_at: Option<DateTime<Utc>>,
}

/// The unit of resumable generation work.
///
/// All coordination between invocations happens through this record in the
/// shared datastore; there is no in-process state shared across invocations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRecord {
    /// Opaque identity
    pub id: Uuid,
    /// Owning project
    pub project_id: Uuid,
    /// Lifecycle status
    pub status: RecordStatus,
    /// Stage currently or last active
    pub stage: Option<String>,
    /// Finer progress label, for UI purposes only
    pub substage: Option<String>,
    /// 0-100, monotonically non-decreasing while one invocation runs
    pub progress: i32,
    /// Incremented once per orchestrator invocation
    pub attempts: i32,
    /// Liveness timestamp refreshed during an active run
    pub heartbeat_at: Option<DateTime<Utc>>,
    /// Stage id -> [`StageCompletion`]; a stage marked done is never re-run
    pub stage_completion_map: JsonValue,
    /// Accumulated structured result, merged additively as stages complete
    pub payload: JsonValue,
    /// Stable error code set on failure, cleared on a new attempt
    pub error_code: Option<String>,
    /// Human-readable failure detail
    pub error_detail: Option<String>,
    /// Optional original source text fed to stage prompts
    pub source_text: Option<String>,
    /// Row creation time
    pub created_at: DateTime<Utc>,
    /// Last row update time
    pub updated_at: DateTime<Utc>,
}

impl GenerationRecord {
    /// Whether the completion ledger marks `stage` as done.
    pub fn is_stage_done(&self, stage: &str) -> bool {
        self.stage_completion_map
            .get(stage)
            .and_then(|entry| entry.get("done"))
            .and_then(JsonValue::as_bool)
            .unwrap_or(false)
    }

    /// Age of the heartbeat relative to `now`, if one was ever written.
    pub fn heartbeat_age(&self, now: DateTime<Utc>) -> Option<chrono::Duration> {
        self.heartbeat_at.map(|hb| now - hb)
    }
}
