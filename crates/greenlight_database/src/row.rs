//! Diesel row models for generation records.
//!
//! Each changeset struct covers exactly one write path from the store trait,
//! so concurrent writers on disjoint field sets never clobber each other.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use greenlight_error::{DatabaseError, DatabaseErrorKind};
use greenlight_interface::{GenerationRecord, RecordStatus};
use serde_json::Value as JsonValue;
use std::str::FromStr;
use uuid::Uuid;

/// Full database row for the generation_records table.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable)]
#[diesel(table_name = crate::schema::generation_records)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct GenerationRecordRow {
    /// Primary key
    pub id: Uuid,
    /// Owning project
    pub project_id: Uuid,
    /// Lifecycle status string
    pub status: String,
    /// Stage currently or last active
    pub stage: Option<String>,
    /// Finer progress label for UI display
    pub substage: Option<String>,
    /// Overall progress, 0-100
    pub progress: i32,
    /// Orchestrator invocations consumed so far
    pub attempts: i32,
    /// Liveness timestamp refreshed during an active run
    pub heartbeat_at: Option<DateTime<Utc>>,
    /// Stage id to completion entry ledger
    pub stage_completion_map: JsonValue,
    /// Accumulated structured result
    pub payload: JsonValue,
    /// Stable error code from the last failed attempt
    pub error_code: Option<String>,
    /// Human-readable failure detail
    pub error_detail: Option<String>,
    /// Original source text fed to stage prompts
    pub source_text: Option<String>,
    /// Row creation time
    pub created_at: DateTime<Utc>,
    /// Last row update time
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<GenerationRecordRow> for GenerationRecord {
    type Error = DatabaseError;

    fn try_from(row: GenerationRecordRow) -> Result<Self, Self::Error> {
        let status = RecordStatus::from_str(&row.status).map_err(|_| {
            DatabaseError::new(DatabaseErrorKind::Conversion(format!(
                "unknown record status '{}' on record {}",
                row.status, row.id
            )))
        })?;

        Ok(GenerationRecord {
            id: row.id,
            project_id: row.project_id,
            status,
            stage: row.stage,
            substage: row.substage,
            progress: row.progress,
            attempts: row.attempts,
            heartbeat_at: row.heartbeat_at,
            stage_completion_map: row.stage_completion_map,
            payload: row.payload,
            error_code: row.error_code,
            error_detail: row.error_detail,
            source_text: row.source_text,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Insertable struct for creating a fresh record.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::generation_records)]
pub struct NewGenerationRecordRow {
    /// Primary key
    pub id: Uuid,
    /// Owning project
    pub project_id: Uuid,
    /// Initial lifecycle status string
    pub status: String,
    /// Empty or pre-seeded completion ledger
    pub stage_completion_map: JsonValue,
    /// Initial payload, usually an empty object
    pub payload: JsonValue,
    /// Original source text fed to stage prompts
    pub source_text: Option<String>,
}

/// Attempt start: claim the record, clear stale error state, stamp liveness.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = crate::schema::generation_records)]
#[diesel(treat_none_as_null = true)]
pub struct BeginAttemptChangeset {
    /// Always `generating`
    pub status: String,
    /// The stage this attempt will run
    pub stage: String,
    /// The new attempt count
    pub attempts: i32,
    /// Initial liveness stamp
    pub heartbeat_at: DateTime<Utc>,
    /// Always `None`: clears the prior failure code
    pub error_code: Option<String>,
    /// Always `None`: clears the prior failure detail
    pub error_detail: Option<String>,
    /// Write time
    pub updated_at: DateTime<Utc>,
}

/// Liveness refresh. Touches nothing a payload writer cares about.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = crate::schema::generation_records)]
pub struct HeartbeatChangeset {
    /// Refreshed liveness stamp
    pub heartbeat_at: DateTime<Utc>,
    /// Current substage label
    pub substage: String,
    /// Current progress value
    pub progress: i32,
    /// Write time
    pub updated_at: DateTime<Utc>,
}

/// Stage completion: merged ledger, merged payload, progress end value.
///
/// Also releases the claim by writing a resumable status, so the next
/// invocation is not rejected as in progress while the heartbeat is fresh.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = crate::schema::generation_records)]
pub struct StageCompletionChangeset {
    /// Back to `queued` so a follow-up invocation is accepted
    pub status: String,
    /// The stage that just completed
    pub stage: String,
    /// Ledger with the completed stage marked done
    pub stage_completion_map: JsonValue,
    /// Payload after the additive merge
    pub payload: JsonValue,
    /// The stage's declared progress end value
    pub progress: i32,
    /// Write time
    pub updated_at: DateTime<Utc>,
}

/// Terminal failure for one invocation. The completion ledger stays intact.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = crate::schema::generation_records)]
pub struct FailureChangeset {
    /// `failed` or `timeout`
    pub status: String,
    /// Stable machine-readable code
    pub error_code: String,
    /// Human-readable failure detail
    pub error_detail: String,
    /// Write time
    pub updated_at: DateTime<Utc>,
}

/// Final success: completed at full progress.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = crate::schema::generation_records)]
pub struct FinalizeChangeset {
    /// Always `completed`
    pub status: String,
    /// Always 100
    pub progress: i32,
    /// Write time
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(status: &str) -> GenerationRecordRow {
        GenerationRecordRow {
            id: Uuid::new_v4(),
            project_id: Uuid::new_v4(),
            status: status.to_string(),
            stage: Some("outline".to_string()),
            substage: None,
            progress: 25,
            attempts: 1,
            heartbeat_at: None,
            stage_completion_map: json!({}),
            payload: json!({}),
            error_code: None,
            error_detail: None,
            source_text: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn row_converts_to_record() {
        let record = GenerationRecord::try_from(row("generating")).unwrap();
        assert_eq!(record.status, RecordStatus::Generating);
        assert_eq!(record.stage.as_deref(), Some("outline"));
    }

    #[test]
    fn unknown_status_is_a_conversion_error() {
        let err = GenerationRecord::try_from(row("daydreaming")).unwrap_err();
        assert!(matches!(err.kind, DatabaseErrorKind::Conversion(_)));
    }
}
