//! Trait definitions for model drivers and record persistence.

use crate::{GenerationRecord, RecordStatus};
use async_trait::async_trait;
use greenlight_core::{GenerateRequest, GenerateResponse};
use greenlight_error::{DatabaseError, ModelError};
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// Core trait every LLM provider client must implement.
///
/// One call to [`ModelDriver::generate`] performs exactly one outbound
/// request. Timeout bounding belongs to the invoker layer, which drops the
/// returned future to cancel the in-flight call; implementations must not
/// spawn detached work that would survive cancellation.
#[async_trait]
pub trait ModelDriver: Send + Sync {
    /// Perform one outbound chat-completion call.
    async fn generate(&self, req: &GenerateRequest) -> Result<GenerateResponse, ModelError>;

    /// Provider name (e.g., "openai", "anthropic", "google").
    fn provider_name(&self) -> &'static str;
}

/// Repository seam over the persisted generation record.
///
/// Every write is a field-scoped partial update: concurrent writers touching
/// disjoint fields (heartbeat vs. payload) must never clobber each other.
/// The datastore only needs single-row atomic updates, no multi-statement
/// transactions.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Load the full record, if it exists.
    async fn load(&self, id: Uuid) -> Result<Option<GenerationRecord>, DatabaseError>;

    /// Start an attempt: status becomes `generating`, the attempt counter and
    /// current stage are written, prior error fields are cleared, and the
    /// heartbeat is stamped.
    async fn begin_attempt(
        &self,
        id: Uuid,
        stage: &str,
        attempts: i32,
    ) -> Result<(), DatabaseError>;

    /// Refresh the liveness timestamp along with the current substage and
    /// progress. Touches no other fields.
    async fn write_heartbeat(
        &self,
        id: Uuid,
        substage: &str,
        progress: i32,
    ) -> Result<(), DatabaseError>;

    /// Persist a finished stage: the merged completion map, merged payload,
    /// and the stage's declared progress end value.
    async fn complete_stage(
        &self,
        id: Uuid,
        stage: &str,
        completion_map: &JsonValue,
        payload: &JsonValue,
        progress: i32,
    ) -> Result<(), DatabaseError>;

    /// Persist a terminal failure for this invocation. The completion map is
    /// left untouched so resumption skips already-finished stages.
    async fn mark_failed(
        &self,
        id: Uuid,
        status: RecordStatus,
        code: &str,
        detail: &str,
    ) -> Result<(), DatabaseError>;

    /// Finalize the record as completed with progress 100.
    async fn mark_completed(&self, id: Uuid) -> Result<(), DatabaseError>;
}
