//! In-memory record store for tests and local runs.

use async_trait::async_trait;
use chrono::Utc;
use greenlight_error::{DatabaseError, DatabaseErrorKind};
use greenlight_interface::{GenerationRecord, RecordStatus, RecordStore};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// [`RecordStore`] over a shared map.
///
/// Applies the same field-scoped write discipline as the PostgreSQL store,
/// so orchestration tests exercise the real update semantics.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    records: RwLock<HashMap<Uuid, GenerationRecord>>,
}

impl InMemoryRecordStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a record wholesale.
    pub async fn put(&self, record: GenerationRecord) {
        self.records.write().await.insert(record.id, record);
    }

    /// Snapshot a record for assertions.
    pub async fn snapshot(&self, id: Uuid) -> Option<GenerationRecord> {
        self.records.read().await.get(&id).cloned()
    }

    async fn update<F>(&self, id: Uuid, apply: F) -> Result<(), DatabaseError>
    where
        F: FnOnce(&mut GenerationRecord),
    {
        let mut records = self.records.write().await;
        let record = records.get_mut(&id).ok_or_else(|| {
            DatabaseError::new(DatabaseErrorKind::Query(format!(
                "no record with id {}",
                id
            )))
        })?;
        apply(record);
        record.updated_at = Utc::now();
        Ok(())
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn load(&self, id: Uuid) -> Result<Option<GenerationRecord>, DatabaseError> {
        Ok(self.records.read().await.get(&id).cloned())
    }

    async fn begin_attempt(
        &self,
        id: Uuid,
        stage: &str,
        attempts: i32,
    ) -> Result<(), DatabaseError> {
        let stage = stage.to_string();
        self.update(id, |record| {
            record.status = RecordStatus::Generating;
            record.stage = Some(stage);
            record.attempts = attempts;
            record.heartbeat_at = Some(Utc::now());
            record.error_code = None;
            record.error_detail = None;
        })
        .await
    }

    async fn write_heartbeat(
        &self,
        id: Uuid,
        substage: &str,
        progress: i32,
    ) -> Result<(), DatabaseError> {
        let substage = substage.to_string();
        self.update(id, |record| {
            record.heartbeat_at = Some(Utc::now());
            record.substage = Some(substage);
            record.progress = progress;
        })
        .await
    }

    async fn complete_stage(
        &self,
        id: Uuid,
        stage: &str,
        completion_map: &JsonValue,
        payload: &JsonValue,
        progress: i32,
    ) -> Result<(), DatabaseError> {
        let stage = stage.to_string();
        let completion_map = completion_map.clone();
        let payload = payload.clone();
        self.update(id, |record| {
            // Release the claim so the next invocation can start immediately.
            record.status = RecordStatus::Queued;
            record.stage = Some(stage);
            record.stage_completion_map = completion_map;
            record.payload = payload;
            record.progress = progress;
        })
        .await
    }

    async fn mark_failed(
        &self,
        id: Uuid,
        status: RecordStatus,
        code: &str,
        detail: &str,
    ) -> Result<(), DatabaseError> {
        let code = code.to_string();
        let detail = detail.to_string();
        self.update(id, |record| {
            record.status = status;
            record.error_code = Some(code);
            record.error_detail = Some(detail);
        })
        .await
    }

    async fn mark_completed(&self, id: Uuid) -> Result<(), DatabaseError> {
        self.update(id, |record| {
            record.status = RecordStatus::Completed;
            record.progress = 100;
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fresh_record() -> GenerationRecord {
        GenerationRecord {
            id: Uuid::new_v4(),
            project_id: Uuid::new_v4(),
            status: RecordStatus::Queued,
            stage: None,
            substage: None,
            progress: 0,
            attempts: 0,
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

    #[tokio::test]
    async fn begin_attempt_clears_prior_errors() {
        let store = InMemoryRecordStore::new();
        let mut record = fresh_record();
        record.error_code = Some("TIMEOUT".to_string());
        record.error_detail = Some("deadline elapsed".to_string());
        let id = record.id;
        store.put(record).await;

        store.begin_attempt(id, "outline", 2).await.unwrap();

        let record = store.snapshot(id).await.unwrap();
        assert_eq!(record.status, RecordStatus::Generating);
        assert_eq!(record.attempts, 2);
        assert!(record.error_code.is_none());
        assert!(record.heartbeat_at.is_some());
    }

    #[tokio::test]
    async fn heartbeat_does_not_touch_payload() {
        let store = InMemoryRecordStore::new();
        let mut record = fresh_record();
        record.payload = json!({"outline": {"logline": "heist"}});
        let id = record.id;
        store.put(record).await;

        store.write_heartbeat(id, "outline:drafting", 10).await.unwrap();

        let record = store.snapshot(id).await.unwrap();
        assert_eq!(record.payload, json!({"outline": {"logline": "heist"}}));
        assert_eq!(record.progress, 10);
        assert_eq!(record.substage.as_deref(), Some("outline:drafting"));
    }

    #[tokio::test]
    async fn complete_stage_releases_the_claim() {
        let store = InMemoryRecordStore::new();
        let mut record = fresh_record();
        record.status = RecordStatus::Generating;
        record.heartbeat_at = Some(Utc::now());
        let id = record.id;
        store.put(record).await;

        store
            .complete_stage(id, "outline", &json!({"outline": {"done": true}}), &json!({}), 25)
            .await
            .unwrap();

        let record = store.snapshot(id).await.unwrap();
        assert_eq!(record.status, RecordStatus::Queued);
        assert!(record.is_stage_done("outline"));
    }

    #[tokio::test]
    async fn failure_preserves_the_completion_ledger() {
        let store = InMemoryRecordStore::new();
        let mut record = fresh_record();
        record.stage_completion_map = json!({"outline": {"done": true}});
        let id = record.id;
        store.put(record).await;

        store
            .mark_failed(id, RecordStatus::Timeout, "TIMEOUT", "deadline elapsed")
            .await
            .unwrap();

        let record = store.snapshot(id).await.unwrap();
        assert_eq!(record.status, RecordStatus::Timeout);
        assert!(record.is_stage_done("outline"));
        assert_eq!(record.error_code.as_deref(), Some("TIMEOUT"));
    }

    #[tokio::test]
    async fn missing_record_is_a_query_error() {
        let store = InMemoryRecordStore::new();
        let err = store.mark_completed(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err.kind, DatabaseErrorKind::Query(_)));
    }
}
