//! PostgreSQL-backed record store.

use crate::row::{
    BeginAttemptChangeset, FailureChangeset, FinalizeChangeset, GenerationRecordRow,
    HeartbeatChangeset, StageCompletionChangeset,
};
use crate::PgPool;
use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use greenlight_error::{DatabaseError, DatabaseErrorKind};
use greenlight_interface::{GenerationRecord, RecordStatus, RecordStore};
use serde_json::Value as JsonValue;
use tracing::debug;
use uuid::Uuid;

/// [`RecordStore`] backed by PostgreSQL through an r2d2 pool.
///
/// Diesel is synchronous, so every operation hops onto the blocking thread
/// pool. Each trait method issues a single-row `UPDATE` scoped to its own
/// column set.
#[derive(Debug, Clone)]
pub struct PostgresRecordStore {
    pool: PgPool,
}

impl PostgresRecordStore {
    /// Wrap an established connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn with_conn<T, F>(&self, op: F) -> Result<T, DatabaseError>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> Result<T, DatabaseError> + Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool
                .get()
                .map_err(|e| DatabaseError::new(DatabaseErrorKind::Connection(e.to_string())))?;
            op(&mut conn)
        })
        .await
        .map_err(|e| DatabaseError::new(DatabaseErrorKind::Connection(e.to_string())))?
    }
}

fn query_err(e: diesel::result::Error) -> DatabaseError {
    DatabaseError::new(DatabaseErrorKind::Query(e.to_string()))
}

fn expect_one_row(id: Uuid, rows: usize) -> Result<(), DatabaseError> {
    if rows == 1 {
        Ok(())
    } else {
        Err(DatabaseError::new(DatabaseErrorKind::Query(format!(
            "update touched {} rows for record {}",
            rows, id
        ))))
    }
}

#[async_trait]
impl RecordStore for PostgresRecordStore {
    async fn load(&self, id: Uuid) -> Result<Option<GenerationRecord>, DatabaseError> {
        self.with_conn(move |conn| {
            use crate::schema::generation_records::dsl;

            let row: Option<GenerationRecordRow> = dsl::generation_records
                .find(id)
                .first(conn)
                .optional()
                .map_err(query_err)?;

            row.map(GenerationRecord::try_from).transpose()
        })
        .await
    }

    async fn begin_attempt(
        &self,
        id: Uuid,
        stage: &str,
        attempts: i32,
    ) -> Result<(), DatabaseError> {
        let stage = stage.to_string();
        debug!(%id, stage, attempts, "claiming record for a new attempt");
        self.with_conn(move |conn| {
            use crate::schema::generation_records::dsl;

            let now = Utc::now();
            let rows = diesel::update(dsl::generation_records.find(id))
                .set(&BeginAttemptChangeset {
                    status: RecordStatus::Generating.to_string(),
                    stage,
                    attempts,
                    heartbeat_at: now,
                    error_code: None,
                    error_detail: None,
                    updated_at: now,
                })
                .execute(conn)
                .map_err(query_err)?;
            expect_one_row(id, rows)
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
        self.with_conn(move |conn| {
            use crate::schema::generation_records::dsl;

            let now = Utc::now();
            let rows = diesel::update(dsl::generation_records.find(id))
                .set(&HeartbeatChangeset {
                    heartbeat_at: now,
                    substage,
                    progress,
                    updated_at: now,
                })
                .execute(conn)
                .map_err(query_err)?;
            expect_one_row(id, rows)
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
        debug!(%id, stage, progress, "persisting completed stage");
        self.with_conn(move |conn| {
            use crate::schema::generation_records::dsl;

            let rows = diesel::update(dsl::generation_records.find(id))
                .set(&StageCompletionChangeset {
                    status: RecordStatus::Queued.to_string(),
                    stage,
                    stage_completion_map: completion_map,
                    payload,
                    progress,
                    updated_at: Utc::now(),
                })
                .execute(conn)
                .map_err(query_err)?;
            expect_one_row(id, rows)
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
        self.with_conn(move |conn| {
            use crate::schema::generation_records::dsl;

            let rows = diesel::update(dsl::generation_records.find(id))
                .set(&FailureChangeset {
                    status: status.to_string(),
                    error_code: code,
                    error_detail: detail,
                    updated_at: Utc::now(),
                })
                .execute(conn)
                .map_err(query_err)?;
            expect_one_row(id, rows)
        })
        .await
    }

    async fn mark_completed(&self, id: Uuid) -> Result<(), DatabaseError> {
        self.with_conn(move |conn| {
            use crate::schema::generation_records::dsl;

            let rows = diesel::update(dsl::generation_records.find(id))
                .set(&FinalizeChangeset {
                    status: RecordStatus::Completed.to_string(),
                    progress: 100,
                    updated_at: Utc::now(),
                })
                .execute(conn)
                .map_err(query_err)?;
            expect_one_row(id, rows)
        })
        .await
    }
}
