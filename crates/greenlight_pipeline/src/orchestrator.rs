//! The pipeline entry point and its state machine.

use crate::config::PipelineConfig;
use crate::heartbeat::HeartbeatGuard;
use crate::report::RunReport;
use crate::runner::StageRunner;
use crate::stage::StageId;
use chrono::Utc;
use greenlight_error::{ErrorCode, GreenlightResult, PipelineError, PipelineErrorKind};
use greenlight_interface::{RecordStatus, RecordStore};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Drives one stage per invocation over the persisted record.
///
/// All coordination between invocations happens through the record in the
/// shared datastore; the orchestrator holds no cross-invocation state, so it
/// works even when every invocation runs in a fresh process.
pub struct Orchestrator {
    store: Arc<dyn RecordStore>,
    runner: StageRunner,
    config: PipelineConfig,
}

impl Orchestrator {
    /// Assemble the orchestrator from its injected collaborators.
    pub fn new(store: Arc<dyn RecordStore>, runner: StageRunner, config: PipelineConfig) -> Self {
        Self {
            store,
            runner,
            config,
        }
    }

    /// Run the next pending stage for `id`.
    ///
    /// Every exit is structured: either a [`RunReport`] or an error whose
    /// code the HTTP layer can map. A completed record is an idempotent
    /// no-op; a `generating` record with a fresh heartbeat is rejected as in
    /// progress; a stale one is recovered as a zombie run.
    #[instrument(skip(self), fields(record_id = %id))]
    pub async fn run(&self, id: Uuid) -> GreenlightResult<RunReport> {
        let record = self
            .store
            .load(id)
            .await?
            .ok_or_else(|| PipelineError::new(PipelineErrorKind::NotFound(id.to_string())))?;

        if record.status.is_complete() {
            debug!("record already complete, nothing to run");
            return Ok(RunReport::complete(None));
        }

        if record.status == RecordStatus::Generating {
            let threshold = chrono::Duration::seconds(self.config.staleness_threshold.as_secs() as i64);
            let fresh = record
                .heartbeat_age(Utc::now())
                .is_some_and(|age| age < threshold);
            if fresh {
                debug!("fresh heartbeat on a generating record, rejecting invocation");
                return Err(PipelineError::new(PipelineErrorKind::InProgress {
                    retry_after_secs: self.config.staleness_threshold.as_secs(),
                })
                .into());
            }
            // The completion ledger already reflects only genuinely finished
            // stages, so no cleanup is needed before taking over.
            warn!(
                attempts = record.attempts,
                "stale heartbeat on a generating record, recovering zombie run"
            );
        }

        let attempts = record.attempts + 1;
        if attempts > self.config.max_attempts {
            let err = PipelineError::new(PipelineErrorKind::MaxAttemptsExceeded {
                attempts,
                ceiling: self.config.max_attempts,
            });
            self.store
                .mark_failed(
                    id,
                    RecordStatus::Failed,
                    &ErrorCode::MaxAttemptsExceeded.to_string(),
                    &err.to_string(),
                )
                .await?;
            return Err(err.into());
        }

        let Some(stage) = StageId::first_pending(&record) else {
            self.store.mark_completed(id).await?;
            return Ok(RunReport::complete(None));
        };

        info!(stage = %stage, attempts, "claiming record and running stage");
        self.store.begin_attempt(id, stage.as_str(), attempts).await?;

        let heartbeat = HeartbeatGuard::spawn(
            self.store.clone(),
            id,
            stage.substage(),
            record.progress,
            self.config.heartbeat_interval,
        );
        let result = self.runner.run_stage(&record, stage).await;
        drop(heartbeat);

        match result {
            Ok(output) => {
                self.store
                    .complete_stage(
                        id,
                        stage.as_str(),
                        &output.completion_map,
                        &output.payload,
                        output.progress,
                    )
                    .await?;

                match StageId::first_pending_in(&output.completion_map) {
                    Some(next) => Ok(RunReport::stage_done(
                        stage.to_string(),
                        next.to_string(),
                        output.progress,
                    )),
                    None => {
                        self.store.mark_completed(id).await?;
                        Ok(RunReport::complete(Some(stage.to_string())))
                    }
                }
            }
            Err(err) => {
                let code = err.code();
                let status = if code == ErrorCode::Timeout {
                    RecordStatus::Timeout
                } else {
                    RecordStatus::Failed
                };
                let detail = err.to_string();
                warn!(stage = %stage, %code, "stage failed, persisting terminal state");
                self.store
                    .mark_failed(id, status, &code.to_string(), &detail)
                    .await?;
                Err(PipelineError::new(PipelineErrorKind::StageFailed {
                    stage: stage.to_string(),
                    code,
                    detail,
                })
                .into())
            }
        }
    }
}
