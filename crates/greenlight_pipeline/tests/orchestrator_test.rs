//! End-to-end orchestrator behavior over the in-memory store.

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use greenlight_core::{GenerateRequest, GenerateResponse, ToolCall};
use greenlight_database::InMemoryRecordStore;
use greenlight_error::{ErrorCode, ModelError};
use greenlight_interface::{GenerationRecord, ModelDriver, RecordStatus};
use greenlight_models::{FallbackChain, ModelAttempt};
use greenlight_pipeline::{Orchestrator, PipelineConfig, StageRunner};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

#[derive(Clone, Copy)]
enum DriverMode {
    /// Answer every stage with a well-formed response
    Good,
    /// Never answer within any deadline
    Hang,
    /// Answer with unusable prose
    Garbage,
}

struct ScriptedDriver {
    mode: DriverMode,
    calls: AtomicUsize,
}

impl ScriptedDriver {
    fn new(mode: DriverMode) -> Arc<Self> {
        Arc::new(Self {
            mode,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModelDriver for ScriptedDriver {
    async fn generate(&self, req: &GenerateRequest) -> Result<GenerateResponse, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        match self.mode {
            DriverMode::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(GenerateResponse::from_text("too late"))
            }
            DriverMode::Garbage => Ok(GenerateResponse::from_text(
                "I'm sorry, I can't produce structured output today.",
            )),
            DriverMode::Good => {
                if req.tools.is_some() {
                    return Ok(GenerateResponse {
                        text: None,
                        tool_call: Some(ToolCall {
                            id: "c1".to_string(),
                            name: "emit_keyframes".to_string(),
                            arguments: json!({"frames": [
                                {"code": "KF-01", "scene_code": "SC-01",
                                 "image_prompt": "vault door, low light"},
                            ]})
                            .to_string(),
                        }),
                        usage: None,
                    });
                }

                let user = req.messages.last().map(|m| m.content.as_str()).unwrap_or("");
                let body = if user.contains("\"layers\"") {
                    json!({"layers": [{"name": "vault hum", "kind": "ambience", "notes": "low"}]})
                } else if user.contains("\"scenes\"") {
                    json!({"scenes": [{"code": "SC-01", "slugline": "INT. VAULT - NIGHT",
                                       "summary": "the break-in"}]})
                } else {
                    json!({"logline": "A heist goes sideways.",
                           "acts": [{"title": "Act I", "summary": "setup"}],
                           "characters": []})
                };
                Ok(GenerateResponse::from_text(&body.to_string()))
            }
        }
    }

    fn provider_name(&self) -> &'static str {
        "scripted"
    }
}

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
        source_text: Some("A retired safecracker takes one last job.".to_string()),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn orchestrator(store: Arc<InMemoryRecordStore>, driver: Arc<ScriptedDriver>) -> Orchestrator {
    let chain = FallbackChain::new(vec![
        ModelAttempt::new("primary", Duration::from_secs(30)),
        ModelAttempt::new("backup", Duration::from_secs(30)),
    ]);
    let runner = StageRunner::new(driver, chain);
    Orchestrator::new(store, runner, PipelineConfig::default())
}

#[tokio::test]
async fn completed_record_is_an_idempotent_no_op() {
    let store = Arc::new(InMemoryRecordStore::new());
    let driver = ScriptedDriver::new(DriverMode::Good);
    let mut record = fresh_record();
    record.status = RecordStatus::Completed;
    record.progress = 100;
    let id = record.id;
    store.put(record).await;

    let report = orchestrator(store, driver.clone()).run(id).await.unwrap();
    assert!(report.is_complete);
    assert_eq!(report.stage_completed, None);
    assert_eq!(driver.calls(), 0);
}

#[tokio::test]
async fn missing_record_is_not_found() {
    let store = Arc::new(InMemoryRecordStore::new());
    let driver = ScriptedDriver::new(DriverMode::Good);

    let err = orchestrator(store, driver).run(Uuid::new_v4()).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn done_stages_are_never_re_executed() {
    let store = Arc::new(InMemoryRecordStore::new());
    let driver = ScriptedDriver::new(DriverMode::Good);
    let mut record = fresh_record();
    record.stage_completion_map = json!({
        "outline": {"done": true, "completed_at": "2026-02-01T09:00:00Z"},
    });
    record.payload = json!({"logline": "A heist goes sideways.", "acts": []});
    record.progress = 25;
    let id = record.id;
    store.put(record).await;

    let report = orchestrator(store.clone(), driver.clone()).run(id).await.unwrap();
    assert_eq!(report.stage_completed.as_deref(), Some("scene_breakdown"));
    assert_eq!(report.next_stage.as_deref(), Some("keyframes"));
    assert_eq!(report.progress, 55);

    let record = store.snapshot(id).await.unwrap();
    assert!(record.is_stage_done("outline"));
    assert!(record.is_stage_done("scene_breakdown"));
    // Prior stage fields survive the merge.
    assert_eq!(record.payload["logline"], "A heist goes sideways.");
    assert_eq!(record.payload["scenes"][0]["code"], "SC-01");
}

#[tokio::test]
async fn fresh_heartbeat_rejects_a_second_invocation() {
    let store = Arc::new(InMemoryRecordStore::new());
    let driver = ScriptedDriver::new(DriverMode::Good);
    let mut record = fresh_record();
    record.status = RecordStatus::Generating;
    record.heartbeat_at = Some(Utc::now() - ChronoDuration::seconds(5));
    let id = record.id;
    store.put(record).await;

    let err = orchestrator(store, driver.clone()).run(id).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::InProgress);
    assert_eq!(driver.calls(), 0);
}

#[tokio::test]
async fn stale_heartbeat_recovers_the_zombie_run() {
    let store = Arc::new(InMemoryRecordStore::new());
    let driver = ScriptedDriver::new(DriverMode::Good);
    let mut record = fresh_record();
    record.status = RecordStatus::Generating;
    record.attempts = 1;
    record.heartbeat_at = Some(Utc::now() - ChronoDuration::seconds(300));
    let id = record.id;
    store.put(record).await;

    let report = orchestrator(store.clone(), driver.clone()).run(id).await.unwrap();
    assert_eq!(report.stage_completed.as_deref(), Some("outline"));
    assert!(driver.calls() >= 1);

    let record = store.snapshot(id).await.unwrap();
    assert_eq!(record.attempts, 2);
}

#[tokio::test]
async fn attempts_ceiling_fails_without_an_outbound_call() {
    let store = Arc::new(InMemoryRecordStore::new());
    let driver = ScriptedDriver::new(DriverMode::Good);
    let mut record = fresh_record();
    record.status = RecordStatus::Timeout;
    record.attempts = 5;
    let id = record.id;
    store.put(record).await;

    let err = orchestrator(store.clone(), driver.clone()).run(id).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::MaxAttemptsExceeded);
    assert_eq!(driver.calls(), 0);

    let record = store.snapshot(id).await.unwrap();
    assert_eq!(record.status, RecordStatus::Failed);
    assert_eq!(record.error_code.as_deref(), Some("MAX_ATTEMPTS_EXCEEDED"));
}

#[tokio::test]
async fn four_invocations_complete_the_whole_pipeline() {
    let store = Arc::new(InMemoryRecordStore::new());
    let driver = ScriptedDriver::new(DriverMode::Good);
    let record = fresh_record();
    let id = record.id;
    store.put(record).await;
    let orchestrator = orchestrator(store.clone(), driver);

    let stages = ["outline", "scene_breakdown", "keyframes", "audio_design"];
    for (index, expected) in stages.iter().enumerate() {
        let report = orchestrator.run(id).await.unwrap();
        assert_eq!(report.stage_completed.as_deref(), Some(*expected));
        assert_eq!(report.is_complete, index == stages.len() - 1);

        // A completed stage releases the claim, so the next back-to-back
        // invocation is not rejected as in progress.
        if !report.is_complete {
            let snapshot = store.snapshot(id).await.unwrap();
            assert_eq!(snapshot.status, RecordStatus::Queued);
        }
    }

    let record = store.snapshot(id).await.unwrap();
    assert_eq!(record.status, RecordStatus::Completed);
    assert_eq!(record.progress, 100);
    assert_eq!(record.attempts, 4);
    assert_eq!(record.payload["layers"][0]["kind"], "ambience");

    // Completed is terminal: one more invocation is a no-op.
    let report = orchestrator.run(id).await.unwrap();
    assert!(report.is_complete);
}

#[tokio::test(start_paused = true)]
async fn chain_wide_timeout_persists_timeout_status() {
    let store = Arc::new(InMemoryRecordStore::new());
    let driver = ScriptedDriver::new(DriverMode::Hang);
    let record = fresh_record();
    let id = record.id;
    store.put(record).await;

    let err = orchestrator(store.clone(), driver.clone()).run(id).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::Timeout);
    assert_eq!(driver.calls(), 2);

    let record = store.snapshot(id).await.unwrap();
    assert_eq!(record.status, RecordStatus::Timeout);
    assert_eq!(record.error_code.as_deref(), Some("TIMEOUT"));
    // Failure leaves the ledger untouched for the next invocation.
    assert!(!record.is_stage_done("outline"));
}

#[tokio::test]
async fn unusable_output_exhausts_the_chain_and_fails_the_stage() {
    let store = Arc::new(InMemoryRecordStore::new());
    let driver = ScriptedDriver::new(DriverMode::Garbage);
    let record = fresh_record();
    let id = record.id;
    store.put(record).await;

    let err = orchestrator(store.clone(), driver.clone()).run(id).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::ParseError);
    // Both models were given a chance before the stage failed.
    assert_eq!(driver.calls(), 2);

    let record = store.snapshot(id).await.unwrap();
    assert_eq!(record.status, RecordStatus::Failed);
    assert_eq!(record.error_code.as_deref(), Some("PARSE_ERROR"));
}

#[tokio::test]
async fn timed_out_record_resumes_on_the_next_invocation() {
    let store = Arc::new(InMemoryRecordStore::new());
    let driver = ScriptedDriver::new(DriverMode::Good);
    let mut record = fresh_record();
    record.status = RecordStatus::Timeout;
    record.attempts = 1;
    record.error_code = Some("TIMEOUT".to_string());
    record.error_detail = Some("deadline elapsed".to_string());
    let id = record.id;
    store.put(record).await;

    let report = orchestrator(store.clone(), driver).run(id).await.unwrap();
    assert_eq!(report.stage_completed.as_deref(), Some("outline"));

    let record = store.snapshot(id).await.unwrap();
    assert_eq!(record.attempts, 2);
    // A new attempt cleared the prior failure fields.
    assert!(record.error_code.is_none());
}
