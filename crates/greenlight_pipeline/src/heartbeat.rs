//! Background liveness writer tied to one stage execution.

use greenlight_interface::RecordStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::warn;
use uuid::Uuid;

/// Periodic heartbeat writer, cancelled when dropped.
///
/// Spawned once a stage execution begins and held for its duration; dropping
/// the guard aborts the task on every exit path, so the writer can never
/// outlive the invocation that owns it. Write failures are logged and
/// swallowed: a missed heartbeat only narrows the staleness window, it must
/// not fail the stage.
pub struct HeartbeatGuard {
    handle: JoinHandle<()>,
}

impl HeartbeatGuard {
    /// Start the writer. The first write happens after one full interval;
    /// the attempt claim already stamped the heartbeat.
    pub fn spawn(
        store: Arc<dyn RecordStore>,
        id: Uuid,
        substage: String,
        progress: i32,
        interval: Duration,
    ) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if let Err(err) = store.write_heartbeat(id, &substage, progress).await {
                    warn!(%id, %err, "heartbeat write failed");
                }
            }
        });
        Self { handle }
    }
}

impl Drop for HeartbeatGuard {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use greenlight_error::DatabaseError;
    use greenlight_interface::{GenerationRecord, RecordStatus};
    use serde_json::Value as JsonValue;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingStore {
        beats: AtomicUsize,
    }

    #[async_trait]
    impl RecordStore for CountingStore {
        async fn load(&self, _id: Uuid) -> Result<Option<GenerationRecord>, DatabaseError> {
            Ok(None)
        }

        async fn begin_attempt(
            &self,
            _id: Uuid,
            _stage: &str,
            _attempts: i32,
        ) -> Result<(), DatabaseError> {
            Ok(())
        }

        async fn write_heartbeat(
            &self,
            _id: Uuid,
            _substage: &str,
            _progress: i32,
        ) -> Result<(), DatabaseError> {
            self.beats.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn complete_stage(
            &self,
            _id: Uuid,
            _stage: &str,
            _completion_map: &JsonValue,
            _payload: &JsonValue,
            _progress: i32,
        ) -> Result<(), DatabaseError> {
            Ok(())
        }

        async fn mark_failed(
            &self,
            _id: Uuid,
            _status: RecordStatus,
            _code: &str,
            _detail: &str,
        ) -> Result<(), DatabaseError> {
            Ok(())
        }

        async fn mark_completed(&self, _id: Uuid) -> Result<(), DatabaseError> {
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn writes_on_the_interval_and_stops_on_drop() {
        let store = Arc::new(CountingStore::default());
        let guard = HeartbeatGuard::spawn(
            store.clone(),
            Uuid::new_v4(),
            "outline:generating".to_string(),
            10,
            Duration::from_secs(8),
        );

        tokio::time::sleep(Duration::from_secs(25)).await;
        let beats_while_held = store.beats.load(Ordering::SeqCst);
        assert!(beats_while_held >= 2, "got {} beats", beats_while_held);

        drop(guard);
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(store.beats.load(Ordering::SeqCst), beats_while_held);
    }
}
