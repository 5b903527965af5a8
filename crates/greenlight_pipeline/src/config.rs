//! Pipeline tuning knobs.

use std::time::Duration;

/// Timing and retry parameters for the orchestrator.
///
/// The staleness threshold sits several multiples above the heartbeat
/// interval so a live run with a few missed writes is never mistaken for a
/// zombie.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// How often the heartbeat writer refreshes liveness.
    pub heartbeat_interval: Duration,
    /// Heartbeat age past which a `generating` record counts as crashed.
    pub staleness_threshold: Duration,
    /// Permanent failure ceiling on orchestrator invocations per record.
    pub max_attempts: i32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval: Duration::from_secs(8),
            staleness_threshold: Duration::from_secs(45),
            max_attempts: 5,
        }
    }
}
