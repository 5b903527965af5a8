//! The orchestrator's structured result.

use serde::Serialize;

/// What one orchestrator invocation accomplished.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Always true; failures are reported as errors, not reports
    pub success: bool,
    /// The stage this invocation completed, if one ran
    pub stage_completed: Option<String>,
    /// Whether every stage is now done
    pub is_complete: bool,
    /// The next pending stage, when not complete
    pub next_stage: Option<String>,
    /// Progress after this invocation, 0-100
    pub progress: i32,
}

impl RunReport {
    /// Report for a record that is already (or just became) fully complete.
    pub fn complete(stage_completed: Option<String>) -> Self {
        Self {
            success: true,
            stage_completed,
            is_complete: true,
            next_stage: None,
            progress: 100,
        }
    }

    /// Report for a completed stage with more work pending.
    pub fn stage_done(stage: String, next_stage: String, progress: i32) -> Self {
        Self {
            success: true,
            stage_completed: Some(stage),
            is_complete: false,
            next_stage: Some(next_stage),
            progress,
        }
    }
}
