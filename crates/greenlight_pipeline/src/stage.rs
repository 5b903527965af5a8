//! The screenplay stage catalog.
//!
//! Stages run in a fixed declared order; a later stage never starts before
//! an earlier one is marked done in the completion ledger.

use greenlight_core::ToolDefinition;
use greenlight_interface::GenerationRecord;
use serde_json::{json, Value as JsonValue};

/// One discrete, independently resumable unit of generation work.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum StageId {
    /// Logline, act structure, character sketches
    Outline,
    /// Scene-by-scene breakdown of the outline
    SceneBreakdown,
    /// Identifier-coded keyframe image prompts per scene
    Keyframes,
    /// Soundtrack and ambience layers
    AudioDesign,
}

impl StageId {
    /// Every stage, in execution order.
    pub const ORDER: [StageId; 4] = [
        StageId::Outline,
        StageId::SceneBreakdown,
        StageId::Keyframes,
        StageId::AudioDesign,
    ];

    /// Stage identifier as stored in the completion ledger.
    pub fn as_str(&self) -> &'static str {
        self.into()
    }

    /// The progress value reached when this stage completes.
    pub fn progress_end(&self) -> i32 {
        match self {
            Self::Outline => 25,
            Self::SceneBreakdown => 55,
            Self::Keyframes => 80,
            Self::AudioDesign => 100,
        }
    }

    /// Whether this stage expects a strict machine-checkable schema.
    ///
    /// Strict stages carry codes and identifiers only; a parse missing
    /// required identifier fields is rejected back to the fallback chain.
    /// Prose-bearing stages get presence/type checks only.
    pub fn expects_strict_schema(&self) -> bool {
        matches!(self, Self::Keyframes)
    }

    /// The tool the model is asked to invoke, for stages that use one.
    pub fn tool_name(&self) -> Option<&'static str> {
        match self {
            Self::Keyframes => Some("emit_keyframes"),
            _ => None,
        }
    }

    /// Tool definition offered to the model, for stages that use one.
    pub fn tool_definition(&self) -> Option<ToolDefinition> {
        match self {
            Self::Keyframes => Some(ToolDefinition {
                name: "emit_keyframes".to_string(),
                description: "Emit the coded keyframe list for every scene".to_string(),
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "frames": {
                            "type": "array",
                            "items": {
                                "type": "object",
                                "properties": {
                                    "code": {"type": "string"},
                                    "scene_code": {"type": "string"},
                                    "image_prompt": {"type": "string"},
                                },
                                "required": ["code", "scene_code", "image_prompt"],
                            },
                        },
                    },
                    "required": ["frames"],
                }),
            }),
            _ => None,
        }
    }

    /// System instruction for this stage's generation call.
    pub fn system_prompt(&self) -> &'static str {
        match self {
            Self::Outline => {
                "You are a film development executive. You produce tight, \
                 structured story outlines as JSON and nothing else."
            }
            Self::SceneBreakdown => {
                "You are a screenwriter. You expand outlines into scene \
                 breakdowns as JSON and nothing else."
            }
            Self::Keyframes => {
                "You are a storyboard artist. You emit coded keyframe prompts \
                 through the provided tool."
            }
            Self::AudioDesign => {
                "You are a sound designer. You plan soundtrack and ambience \
                 layers as JSON and nothing else."
            }
        }
    }

    /// Build the user instruction from the accumulated payload and any
    /// original source text.
    pub fn user_prompt(&self, payload: &JsonValue, source_text: Option<&str>) -> String {
        let mut prompt = String::new();

        if let Some(source) = source_text {
            prompt.push_str("Source material:\n");
            prompt.push_str(source);
            prompt.push_str("\n\n");
        }

        match self {
            Self::Outline => {
                prompt.push_str(
                    "Write a story outline as a JSON object with keys \
                     \"logline\" (string), \"acts\" (array of act objects with \
                     \"title\" and \"summary\"), and \"characters\" (array).",
                );
            }
            Self::SceneBreakdown => {
                prompt.push_str("Outline so far:\n");
                prompt.push_str(&section(payload, "logline"));
                prompt.push_str(&section(payload, "acts"));
                prompt.push_str(
                    "\nBreak the outline into scenes. Reply with a JSON object \
                     with key \"scenes\": an array of scene objects carrying \
                     \"code\" (like \"SC-01\"), \"slugline\", and \"summary\".",
                );
            }
            Self::Keyframes => {
                prompt.push_str("Scenes:\n");
                prompt.push_str(&section(payload, "scenes"));
                prompt.push_str(
                    "\nFor each scene, emit one or more keyframes via the \
                     emit_keyframes tool. Every frame needs \"code\" (like \
                     \"KF-01\"), \"scene_code\" referencing the scene, and an \
                     \"image_prompt\".",
                );
            }
            Self::AudioDesign => {
                prompt.push_str("Scenes:\n");
                prompt.push_str(&section(payload, "scenes"));
                prompt.push_str(
                    "\nDesign the audio. Reply with a JSON object with key \
                     \"layers\": an array of layer objects carrying \"name\", \
                     \"kind\" (music, ambience, or effect), and \"notes\".",
                );
            }
        }

        prompt
    }

    /// Substage label written with heartbeats while this stage runs.
    pub fn substage(&self) -> String {
        format!("{}:generating", self)
    }

    /// The first stage the completion ledger does not mark done.
    pub fn first_pending(record: &GenerationRecord) -> Option<StageId> {
        Self::first_pending_in(&record.stage_completion_map)
    }

    /// Like [`StageId::first_pending`], but over a bare ledger value.
    pub fn first_pending_in(map: &JsonValue) -> Option<StageId> {
        Self::ORDER.into_iter().find(|stage| {
            !map.get(stage.as_str())
                .and_then(|entry| entry.get("done"))
                .and_then(JsonValue::as_bool)
                .unwrap_or(false)
        })
    }
}

fn section(payload: &JsonValue, key: &str) -> String {
    match payload.get(key) {
        Some(value) => format!("{}: {}\n", key, value),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use greenlight_interface::RecordStatus;
    use uuid::Uuid;

    fn record_with_map(map: JsonValue) -> GenerationRecord {
        GenerationRecord {
            id: Uuid::new_v4(),
            project_id: Uuid::new_v4(),
            status: RecordStatus::Queued,
            stage: None,
            substage: None,
            progress: 0,
            attempts: 0,
            heartbeat_at: None,
            stage_completion_map: map,
            payload: json!({}),
            error_code: None,
            error_detail: None,
            source_text: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn order_and_progress_are_monotonic() {
        let mut last = 0;
        for stage in StageId::ORDER {
            assert!(stage.progress_end() > last);
            last = stage.progress_end();
        }
        assert_eq!(last, 100);
    }

    #[test]
    fn first_pending_skips_done_stages() {
        let record = record_with_map(json!({
            "outline": {"done": true, "completed_at": "2026-02-01T09:00:00Z"},
        }));
        assert_eq!(
            StageId::first_pending(&record),
            Some(StageId::SceneBreakdown)
        );
    }

    #[test]
    fn all_stages_done_means_nothing_pending() {
        let record = record_with_map(json!({
            "outline": {"done": true},
            "scene_breakdown": {"done": true},
            "keyframes": {"done": true},
            "audio_design": {"done": true},
        }));
        assert_eq!(StageId::first_pending(&record), None);
    }

    #[test]
    fn stage_names_round_trip() {
        use std::str::FromStr;
        assert_eq!(StageId::SceneBreakdown.as_str(), "scene_breakdown");
        assert_eq!(
            StageId::from_str("audio_design").unwrap(),
            StageId::AudioDesign
        );
    }

    #[test]
    fn breakdown_prompt_carries_prior_stage_output() {
        let payload = json!({"logline": "A heist goes sideways.", "acts": []});
        let prompt = StageId::SceneBreakdown.user_prompt(&payload, Some("a short story"));
        assert!(prompt.contains("A heist goes sideways."));
        assert!(prompt.contains("a short story"));
    }
}
