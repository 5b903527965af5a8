//! Stage-specific structural validation of recovered values.
//!
//! Strict stages (identifier-only schemas) reject missing identifier fields
//! and empty arrays; the rejection flows back to the fallback chain as a
//! malformed response, not a stage failure. Prose-bearing stages get
//! presence/type checks only, never content-quality checks.

use crate::stage::StageId;
use serde_json::Value as JsonValue;

/// Check a recovered value against a stage's structural expectations.
///
/// Returns every problem found, so the log line for a rejection names all of
/// them at once instead of one per model attempt.
pub fn validate(stage: StageId, value: &JsonValue) -> Result<(), Vec<String>> {
    let mut problems = Vec::new();

    let Some(object) = value.as_object() else {
        return Err(vec![format!("{}: top-level value is not an object", stage)]);
    };

    match stage {
        StageId::Outline => {
            if !object.get("logline").is_some_and(JsonValue::is_string) {
                problems.push("outline: missing string field 'logline'".to_string());
            }
            if !object.get("acts").is_some_and(JsonValue::is_array) {
                problems.push("outline: missing array field 'acts'".to_string());
            }
        }
        StageId::SceneBreakdown => {
            if !object.get("scenes").is_some_and(JsonValue::is_array) {
                problems.push("scene_breakdown: missing array field 'scenes'".to_string());
            }
        }
        StageId::Keyframes => validate_keyframes(object, &mut problems),
        StageId::AudioDesign => {
            if !object.get("layers").is_some_and(JsonValue::is_array) {
                problems.push("audio_design: missing array field 'layers'".to_string());
            }
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(problems)
    }
}

/// Strict identifier-only schema: frames must be present, non-empty, and
/// every frame must carry its identifier fields.
fn validate_keyframes(
    object: &serde_json::Map<String, JsonValue>,
    problems: &mut Vec<String>,
) {
    let Some(frames) = object.get("frames").and_then(JsonValue::as_array) else {
        problems.push("keyframes: missing array field 'frames'".to_string());
        return;
    };

    if frames.is_empty() {
        problems.push("keyframes: 'frames' is empty".to_string());
        return;
    }

    for (index, frame) in frames.iter().enumerate() {
        for field in ["code", "scene_code", "image_prompt"] {
            let present = frame
                .get(field)
                .and_then(JsonValue::as_str)
                .is_some_and(|s| !s.trim().is_empty());
            if !present {
                problems.push(format!(
                    "keyframes: frame {} missing non-empty string '{}'",
                    index, field
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn prose_stage_accepts_presence_and_type() {
        let value = json!({"logline": "A heist goes sideways.", "acts": [], "extra": 1});
        assert!(validate(StageId::Outline, &value).is_ok());
    }

    #[test]
    fn prose_stage_rejects_wrong_type() {
        let value = json!({"logline": 42, "acts": []});
        let problems = validate(StageId::Outline, &value).unwrap_err();
        assert_eq!(problems.len(), 1);
        assert!(problems[0].contains("logline"));
    }

    #[test]
    fn strict_stage_rejects_empty_frames() {
        let value = json!({"frames": []});
        let problems = validate(StageId::Keyframes, &value).unwrap_err();
        assert!(problems[0].contains("empty"));
    }

    #[test]
    fn strict_stage_rejects_missing_identifiers() {
        let value = json!({"frames": [
            {"code": "KF-01", "scene_code": "SC-01", "image_prompt": "vault door"},
            {"code": "", "scene_code": "SC-02", "image_prompt": "rooftop"},
        ]});
        let problems = validate(StageId::Keyframes, &value).unwrap_err();
        assert_eq!(problems.len(), 1);
        assert!(problems[0].contains("frame 1"));
    }

    #[test]
    fn strict_stage_accepts_complete_frames() {
        let value = json!({"frames": [
            {"code": "KF-01", "scene_code": "SC-01", "image_prompt": "vault door"},
        ]});
        assert!(validate(StageId::Keyframes, &value).is_ok());
    }

    #[test]
    fn non_object_is_always_rejected() {
        assert!(validate(StageId::AudioDesign, &json!([1, 2, 3])).is_err());
    }
}
