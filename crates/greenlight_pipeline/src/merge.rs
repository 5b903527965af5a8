//! Additive payload merge and the completion ledger.

use chrono::{DateTime, Utc};
use serde_json::{json, Value as JsonValue};

/// Merge a stage's recovered fields into the accumulated payload.
///
/// Top-level fields from the new value are added or replace same-named
/// previous fields; unrelated existing fields are preserved. The payload is
/// never overwritten wholesale.
pub fn merge_payload(existing: &JsonValue, incoming: &JsonValue) -> JsonValue {
    let mut merged = match existing.as_object() {
        Some(map) => map.clone(),
        None => serde_json::Map::new(),
    };

    if let Some(incoming) = incoming.as_object() {
        for (key, value) in incoming {
            merged.insert(key.clone(), value.clone());
        }
    }

    JsonValue::Object(merged)
}

/// Mark one stage done in the completion ledger, preserving other entries.
pub fn mark_stage_done(map: &JsonValue, stage: &str, now: DateTime<Utc>) -> JsonValue {
    let mut entries = match map.as_object() {
        Some(entries) => entries.clone(),
        None => serde_json::Map::new(),
    };

    entries.insert(
        stage.to_string(),
        json!({"done": true, "completed_at": now.to_rfc3339()}),
    );

    JsonValue::Object(entries)
}
