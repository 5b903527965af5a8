//! The result type of a recovery attempt.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sha2::{Digest, Sha256};

/// Which pass of the recovery ladder produced the value.
///
/// Ordered from least to most aggressive; anything past `Direct` marks the
/// outcome as degraded.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ParseStrategy {
    /// The trimmed input parsed as-is
    Direct,
    /// Parsed after removing markdown code-fence delimiters
    FenceStripped,
    /// Parsed after slicing out the first object/array structure
    StructureExtracted,
    /// Parsed after normalizing quotes, spaces, and comma artifacts
    ArtifactCleaned,
    /// Parsed after dropping a trailing fragment and balancing delimiters
    TruncationRepaired,
    /// Parsed only after composing every repair pass
    AggressiveSalvage,
    /// No pass produced a parseable value
    Exhausted,
}

/// The outcome of one recovery attempt. Transient, never persisted.
///
/// `degraded == true` means a repair strategy was needed; treat the value as
/// lower-confidence. `fingerprint` is a short hash of the original input for
/// correlating log lines without ever logging the content itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseOutcome {
    /// Whether a value was recovered
    pub ok: bool,
    /// The recovered value, when `ok`
    pub value: Option<JsonValue>,
    /// Whether a repair strategy was required
    pub degraded: bool,
    /// The pass that settled the outcome
    pub strategy: ParseStrategy,
    /// Human-readable notes from each failed or repairing pass
    pub warnings: Vec<String>,
    /// Short content hash of the original input
    pub fingerprint: String,
    /// Best candidate text when every pass failed, for offline inspection
    pub salvage: Option<String>,
}

impl ParseOutcome {
    /// A clean, non-degraded success from the direct pass.
    pub(crate) fn clean(value: JsonValue, fingerprint: String) -> Self {
        Self {
            ok: true,
            value: Some(value),
            degraded: false,
            strategy: ParseStrategy::Direct,
            warnings: Vec::new(),
            fingerprint,
            salvage: None,
        }
    }

    /// A success recovered through a repair strategy.
    pub(crate) fn repaired(
        value: JsonValue,
        strategy: ParseStrategy,
        warnings: Vec<String>,
        fingerprint: String,
    ) -> Self {
        Self {
            ok: true,
            value: Some(value),
            degraded: true,
            strategy,
            warnings,
            fingerprint,
            salvage: None,
        }
    }

    /// Every pass failed.
    pub(crate) fn exhausted(
        warnings: Vec<String>,
        fingerprint: String,
        salvage: Option<String>,
    ) -> Self {
        Self {
            ok: false,
            value: None,
            degraded: true,
            strategy: ParseStrategy::Exhausted,
            warnings,
            fingerprint,
            salvage,
        }
    }
}

/// Short hash of input text for log correlation.
///
/// Twelve hex characters of SHA-256; collisions are acceptable here, the
/// point is cross-referencing log lines without echoing untrusted content.
pub(crate) fn fingerprint(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    digest
        .iter()
        .take(6)
        .map(|byte| format!("{:02x}", byte))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_short_and_stable() {
        let a = fingerprint("{\"x\":1}");
        let b = fingerprint("{\"x\":1}");
        assert_eq!(a, b);
        assert_eq!(a.len(), 12);
        assert_ne!(a, fingerprint("{\"x\":2}"));
    }
}
