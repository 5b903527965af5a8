//! Recovery entry points for normalized model responses.
//!
//! Providers return structure either as a tool-call argument string or mixed
//! into plain text content. Both paths reuse the same recovery ladder; the
//! structured field is checked first since it is the stronger signal.

use crate::outcome::{fingerprint, ParseOutcome};
use crate::recover;
use greenlight_core::{GenerateResponse, ToolCall};
use tracing::debug;

/// Recover the argument payload of a tool call.
///
/// A tool-name mismatch is a parse failure, not an exception: the model
/// invoked something other than what the stage asked for, so the arguments
/// cannot be trusted to follow the expected schema.
pub fn recover_tool_arguments(call: &ToolCall, expected_tool: &str, label: &str) -> ParseOutcome {
    if call.name != expected_tool {
        let print = fingerprint(&call.arguments);
        debug!(
            label,
            expected = expected_tool,
            invoked = %call.name,
            fingerprint = %print,
            "tool name mismatch"
        );
        return ParseOutcome::exhausted(
            vec![format!(
                "TOOL_NAME_MISMATCH: expected '{}', model invoked '{}'",
                expected_tool, call.name
            )],
            print,
            None,
        );
    }

    recover(&call.arguments, label)
}

/// Recover structure from a normalized response.
///
/// Checks the tool-call field first, then falls back to text content. The
/// returned outcome carries warnings from the failed structured attempt so
/// nothing observed along the way is lost.
pub fn recover_response(
    response: &GenerateResponse,
    expected_tool: Option<&str>,
    label: &str,
) -> ParseOutcome {
    let mut carried = Vec::new();

    if let Some(call) = &response.tool_call {
        let outcome = match expected_tool {
            Some(expected) => recover_tool_arguments(call, expected, label),
            None => recover(&call.arguments, label),
        };
        if outcome.ok {
            return outcome;
        }
        carried.push(format!(
            "TOOL_ARGUMENTS_UNRECOVERABLE: {}",
            outcome.warnings.join("; ")
        ));
    }

    if let Some(text) = &response.text {
        let mut outcome = recover(text, label);
        if !carried.is_empty() {
            let mut warnings = carried;
            warnings.append(&mut outcome.warnings);
            outcome.warnings = warnings;
        }
        return outcome;
    }

    ParseOutcome::exhausted(
        {
            carried.push("EMPTY_INPUT".to_string());
            carried
        },
        fingerprint(""),
        None,
    )
}
