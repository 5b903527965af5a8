//! The recovery ladder.
//!
//! Passes run in order, each strictly more aggressive than the last, each
//! attempted only if the previous failed:
//!
//! 1. direct parse of the trimmed input
//! 2. markdown code-fence stripping
//! 3. balanced-structure extraction (object preferred, array fallback)
//! 4. artifact cleaning (smart quotes, NBSP, BOM, comma repairs)
//! 5. truncation repair (drop trailing fragment, balance delimiters)
//! 6. aggressive salvage (passes 2-5 composed)
//! 7. exhausted

use crate::outcome::{fingerprint, ParseOutcome, ParseStrategy};
use serde_json::Value as JsonValue;
use tracing::{debug, warn};

/// How much salvage text an exhausted outcome retains.
const SALVAGE_LIMIT: usize = 2048;

/// Recover one JSON structure from an arbitrary text blob.
///
/// Never panics and never returns an error: all failure modes are encoded in
/// the returned [`ParseOutcome`]. The `label` names the caller for log
/// correlation (a stage id, a tool name).
pub fn recover(raw: &str, label: &str) -> ParseOutcome {
    let print = fingerprint(raw);
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        debug!(label, fingerprint = %print, "recovery input empty");
        return ParseOutcome::exhausted(vec!["EMPTY_INPUT".to_string()], print, None);
    }

    let mut warnings = Vec::new();

    // Pass 1: direct parse.
    match serde_json::from_str::<JsonValue>(trimmed) {
        Ok(value) => return ParseOutcome::clean(value, print),
        Err(e) => warnings.push(format!("DIRECT_PARSE_FAILED: {}", terse(&e))),
    }

    // Pass 2: markdown fence stripping. A fenced block is an explicit signal
    // of intended structure, so it wins over ad-hoc brace scanning.
    if let Some(inner) = strip_code_fences(trimmed) {
        if let Ok(value) = serde_json::from_str::<JsonValue>(&inner) {
            warnings.push("CODE_FENCE_STRIPPED".to_string());
            return ParseOutcome::repaired(value, ParseStrategy::FenceStripped, warnings, print);
        }
    }

    // Pass 3: structure extraction.
    if let Some(candidate) = extract_structure(trimmed) {
        if let Ok(value) = serde_json::from_str::<JsonValue>(&candidate) {
            warnings.push("STRUCTURE_EXTRACTED".to_string());
            return ParseOutcome::repaired(
                value,
                ParseStrategy::StructureExtracted,
                warnings,
                print,
            );
        }
    }

    // Pass 4: artifact cleaning.
    let cleaned = clean_artifacts(trimmed);
    if cleaned != trimmed {
        if let Ok(value) = serde_json::from_str::<JsonValue>(&cleaned) {
            warnings.push("ARTIFACTS_CLEANED".to_string());
            return ParseOutcome::repaired(value, ParseStrategy::ArtifactCleaned, warnings, print);
        }
    }

    // Pass 5: truncation repair.
    if let Some(repaired) = repair_truncation(trimmed) {
        if let Ok(value) = serde_json::from_str::<JsonValue>(&repaired) {
            warnings.push("TRUNCATION_REPAIRED".to_string());
            return ParseOutcome::repaired(
                value,
                ParseStrategy::TruncationRepaired,
                warnings,
                print,
            );
        }
    }

    // Pass 6: aggressive salvage, composing every repair pass.
    let candidate = strip_code_fences(trimmed).unwrap_or_else(|| trimmed.to_string());
    let candidate = extract_structure(&candidate).unwrap_or(candidate);
    let candidate = clean_artifacts(&candidate);
    if let Ok(value) = serde_json::from_str::<JsonValue>(&candidate) {
        warnings.push("AGGRESSIVE_SALVAGE".to_string());
        return ParseOutcome::repaired(value, ParseStrategy::AggressiveSalvage, warnings, print);
    }
    if let Some(repaired) = repair_truncation(&candidate) {
        if let Ok(value) = serde_json::from_str::<JsonValue>(&repaired) {
            warnings.push("AGGRESSIVE_SALVAGE".to_string());
            warnings.push("TRUNCATION_REPAIRED".to_string());
            return ParseOutcome::repaired(
                value,
                ParseStrategy::AggressiveSalvage,
                warnings,
                print,
            );
        }
    }

    // Pass 7: exhausted.
    warnings.push("ALL_STRATEGIES_EXHAUSTED".to_string());
    warn!(
        label,
        fingerprint = %print,
        input_len = raw.len(),
        "recovery parser exhausted every strategy"
    );
    let mut salvage = candidate;
    if salvage.len() > SALVAGE_LIMIT {
        // Walk back to a char boundary; a raw byte cut can split a
        // multi-byte character and panic.
        let mut limit = SALVAGE_LIMIT;
        while !salvage.is_char_boundary(limit) {
            limit -= 1;
        }
        salvage.truncate(limit);
    }
    ParseOutcome::exhausted(warnings, print, Some(salvage))
}

/// Describe a serde error by category and position, never by content.
fn terse(err: &serde_json::Error) -> String {
    use serde_json::error::Category;
    let what = match err.classify() {
        Category::Io => "io error",
        Category::Syntax => "syntax error",
        Category::Data => "data error",
        Category::Eof => "unexpected end of input",
    };
    format!("{} at line {} column {}", what, err.line(), err.column())
}

/// Extract the contents of the first markdown code fence.
///
/// Handles ```json, bare ```, and a missing closing fence (truncated
/// responses routinely lose it).
fn strip_code_fences(input: &str) -> Option<String> {
    let start = input.find("```")?;
    let after_ticks = start + 3;
    // Skip an optional language tag up to the first newline.
    let content_start = input[after_ticks..]
        .find('\n')
        .map(|n| after_ticks + n + 1)
        .unwrap_or(after_ticks);

    match input[content_start..].find("```") {
        Some(end) => Some(input[content_start..content_start + end].trim().to_string()),
        // No closing fence: take everything to the end.
        None => Some(input[content_start..].trim().to_string()),
    }
}

/// Slice out the first top-level object or array structure.
///
/// Prefers whichever delimiter appears first. If the structure never closes,
/// the slice runs to end-of-input so the truncation pass can finish the job.
fn extract_structure(input: &str) -> Option<String> {
    let brace = input.find('{');
    let bracket = input.find('[');

    let start = match (brace, bracket) {
        (Some(b), Some(k)) => b.min(k),
        (Some(b), None) => b,
        (None, Some(k)) => k,
        (None, None) => return None,
    };

    let open = if Some(start) == brace { '{' } else { '[' };
    let close = if open == '{' { '}' } else { ']' };

    if let Some(balanced) = extract_balanced(&input[start..], open, close) {
        return Some(balanced);
    }

    // The preferred delimiter never balanced; fall through to the other kind
    // before resorting to an open-ended slice.
    let other = if open == '{' { bracket } else { brace };
    if let Some(pos) = other {
        let (o, c) = if open == '{' { ('[', ']') } else { ('{', '}') };
        if let Some(balanced) = extract_balanced(&input[pos..], o, c) {
            return Some(balanced);
        }
    }

    Some(input[start..].trim_end().to_string())
}

/// Extract content between balanced delimiters, honoring strings and escapes.
fn extract_balanced(input: &str, open: char, close: char) -> Option<String> {
    let start = input.find(open)?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, ch) in input[start..].char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }
        match ch {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            c if c == open && !in_string => depth += 1,
            c if c == close && !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(input[start..start + i + 1].to_string());
                }
            }
            _ => {}
        }
    }

    None
}

/// Normalize typography and punctuation artifacts models habitually emit.
///
/// Smart quotes and non-breaking spaces become their ASCII equivalents, the
/// BOM and stray control characters are dropped, trailing commas before a
/// closing delimiter are collapsed, and a missing comma between adjacent
/// object/array literals is inserted.
fn clean_artifacts(input: &str) -> String {
    // Character-level normalization first.
    let mut normalized = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '\u{feff}' => {}
            '\u{201c}' | '\u{201d}' => normalized.push('"'),
            '\u{2018}' | '\u{2019}' => normalized.push('\''),
            '\u{a0}' => normalized.push(' '),
            c if c.is_control() && c != '\n' && c != '\r' && c != '\t' => {}
            c => normalized.push(c),
        }
    }

    // Structural comma repairs, string-aware.
    let chars: Vec<char> = normalized.chars().collect();
    let mut out = String::with_capacity(normalized.len());
    let mut in_string = false;
    let mut escape_next = false;
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];

        if in_string {
            out.push(ch);
            if escape_next {
                escape_next = false;
            } else if ch == '\\' {
                escape_next = true;
            } else if ch == '"' {
                in_string = false;
            }
            i += 1;
            continue;
        }

        match ch {
            '"' => {
                in_string = true;
                out.push(ch);
            }
            ',' => {
                // Trailing comma: skip it when the next significant char closes.
                let mut j = i + 1;
                while j < chars.len() && chars[j].is_whitespace() {
                    j += 1;
                }
                if j < chars.len() && (chars[j] == '}' || chars[j] == ']') {
                    i += 1;
                    continue;
                }
                out.push(ch);
            }
            '{' | '[' => {
                // Missing comma between adjacent literals: `} {` or `] [`.
                if let Some(prev) = out.trim_end().chars().last() {
                    if prev == '}' || prev == ']' {
                        out.push(',');
                    }
                }
                out.push(ch);
            }
            c => out.push(c),
        }
        i += 1;
    }

    out
}

/// State from one structural scan of a candidate.
struct ScanState {
    /// Unclosed openers in encounter order
    stack: Vec<char>,
    /// Whether the scan ended inside a string literal
    in_string: bool,
    /// Byte index of the opening quote of the most recent string
    last_string_start: usize,
}

fn scan(input: &str) -> ScanState {
    let mut stack = Vec::new();
    let mut in_string = false;
    let mut escape_next = false;
    let mut last_string_start = 0;

    for (i, ch) in input.char_indices() {
        if in_string {
            if escape_next {
                escape_next = false;
            } else if ch == '\\' {
                escape_next = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => {
                in_string = true;
                last_string_start = i;
            }
            '{' | '[' => stack.push(ch),
            '}' => {
                if stack.last() == Some(&'{') {
                    stack.pop();
                }
            }
            ']' => {
                if stack.last() == Some(&'[') {
                    stack.pop();
                }
            }
            _ => {}
        }
    }

    ScanState {
        stack,
        in_string,
        last_string_start,
    }
}

/// Repair a heuristically-detected truncation.
///
/// Detection: the input ends mid-string, with a dangling comma or colon, or
/// with unclosed delimiters. Repair: drop the trailing incomplete fragment
/// (incomplete key, incomplete value, dangling separator), balance any
/// unterminated quote, then append closers in reverse-open order — which
/// closes brackets before braces, since arrays nest inside objects.
fn repair_truncation(input: &str) -> Option<String> {
    let trimmed = input.trim_end();
    let first = trimmed.chars().next()?;
    if first != '{' && first != '[' {
        return None;
    }

    let state = scan(trimmed);
    let dangling = trimmed.ends_with(',') || trimmed.ends_with(':');
    if !state.in_string && state.stack.is_empty() && !dangling {
        return None;
    }

    let mut out = trimmed.to_string();

    // An unterminated string is an incomplete key or value: drop it whole.
    if state.in_string {
        out.truncate(state.last_string_start);
    }

    // Peel trailing fragments until the tail is a complete token.
    loop {
        out.truncate(out.trim_end().len());

        if out.ends_with(',') {
            out.pop();
            continue;
        }

        if out.ends_with(':') {
            // The key before this colon never got a value; remove both.
            out.pop();
            out.truncate(out.trim_end().len());
            if out.ends_with('"') {
                let tail = scan(&out);
                out.truncate(tail.last_string_start);
            }
            continue;
        }

        // A closed string at the tail of an object with no colon after it is
        // a dangling key.
        if out.ends_with('"') {
            let tail = scan(&out);
            if tail.stack.last() == Some(&'{') {
                let before = out[..tail.last_string_start].trim_end();
                if before.ends_with(',') || before.ends_with('{') {
                    out.truncate(tail.last_string_start);
                    continue;
                }
            }
        }

        break;
    }

    out.truncate(out.trim_end().len());
    if out.is_empty() {
        return None;
    }

    let final_state = scan(&out);
    if final_state.in_string {
        out.push('"');
    }
    for opener in final_state.stack.iter().rev() {
        out.push(if *opener == '{' { '}' } else { ']' });
    }

    Some(out)
}
