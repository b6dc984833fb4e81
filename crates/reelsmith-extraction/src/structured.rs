//! Resilient structured-output parser.
//!
//! Generator output is decoded with a fixed recovery ladder. Each rung runs
//! only when every earlier rung failed, and quote repair always runs on
//! structurally repaired text because it assumes balanced delimiters.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use reelsmith_utils::error::ParseError;

use crate::repair::{first_balanced_object, quote_bare_keys, strip_fences, structural_repair};

/// Characters of context kept on each side of a failure position.
pub const SNIPPET_RADIUS: usize = 50;

/// Rung of the recovery ladder that produced a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Recovery {
    /// Parsed as-is once fences were stripped.
    Strict,
    /// Needed trailing-comma, control-character or truncation repair.
    StructuralRepair,
    /// Needed bare keys quoted.
    QuotedKeys,
    /// Parsed from the first balanced `{...}` span.
    BalancedSpan,
}

/// Parse generator text into a JSON value, recovering what can be recovered.
///
/// # Errors
///
/// Returns [`ParseError`] positioned at the first strict decode failure when
/// every rung fails.
///
/// # Example
///
/// ```rust
/// use reelsmith_extraction::parse_structured;
///
/// let value = parse_structured("```json\n{\"title\": \"Limits\",}\n```").unwrap();
/// assert_eq!(value["title"], "Limits");
/// ```
pub fn parse_structured(raw: &str) -> Result<Value, ParseError> {
    parse_with_recovery(raw).map(|(value, _)| value)
}

/// Like [`parse_structured`], also reporting which rung succeeded.
///
/// # Errors
///
/// Same as [`parse_structured`].
pub fn parse_with_recovery(raw: &str) -> Result<(Value, Recovery), ParseError> {
    let text = strip_fences(raw);

    let first_failure = match serde_json::from_str::<Value>(text) {
        Ok(value) => return Ok((value, Recovery::Strict)),
        Err(err) => err,
    };

    let repaired = structural_repair(text);
    if let Ok(value) = serde_json::from_str::<Value>(&repaired) {
        debug!(recovery = %Recovery::StructuralRepair, "Recovered structured output");
        return Ok((value, Recovery::StructuralRepair));
    }

    let quoted = quote_bare_keys(&repaired);
    if let Ok(value) = serde_json::from_str::<Value>(&quoted) {
        debug!(recovery = %Recovery::QuotedKeys, "Recovered structured output");
        return Ok((value, Recovery::QuotedKeys));
    }

    if let Some(span) = first_balanced_object(text) {
        let value = serde_json::from_str::<Value>(span)
            .or_else(|_| serde_json::from_str::<Value>(&quote_bare_keys(&structural_repair(span))));
        if let Ok(value) = value {
            debug!(recovery = %Recovery::BalancedSpan, "Recovered structured output");
            return Ok((value, Recovery::BalancedSpan));
        }
    }

    Err(parse_error(text, &first_failure))
}

/// Parse generator text into a typed record.
///
/// The target type is the shape hint: text that parses but does not fit `T`
/// fails the same way unparseable text does.
///
/// # Errors
///
/// Returns [`ParseError`] when the ladder fails or the value does not fit `T`.
pub fn parse_record<T: DeserializeOwned>(raw: &str) -> Result<T, ParseError> {
    let value = parse_structured(raw)?;
    serde_json::from_value(value).map_err(|err| ParseError {
        message: format!("value does not match the expected shape: {err}"),
        line: err.line(),
        column: err.column(),
        offset: 0,
        snippet: snippet_around(strip_fences(raw), 0),
    })
}

fn parse_error(text: &str, err: &serde_json::Error) -> ParseError {
    let offset = offset_of(text, err.line(), err.column());
    ParseError {
        message: err.to_string(),
        line: err.line(),
        column: err.column(),
        offset,
        snippet: snippet_around(text, offset),
    }
}

/// Byte offset of a 1-based line and column reported by `serde_json`.
fn offset_of(text: &str, line: usize, column: usize) -> usize {
    let line_start: usize = text
        .split_inclusive('\n')
        .take(line.saturating_sub(1))
        .map(str::len)
        .sum();
    let mut offset = (line_start + column.saturating_sub(1)).min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

/// At most [`SNIPPET_RADIUS`] characters on each side of `offset`.
fn snippet_around(text: &str, offset: usize) -> String {
    let before: Vec<char> = text[..offset].chars().rev().take(SNIPPET_RADIUS).collect();
    let after = text[offset..].chars().take(SNIPPET_RADIUS);
    before.into_iter().rev().chain(after).collect()
}
