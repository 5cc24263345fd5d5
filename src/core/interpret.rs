//! Interpretation of raw model output.
//!
//! Model output is untrusted text that should contain one JSON object,
//! possibly wrapped in prose or markdown fences. The object is located,
//! decoded, and mapped onto [`ExtractedFields`] with every vocabulary field
//! normalized. Only a missing or undecodable object is an error.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};

use crate::adapters::ExtractionError;
use crate::domain::{ExtractedFields, Priority, Status};

/// Parse raw model output into extracted fields
pub fn interpret(raw_output: &str) -> Result<ExtractedFields, ExtractionError> {
    let span = json_span(raw_output)
        .ok_or_else(|| ExtractionError::Format("no JSON object found in model output".to_string()))?;

    let value: Value = serde_json::from_str(span)
        .map_err(|e| ExtractionError::Format(format!("invalid JSON in model output: {}", e)))?;

    let object = match value {
        Value::Object(map) => map,
        other => {
            return Err(ExtractionError::Format(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            )))
        }
    };

    Ok(ExtractedFields {
        title: text_field(&object, "title"),
        description: text_field(&object, "description"),
        priority: Priority::from_model_token(str_field(&object, "priority")),
        due_date: parse_due_date(str_field(&object, "dueDate")),
        status: Status::from_model_token(str_field(&object, "status")),
    })
}

/// Greedy span from the first `{` to the last `}`
fn json_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

fn str_field<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    object.get(key).and_then(Value::as_str)
}

/// Trimmed, non-empty string field; the literal `"null"` counts as absent
fn text_field(object: &Map<String, Value>, key: &str) -> Option<String> {
    str_field(object, key)
        .map(str::trim)
        .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("null"))
        .map(str::to_string)
}

/// Parse an ISO-8601 date.
///
/// Accepts `YYYY-MM-DD` (local midnight), a naive `YYYY-MM-DDTHH:MM:SS`
/// timestamp, or RFC 3339 (converted to local time). Anything else,
/// including the string `"null"`, is no date.
pub fn parse_due_date(raw: Option<&str>) -> Option<NaiveDateTime> {
    let raw = raw?.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("null") {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    if let Ok(datetime) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(datetime);
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Local).naive_local())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
