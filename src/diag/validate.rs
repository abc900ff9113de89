//! Semantic validation of transport-successful responses.
//!
//! Relays return HTTP 200 for all kinds of broken payloads: HTML error
//! pages, SSE streams, JSON wrapped in log noise, JSON with an `error`
//! field. Recovery runs an ordered chain of parser strategies, then
//! endpoint-specific structural rules decide whether the 200 actually
//! means anything.

use crate::diag::catalog::EndpointKey;
use serde_json::Value;

type ParseStrategy = fn(&str) -> Option<Value>;

/// Recovery strategies, tried in order until one yields a value.
const STRATEGIES: &[ParseStrategy] = &[parse_direct, parse_sse_frames, parse_brace_slice];

/// Best-effort JSON extraction from a response body.
///
/// Direct parse first; then Server-Sent-Event frames, keeping the last
/// non-`[DONE]` object (streamed replies end with the complete frame);
/// then the outermost `{...}` slice for bodies with surrounding noise.
#[must_use]
pub fn parse_json_payload(body: &str) -> Option<Value> {
    let text = body.trim();
    if text.is_empty() {
        return None;
    }
    STRATEGIES.iter().find_map(|parse| parse(text))
}

fn parse_direct(text: &str) -> Option<Value> {
    serde_json::from_str(text).ok()
}

fn parse_sse_frames(text: &str) -> Option<Value> {
    let mut last = None;
    for raw_line in text.lines() {
        let Some(payload) = raw_line.trim().strip_prefix("data:") else {
            continue;
        };
        let payload = payload.trim();
        if payload.is_empty() || payload == "[DONE]" {
            continue;
        }
        if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(payload) {
            last = Some(value);
        }
    }
    last
}

fn parse_brace_slice(text: &str) -> Option<Value> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    match serde_json::from_str::<Value>(&text[start..=end]) {
        Ok(value @ Value::Object(_)) => Some(value),
        _ => None,
    }
}

/// Decide whether an HTTP-200 body is semantically valid for `key`.
///
/// # Errors
///
/// Returns the human-readable reason used to downgrade the outcome
/// (`"HTTP 200 but response content invalid: <reason>"` is assembled by
/// the dispatcher).
pub fn validate_success_body(key: EndpointKey, body: &str) -> std::result::Result<(), String> {
    let text = body.trim();
    if text.is_empty() {
        return Err("response body is empty".to_owned());
    }
    let Some(data) = parse_json_payload(text) else {
        return Err("response body is not valid JSON".to_owned());
    };

    // A populated error field voids the 200 regardless of structure.
    if let Some(error_value) = data.get("error")
        && !error_field_is_empty(error_value)
    {
        return Err("response contains an error field".to_owned());
    }

    match key {
        EndpointKey::Models | EndpointKey::Embeddings => {
            let data = require_object(&data)?;
            if data.get("data").is_some_and(Value::is_array) {
                Ok(())
            } else {
                Err("missing data list".to_owned())
            }
        }
        EndpointKey::ChatCompletions | EndpointKey::Completions => {
            let data = require_object(&data)?;
            if data.get("choices").is_some_and(Value::is_array) {
                return Ok(());
            }
            // Some providers omit choices on truncated replies but still
            // echo the request identity.
            if data.get("id").is_some_and(Value::is_string)
                && data.get("model").is_some_and(Value::is_string)
            {
                return Ok(());
            }
            Err("missing choices or id/model".to_owned())
        }
        EndpointKey::Responses => {
            let data = require_object(&data)?;
            if data.get("output").is_some_and(Value::is_array) {
                return Ok(());
            }
            if data
                .get("output_text")
                .and_then(Value::as_str)
                .is_some_and(|s| !s.trim().is_empty())
            {
                return Ok(());
            }
            const MARKER_KEYS: [&str; 5] = ["id", "object", "model", "status", "response"];
            if MARKER_KEYS.iter().any(|k| data.contains_key(*k)) {
                return Ok(());
            }
            Err("missing output/output_text or marker fields".to_owned())
        }
        EndpointKey::Moderations => {
            let data = require_object(&data)?;
            if data.get("results").is_some_and(Value::is_array) {
                Ok(())
            } else {
                Err("missing results list".to_owned())
            }
        }
        // No structural requirement beyond parsed-as-JSON without an error
        // field. Skip-only keys never reach validation in practice.
        _ => Ok(()),
    }
}

fn require_object(data: &Value) -> std::result::Result<&serde_json::Map<String, Value>, String> {
    data.as_object()
        .ok_or_else(|| "response is not a JSON object".to_owned())
}

/// `error: null`, `""`, `{}`, and `[]` do not count as errors.
fn error_field_is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}
