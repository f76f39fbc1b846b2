//! Response expectations shared by the suites

use serde_json::Value;

use super::{Outcome, Verdict};
use crate::http::ApiResponse;

/// Expect an error response with `status` and an `error` field, optionally
/// containing `needle` (case-insensitive)
pub fn error_response(resp: &ApiResponse, status: u16, needle: Option<&str>) -> Outcome {
    if resp.status != status {
        return Ok(Verdict::fail(format!(
            "Expected {}, got {}: {}",
            status,
            resp.status,
            resp.preview(200)
        )));
    }

    let data = resp.json()?;
    let Some(error) = data.get("error").and_then(Value::as_str) else {
        return Ok(Verdict::fail(format!(
            "Missing error message in {status} response"
        )));
    };

    if let Some(needle) = needle {
        if !error.to_lowercase().contains(&needle.to_lowercase()) {
            return Ok(Verdict::fail(format!("Unexpected error: {error}")));
        }
    }

    Ok(Verdict::pass(format!("Correctly returned {status}: {error}")))
}

/// Expect a 2xx response whose `success` flag, when present, is not false
pub fn accepted(resp: &ApiResponse, message: impl Into<String>) -> Outcome {
    if !resp.is_success() {
        return Ok(unexpected(resp));
    }

    let data = resp.json()?;
    if data.get("success").and_then(Value::as_bool) == Some(false) {
        return Ok(Verdict::fail(format!("Request rejected: {data}")));
    }

    Ok(Verdict::pass(message).with_response(data))
}

/// Failure for a status the probe did not expect
pub fn unexpected(resp: &ApiResponse) -> Verdict {
    Verdict::fail(format!("HTTP {}: {}", resp.status, resp.preview(200)))
}

/// Keys absent from a JSON object
pub fn missing<'a>(data: &Value, keys: &[&'a str]) -> Vec<&'a str> {
    keys.iter()
        .copied()
        .filter(|k| data.get(*k).is_none())
        .collect()
}

pub fn flag(data: &Value, key: &str) -> bool {
    data.get(key).and_then(Value::as_bool).unwrap_or(false)
}

/// Display a scalar for a message, `N/A` when absent or null
pub fn show(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "N/A".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => match n.as_f64() {
            Some(f) if f.fract() != 0.0 => format!("{f:.0}"),
            _ => n.to_string(),
        },
        Some(other) => other.to_string(),
    }
}

pub fn count(data: &Value, key: &str) -> u64 {
    data.get(key).and_then(Value::as_u64).unwrap_or(0)
}

pub fn array_len(data: &Value, key: &str) -> Option<usize> {
    data.get(key).and_then(Value::as_array).map(Vec::len)
}
