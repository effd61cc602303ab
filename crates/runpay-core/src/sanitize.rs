//! Masking of sensitive fields before payment events are logged

use serde_json::{Map, Value};

/// Fields whose values never reach logs in full
pub const SENSITIVE_FIELDS: &[&str] = &["token", "hash", "customerEmail", "customerPhone", "mobileNumber"];

/// Characters kept from the front of a long sensitive value
pub const VISIBLE_PREFIX: usize = 4;

const TRUNCATED_MARKER: &str = "...";
const MASKED: &str = "***";

/// Mask sensitive fields of a log payload
///
/// Values longer than [`VISIBLE_PREFIX`] characters keep their prefix
/// followed by `...`; shorter values become `***`. Non-string scalars are
/// masked by their textual form, `null` is left alone.
#[must_use]
pub fn sanitize_log_data(data: &Map<String, Value>) -> Map<String, Value> {
    data.iter()
        .map(|(key, value)| {
            let value = if SENSITIVE_FIELDS.contains(&key.as_str()) {
                mask_value(value)
            } else {
                value.clone()
            };
            (key.clone(), value)
        })
        .collect()
}

/// Convenience wrapper for any JSON value; non-objects pass through
#[must_use]
pub fn sanitize_log_value(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(sanitize_log_data(map)),
        other => other.clone(),
    }
}

fn mask_value(value: &Value) -> Value {
    let text = match value {
        Value::Null => return Value::Null,
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    Value::String(mask(&text))
}

fn mask(text: &str) -> String {
    if text.chars().count() > VISIBLE_PREFIX {
        let prefix: String = text.chars().take(VISIBLE_PREFIX).collect();
        format!("{prefix}{TRUNCATED_MARKER}")
    } else {
        MASKED.to_string()
    }
}
