//! Helpers for pulling typed values out of raw JSON payloads

use chrono::NaiveDateTime;
use serde_json::Value;

use super::ValidationError;

/// Look up a required key; null counts as missing
pub fn require<'a>(object: &'a Value, field: &'static str) -> Result<&'a Value, ValidationError> {
    match object.get(field) {
        None | Some(Value::Null) => Err(ValidationError::Missing { field }),
        Some(value) => Ok(value),
    }
}

/// A required string value
pub fn string<'a>(value: &'a Value, field: &'static str) -> Result<&'a str, ValidationError> {
    match value {
        Value::Null => Err(ValidationError::Missing { field }),
        Value::String(s) => Ok(s),
        _ => Err(ValidationError::WrongType {
            field,
            expected: "a string",
        }),
    }
}

/// A required string that is not blank
pub fn non_empty(value: &Value, field: &'static str) -> Result<String, ValidationError> {
    let s = string(value, field)?;
    if s.trim().is_empty() {
        return Err(ValidationError::invalid(field, "value is empty"));
    }
    Ok(s.to_string())
}

/// A number, or a string holding one
pub fn number(value: &Value, field: &'static str) -> Result<f64, ValidationError> {
    let parsed = match value {
        Value::Null => return Err(ValidationError::Missing { field }),
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(n) if n.is_finite() => Ok(n),
        _ => Err(ValidationError::WrongType {
            field,
            expected: "a number",
        }),
    }
}

/// Parse a timestamp and reject any moment after `now`
pub fn past_timestamp(
    value: &Value,
    field: &'static str,
    format: &str,
    now: NaiveDateTime,
) -> Result<NaiveDateTime, ValidationError> {
    let raw = string(value, field)?;
    let parsed = NaiveDateTime::parse_from_str(raw, format)
        .map_err(|e| ValidationError::invalid(field, format!("{:?} does not match {:?}: {}", raw, format, e)))?;
    if parsed > now {
        return Err(ValidationError::invalid(field, format!("{} is in the future", parsed)));
    }
    Ok(parsed)
}

/// Round to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
