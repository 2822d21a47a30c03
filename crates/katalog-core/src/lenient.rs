//! Forgiving field decoders for loosely-typed JSON.
//!
//! The remote feed sends every field as a string, while hand-written payloads
//! tend to use numbers. These helpers accept either and turn anything else
//! into `None` instead of failing the whole document.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Decodes an integer given as a JSON number or a numeric string.
///
/// # Errors
///
/// Only fails if the input is not valid JSON for the underlying deserializer.
pub fn int_or_numeric_string<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(value_as_i64))
}

/// Decodes a string, rendering JSON numbers as their text form.
///
/// # Errors
///
/// Only fails if the input is not valid JSON for the underlying deserializer.
pub fn text_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(value_as_text))
}

#[must_use]
pub fn value_as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

#[must_use]
pub fn value_as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
