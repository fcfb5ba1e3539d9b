//! Value shape checks.
//!
//! Body values arrive typed and must already have the declared shape.
//! Header and query values arrive as strings and are parsed into the
//! declared shape. Diagnostics use serde's `invalid type` / `invalid value`
//! wording so they read the same as a typed deserialization failure.

use hermes_core::ValueShape;
use serde::de::{Error as _, Unexpected};
use serde_json::{Number, Value};

/// Returns a short name for the kind of a JSON value.
#[must_use]
pub fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Checks that a body value has the expected shape.
///
/// Returns the serde-style diagnostic on mismatch.
pub fn conform(shape: ValueShape, value: Value) -> Result<Value, String> {
    let matches = match shape {
        ValueShape::Any => true,
        ValueShape::String => value.is_string(),
        ValueShape::Integer => value.is_i64() || value.is_u64(),
        ValueShape::Number => value.is_number(),
        ValueShape::Boolean => value.is_boolean(),
        ValueShape::Array => value.is_array(),
        ValueShape::Object => value.is_object(),
    };

    if matches {
        Ok(value)
    } else {
        Err(invalid_type(shape, &value))
    }
}

/// Parses a header or query string into the expected shape.
pub fn conform_text(shape: ValueShape, text: &str) -> Result<Value, String> {
    match shape {
        ValueShape::Any | ValueShape::String => Ok(Value::String(text.to_string())),
        ValueShape::Integer => text
            .parse::<i64>()
            .map(Value::from)
            .or_else(|_| text.parse::<u64>().map(Value::from))
            .map_err(|_| invalid_value(shape, text)),
        ValueShape::Number => text
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| invalid_value(shape, text)),
        ValueShape::Boolean => match text {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err(invalid_value(shape, text)),
        },
        ValueShape::Array | ValueShape::Object => {
            let parsed: Value =
                serde_json::from_str(text).map_err(|_| invalid_value(shape, text))?;
            conform(shape, parsed)
        }
    }
}

/// Parses raw header bytes into the expected shape.
///
/// Bytes that are not UTF-8 are a mismatch, not an absent value.
pub fn conform_bytes(shape: ValueShape, bytes: &[u8]) -> Result<Value, String> {
    match std::str::from_utf8(bytes) {
        Ok(text) => conform_text(shape, text),
        Err(_) => {
            let expected = shape.to_string();
            Err(
                serde_json::Error::invalid_value(Unexpected::Bytes(bytes), &expected.as_str())
                    .to_string(),
            )
        }
    }
}

fn invalid_type(shape: ValueShape, value: &Value) -> String {
    let expected = shape.to_string();
    serde_json::Error::invalid_type(unexpected(value), &expected.as_str()).to_string()
}

fn invalid_value(shape: ValueShape, text: &str) -> String {
    let expected = shape.to_string();
    serde_json::Error::invalid_value(Unexpected::Str(text), &expected.as_str()).to_string()
}

fn unexpected(value: &Value) -> Unexpected<'_> {
    match value {
        Value::Null => Unexpected::Unit,
        Value::Bool(b) => Unexpected::Bool(*b),
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                Unexpected::Unsigned(u)
            } else if let Some(i) = n.as_i64() {
                Unexpected::Signed(i)
            } else {
                Unexpected::Float(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        Value::String(s) => Unexpected::Str(s),
        Value::Array(_) => Unexpected::Seq,
        Value::Object(_) => Unexpected::Map,
    }
}
