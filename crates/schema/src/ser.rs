//! Canonical textual encoding of [`Value`]s.
//!
//! This is a direct recursive writer, not a serde backend: response-body
//! formatting depends on its exact output shape. The encoding is readable by
//! any JSON parser; mapping keys keep insertion order.

use thiserror::Error;

use crate::value::Value;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SerializeError {
    /// NaN and infinities have no canonical literal form.
    #[error("number `{value}` has no canonical literal form")]
    NonFiniteNumber { value: String },
}

/// Encodes a value into its canonical textual form.
pub fn to_string(value: &Value) -> Result<String, SerializeError> {
    let mut out = String::new();
    write_value(&mut out, value)?;
    Ok(out)
}

/// Encodes a value into canonical bytes, ready for a transport.
pub fn to_bytes(value: &Value) -> Result<Vec<u8>, SerializeError> {
    to_string(value).map(String::into_bytes)
}

fn write_value(out: &mut String, value: &Value) -> Result<(), SerializeError> {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(true) => out.push_str("true"),
        Value::Bool(false) => out.push_str("false"),
        Value::Int(i) => out.push_str(&i.to_string()),
        Value::Float(f) => write_float(out, *f)?,
        Value::Str(s) => write_quoted(out, s),
        Value::List(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_value(out, item)?;
            }
            out.push(']');
        }
        Value::Map(map) => write_entries(out, map.iter().map(|(k, v)| (k.as_str(), v)))?,
        Value::DateTime(dt) => write_quoted(out, &dt.to_rfc3339()),
        Value::Model(model) => write_entries(out, model.iter())?,
    }
    Ok(())
}

fn write_entries<'a>(
    out: &mut String,
    entries: impl Iterator<Item = (&'a str, &'a Value)>,
) -> Result<(), SerializeError> {
    out.push('{');
    for (i, (key, value)) in entries.enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_quoted(out, key);
        out.push_str(": ");
        write_value(out, value)?;
    }
    out.push('}');
    Ok(())
}

fn write_float(out: &mut String, f: f64) -> Result<(), SerializeError> {
    if !f.is_finite() {
        return Err(SerializeError::NonFiniteNumber { value: f.to_string() });
    }
    if f.fract() == 0.0 {
        // keep the trailing `.0` so the literal stays a float
        out.push_str(&format!("{f:.1}"));
    } else {
        out.push_str(&f.to_string());
    }
    Ok(())
}

fn write_quoted(out: &mut String, s: &str) {
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            // control characters would corrupt the quoted form
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
}
