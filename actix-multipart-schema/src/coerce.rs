use serde_json::{Number, Value};

use crate::schema::SchemaType;

/// Convert a raw text value into a typed JSON value.
///
/// With a declared schema type the value is converted to that type; without
/// one the type is inferred from the string's shape. Conversion never fails:
/// anything that does not parse cleanly degrades to the original string, so
/// one malformed field cannot abort the request.
pub fn coerce(raw: &str, kind: Option<SchemaType>) -> Value {
    let kind = kind.or_else(|| infer_kind(raw));

    match kind {
        Some(SchemaType::Number) | Some(SchemaType::Integer) => {
            parse_number(raw).unwrap_or_else(|| Value::String(raw.to_owned()))
        }
        Some(SchemaType::Boolean) => Value::Bool(raw == "true" || raw == "1"),
        Some(SchemaType::Object) | Some(SchemaType::Array) => {
            match serde_json::from_str::<Value>(raw) {
                Ok(value) if !is_falsy(&value) => value,
                _ => Value::String(raw.to_owned()),
            }
        }
        Some(SchemaType::String) | None => Value::String(raw.to_owned()),
    }
}

fn infer_kind(raw: &str) -> Option<SchemaType> {
    if raw == "true" || raw == "false" {
        Some(SchemaType::Boolean)
    } else if is_integer_literal(raw) {
        Some(SchemaType::Integer)
    } else if is_decimal_literal(raw) {
        Some(SchemaType::Number)
    } else if (raw.starts_with('[') || raw.starts_with('{'))
        && serde_json::from_str::<Value>(raw).is_ok()
    {
        Some(SchemaType::Object)
    } else {
        None
    }
}

/// `^-?\d+$`
fn is_integer_literal(raw: &str) -> bool {
    let digits = raw.strip_prefix('-').unwrap_or(raw);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// `^-?\d+\.?\d*$`
fn is_decimal_literal(raw: &str) -> bool {
    let rest = raw.strip_prefix('-').unwrap_or(raw);
    let (int_part, frac_part) = match rest.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part),
        None => (rest, ""),
    };
    !int_part.is_empty()
        && int_part.bytes().all(|b| b.is_ascii_digit())
        && frac_part.bytes().all(|b| b.is_ascii_digit())
}

/// Integral input stays integral; everything else becomes a float as long
/// as it is finite.
fn parse_number(raw: &str) -> Option<Value> {
    let trimmed = raw.trim();
    if let Ok(int) = trimmed.parse::<i64>() {
        return Some(Value::Number(int.into()));
    }
    trimmed
        .parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
}

/// The host-language notion of falsiness a decoded JSON value can hit:
/// null, false, zero or the empty string.
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}
