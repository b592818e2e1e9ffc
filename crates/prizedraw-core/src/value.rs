// Scalar values produced by field coercion.
//
// The loader recognises exactly two numeric shapes: an unsigned run of ASCII
// digits and `digits.digits`. Everything else (signs, exponents, leading or
// trailing dots) stays text.

use serde::Serialize;
use std::fmt;

/// One coerced CSV field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Value {
    /// Coerce an already-trimmed field.
    ///
    /// Priority: integer, then decimal, then text. A digit run too long for
    /// `i64` is still numeric and becomes a float.
    pub fn coerce(raw: &str) -> Value {
        if is_digits(raw) {
            return match raw.parse::<i64>() {
                Ok(n) => Value::Integer(n),
                Err(_) => raw
                    .parse::<f64>()
                    .map(Value::Float)
                    .unwrap_or_else(|_| Value::Text(raw.to_string())),
            };
        }

        if let Some((whole, frac)) = raw.split_once('.') {
            if is_digits(whole) && is_digits(frac) {
                if let Ok(f) = raw.parse::<f64>() {
                    return Value::Float(f);
                }
            }
        }

        Value::Text(raw.to_string())
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(*n as f64),
            Value::Float(f) => Some(*f),
            Value::Text(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        !matches!(self, Value::Text(_))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Text(s) => f.write_str(s),
        }
    }
}

/// Non-empty and ASCII digits only.
fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}
