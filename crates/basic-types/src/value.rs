use serde::{Deserialize, Serialize};
use std::fmt;

/// A dynamically typed BASIC value.
///
/// There is no boolean type. Relational and logical operators produce
/// `Number(1.0)` or `Number(0.0)`, and any number greater than zero is true.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Value {
    Number(f64),
    Text(String),
}

impl Value {
    /// Truthy encoding of a boolean.
    pub fn from_bool(b: bool) -> Self {
        Value::Number(if b { 1.0 } else { 0.0 })
    }

    /// Concrete kind name, used in coercion errors.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Text(_) => "text",
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            Value::Number(_) => None,
        }
    }

    /// `true` for numbers greater than zero. Text is never truthy.
    pub fn is_truthy(&self) -> bool {
        matches!(self, Value::Number(n) if *n > 0.0)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => f.write_str(&format_number(*n)),
            Value::Text(s) => f.write_str(s),
        }
    }
}

/// Console rendering of a number: integral values print without a
/// fractional part, negative zero prints as `0`.
pub fn format_number(n: f64) -> String {
    if n == 0.0 {
        return "0".to_string();
    }
    format!("{n}")
}

/// Names ending in `$` hold text; every other name holds a number.
pub fn is_text_name(name: &str) -> bool {
    name.ends_with('$')
}
