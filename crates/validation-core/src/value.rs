//! Dynamic record representation.
//!
//! Records arrive as untyped JSON; the validator needs to distinguish
//! integers from floats and booleans from both, which `serde_json::Value`
//! alone does not surface cleanly. `Value` is the tagged variant the
//! validator actually dispatches on.

use indexmap::IndexMap;
use std::fmt;

/// A dynamically typed value, preserving field insertion order for objects.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Double(f64),
    String(String),
    Array(Vec<Value>),
    Object(IndexMap<String, Value>),
}

impl Value {
    /// Runtime type tag used in "incorrect data type" findings.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Double(_) => "double",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    pub fn as_object(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Object(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// A short, truncation-friendly display form used when a finding embeds
    /// a record value (`received` fields are always capped at 50 chars).
    pub fn display(&self) -> String {
        match self {
            Value::Null => "None".to_string(),
            Value::Bool(true) => "True".to_string(),
            Value::Bool(false) => "False".to_string(),
            Value::Int(i) => i.to_string(),
            Value::Double(d) => format_double(*d),
            Value::String(s) => s.clone(),
            Value::Array(items) => {
                let rendered: Vec<String> = items.iter().map(Value::display).collect();
                format!("[{}]", rendered.join(", "))
            }
            Value::Object(map) => {
                let rendered: Vec<String> = map
                    .iter()
                    .map(|(k, v)| format!("{}: {}", k, v.display()))
                    .collect();
                format!("{{{}}}", rendered.join(", "))
            }
        }
    }

    /// `display()` truncated to `max_chars` characters (char-boundary safe).
    pub fn display_truncated(&self, max_chars: usize) -> String {
        truncate_chars(&self.display(), max_chars)
    }
}

/// Truncate a string to at most `max_chars` Unicode scalar values.
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

fn format_double(d: f64) -> String {
    if d.fract() == 0.0 && d.is_finite() {
        format!("{:.1}", d)
    } else {
        format!("{}", d)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Value::Int(u as i64)
                } else {
                    Value::Double(n.as_f64().unwrap_or(0.0))
                }
            }
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                let mut out = IndexMap::with_capacity(map.len());
                for (k, v) in map {
                    out.insert(k, Value::from(v));
                }
                Value::Object(out)
            }
        }
    }
}
