//! Field lookup and type coercion for raw rows

use serde_json::{Map, Value};

/// A single field value borrowed from a raw row
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldRef<'a> {
    Json(&'a Value),
    Text(&'a str),
}

/// One row of a raw payload
#[derive(Debug, Clone, Copy)]
pub enum RawRow<'a> {
    Object(&'a Map<String, Value>),
    Delimited {
        headers: &'a [String],
        values: &'a [String],
    },
}

impl<'a> RawRow<'a> {
    pub fn get(&self, name: &str) -> Option<FieldRef<'a>> {
        match *self {
            RawRow::Object(map) => map.get(name).map(FieldRef::Json),
            RawRow::Delimited { headers, values } => headers
                .iter()
                .position(|h| h == name)
                .and_then(|i| values.get(i))
                .map(|v| FieldRef::Text(v.as_str())),
        }
    }
}

/// How a destination column is filled from a raw row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnAlias {
    /// Destination column name
    pub column: &'static str,
    /// Field name used by the upstream API
    pub upstream: &'static str,
}

impl ColumnAlias {
    pub const fn new(column: &'static str, upstream: &'static str) -> Self {
        Self { column, upstream }
    }

    /// Find the field under its upstream name, falling back to the column name
    pub fn lookup<'a>(&self, row: &RawRow<'a>) -> Option<FieldRef<'a>> {
        row.get(self.upstream).or_else(|| row.get(self.column))
    }

    pub fn text(&self, row: &RawRow<'_>) -> Option<String> {
        self.lookup(row).and_then(coerce_text)
    }

    pub fn real(&self, row: &RawRow<'_>) -> Option<f64> {
        self.lookup(row).and_then(coerce_real)
    }
}

/// Coerce to a text column value
///
/// Integral numbers render without a fractional part; empty strings, nulls
/// and nested values give `None`.
pub fn coerce_text(field: FieldRef<'_>) -> Option<String> {
    match field {
        FieldRef::Text(s) => non_empty(s),
        FieldRef::Json(Value::String(s)) => non_empty(s),
        FieldRef::Json(Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                Some(i.to_string())
            } else if let Some(u) = n.as_u64() {
                Some(u.to_string())
            } else {
                n.as_f64().map(format_real)
            }
        }
        FieldRef::Json(Value::Bool(b)) => Some(b.to_string()),
        FieldRef::Json(_) => None,
    }
}

/// Coerce to a real column value
///
/// Numeric strings are parsed; anything non-numeric gives `None`.
pub fn coerce_real(field: FieldRef<'_>) -> Option<f64> {
    match field {
        FieldRef::Text(s) => parse_real(s),
        FieldRef::Json(Value::String(s)) => parse_real(s),
        FieldRef::Json(Value::Number(n)) => n.as_f64(),
        FieldRef::Json(_) => None,
    }
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn parse_real(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn format_real(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        v.to_string()
    }
}
