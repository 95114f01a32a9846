use std::fmt;

use anyhow::{Context, Result, anyhow, bail};
use chrono::{DateTime, NaiveDateTime};
use serde_json::Value as JsonValue;

use crate::schema::StoreType;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Timestamp(NaiveDateTime),
    Text(String),
}

impl Value {
    /// Maps one JSON field value onto the tagged model. Lists and objects are
    /// kept as their compact JSON text; integers beyond `i64` stay text so no
    /// digits are lost.
    pub fn from_json(value: &JsonValue) -> Value {
        match value {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(b) => Value::Boolean(*b),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Integer(i)
                } else if n.is_u64() {
                    Value::Text(n.to_string())
                } else {
                    n.as_f64()
                        .map(Value::Float)
                        .unwrap_or_else(|| Value::Text(n.to_string()))
                }
            }
            JsonValue::String(s) => Value::Text(s.clone()),
            JsonValue::Array(_) | JsonValue::Object(_) => Value::Text(value.to_string()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Type this value is stored as; `None` for null.
    pub fn stored_type(&self) -> Option<StoreType> {
        match self {
            Value::Null => None,
            Value::Boolean(_) => Some(StoreType::Boolean),
            Value::Integer(_) => Some(StoreType::Integer),
            Value::Float(_) => Some(StoreType::Float),
            Value::Timestamp(_) => Some(StoreType::Timestamp),
            Value::Text(_) => Some(StoreType::Text),
        }
    }

    /// Text form of a non-null value; null renders as `NULL`.
    pub fn as_display(&self) -> String {
        match self {
            Value::Null => "NULL".to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Integer(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Timestamp(ts) => ts.format(TIMESTAMP_FORMAT).to_string(),
            Value::Text(s) => s.clone(),
        }
    }

    /// Lossless conversion into `target`, or `None` when the value has no
    /// exact representation there.
    pub fn coerce(&self, target: StoreType) -> Option<Value> {
        match (self, target) {
            (Value::Null, _) => Some(Value::Null),
            (Value::Text(text), StoreType::Text) => Some(Value::Text(text.clone())),
            (Value::Text(text), ty) => parse_typed_value(text, ty).ok(),
            (other, StoreType::Text) => Some(Value::Text(other.as_display())),
            (Value::Boolean(b), StoreType::Boolean) => Some(Value::Boolean(*b)),
            (Value::Boolean(b), StoreType::Integer) => Some(Value::Integer(i64::from(*b))),
            (Value::Boolean(b), StoreType::Float) => Some(Value::Float(f64::from(u8::from(*b)))),
            (Value::Integer(i), StoreType::Integer) => Some(Value::Integer(*i)),
            (Value::Integer(i), StoreType::Float) => integer_to_float(*i).map(Value::Float),
            (Value::Float(f), StoreType::Float) => Some(Value::Float(*f)),
            (Value::Float(f), StoreType::Integer) => float_to_integer(*f).map(Value::Integer),
            (Value::Timestamp(ts), StoreType::Timestamp) => Some(Value::Timestamp(*ts)),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_display())
    }
}

fn integer_to_float(value: i64) -> Option<f64> {
    let converted = value as f64;
    // Saturating casts make the round trip differ whenever precision was lost.
    (converted as i128 == value as i128).then_some(converted)
}

fn float_to_integer(value: f64) -> Option<i64> {
    const BOUND: f64 = 9_223_372_036_854_775_808.0;
    if value.is_finite() && value.fract() == 0.0 && (-BOUND..BOUND).contains(&value) {
        Some(value as i64)
    } else {
        None
    }
}

pub fn parse_naive_datetime(value: &str) -> Result<NaiveDateTime> {
    const DATETIME_FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];
    let trimmed = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.naive_utc());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Ok(parsed);
        }
    }
    Err(anyhow!("Failed to parse '{value}' as timestamp"))
}

pub fn parse_boolean(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "1" => Ok(true),
        "false" | "f" | "no" | "n" | "0" => Ok(false),
        _ => bail!("Failed to parse '{value}' as boolean"),
    }
}

/// Parses text under the grammar of `ty`.
pub fn parse_typed_value(value: &str, ty: StoreType) -> Result<Value> {
    let parsed = match ty {
        StoreType::Text => Value::Text(value.to_string()),
        StoreType::Boolean => Value::Boolean(parse_boolean(value)?),
        StoreType::Integer => {
            let parsed: i64 = value
                .trim()
                .parse()
                .with_context(|| format!("Failed to parse '{value}' as integer"))?;
            Value::Integer(parsed)
        }
        StoreType::Float => {
            let parsed: f64 = value
                .trim()
                .parse()
                .with_context(|| format!("Failed to parse '{value}' as float"))?;
            if !parsed.is_finite() {
                bail!("Float '{value}' is not finite");
            }
            Value::Float(parsed)
        }
        StoreType::Timestamp => Value::Timestamp(parse_naive_datetime(value)?),
    };
    Ok(parsed)
}
