//! Store types, the widening lattice, table schemas, and type inference.
//!
//! This module owns the [`StoreType`] enum (the five persisted value types),
//! the [`TableSchema`] struct (the ordered column list a table is stored
//! with), and the inference rules that classify a batch column.
//!
//! ## Lattice
//!
//! `BOOLEAN < INTEGER < FLOAT < TEXT`. `TIMESTAMP` only sits below `TEXT`;
//! merging it with anything other than another timestamp yields `TEXT`.
//! [`StoreType::join`] is the least upper bound of two types and is the only
//! way a column type changes.

use std::{fmt, str::FromStr};

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::data::{TIMESTAMP_FORMAT, Value, parse_naive_datetime};

pub const CURRENT_SCHEMA_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StoreType {
    Boolean,
    Integer,
    Float,
    Timestamp,
    Text,
}

impl StoreType {
    pub const ALL: [StoreType; 5] = [
        StoreType::Boolean,
        StoreType::Integer,
        StoreType::Float,
        StoreType::Timestamp,
        StoreType::Text,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StoreType::Boolean => "BOOLEAN",
            StoreType::Integer => "INTEGER",
            StoreType::Float => "FLOAT",
            StoreType::Timestamp => "TIMESTAMP",
            StoreType::Text => "TEXT",
        }
    }

    /// Position on the numeric chain; `None` for `TIMESTAMP`.
    fn numeric_rank(&self) -> Option<u8> {
        match self {
            StoreType::Boolean => Some(0),
            StoreType::Integer => Some(1),
            StoreType::Float => Some(2),
            StoreType::Timestamp => None,
            StoreType::Text => Some(3),
        }
    }

    /// Least upper bound of `self` and `other`.
    pub fn join(self, other: StoreType) -> StoreType {
        if self == other {
            return self;
        }
        match (self.numeric_rank(), other.numeric_rank()) {
            (Some(left), Some(right)) => {
                if left >= right {
                    self
                } else {
                    other
                }
            }
            // A timestamp merged with any other type only fits in text.
            _ => StoreType::Text,
        }
    }

    /// True when `other` fits in `self` without widening.
    pub fn contains(self, other: StoreType) -> bool {
        self.join(other) == self
    }
}

impl fmt::Display for StoreType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StoreType {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "boolean" | "bool" => Ok(StoreType::Boolean),
            "integer" | "int" | "bigint" => Ok(StoreType::Integer),
            "float" | "double" => Ok(StoreType::Float),
            "timestamp" | "datetime" => Ok(StoreType::Timestamp),
            "text" | "string" | "varchar" => Ok(StoreType::Text),
            _ => Err(anyhow!(
                "Unknown store type '{value}'. Supported types: {}",
                StoreType::ALL.map(|ty| ty.as_str()).join(", ")
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    pub datatype: StoreType,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, datatype: StoreType) -> Self {
        Self {
            name: name.into(),
            datatype,
        }
    }
}

/// Ordered column list of a persisted table. Column order is the positional
/// order of every stored row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TableSchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<String>,
    pub columns: Vec<ColumnDef>,
}

impl TableSchema {
    pub fn new(columns: Vec<ColumnDef>) -> Self {
        Self {
            schema_version: None,
            columns,
        }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_type(&self, name: &str) -> Option<StoreType> {
        self.column(name).map(|c| c.datatype)
    }

    pub fn names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Compares column lists only; the version tag is bookkeeping.
    pub fn same_structure(&self, other: &TableSchema) -> bool {
        self.columns == other.columns
    }

    pub fn with_version(mut self) -> Self {
        if self.schema_version.is_none() {
            self.schema_version = Some(CURRENT_SCHEMA_VERSION.to_string());
        }
        self
    }
}

/// Type a single value demands, or `None` for null.
///
/// Text that reads as an ISO-8601 date-time counts as a timestamp; all other
/// text stays text. Numeric-looking text is not promoted.
pub fn observed_type(value: &Value) -> Option<StoreType> {
    match value {
        Value::Null => None,
        Value::Boolean(_) => Some(StoreType::Boolean),
        Value::Integer(_) => Some(StoreType::Integer),
        Value::Float(_) => Some(StoreType::Float),
        Value::Timestamp(_) => Some(StoreType::Timestamp),
        Value::Text(text) => {
            if looks_like_timestamp(text) {
                Some(StoreType::Timestamp)
            } else {
                Some(StoreType::Text)
            }
        }
    }
}

/// Only text that the stored timestamp form reproduces byte for byte counts;
/// offsets, `Z` suffixes and space-separated forms stay text.
fn looks_like_timestamp(text: &str) -> bool {
    // Cheap gate before the chrono parsers run.
    let bytes = text.as_bytes();
    bytes.len() >= 19
        && bytes[..4].iter().all(u8::is_ascii_digit)
        && bytes[4] == b'-'
        && parse_naive_datetime(text)
            .is_ok_and(|ts| ts.format(TIMESTAMP_FORMAT).to_string() == text)
}

/// Join of every non-null value's type; `None` when the column carries no
/// non-null value and therefore no constraint.
pub fn infer_observed<'a, I>(values: I) -> Option<StoreType>
where
    I: IntoIterator<Item = &'a Value>,
{
    values
        .into_iter()
        .filter_map(observed_type)
        .reduce(StoreType::join)
}

/// Minimal store type for a column; empty and all-null columns are `TEXT`.
pub fn infer<'a, I>(values: I) -> StoreType
where
    I: IntoIterator<Item = &'a Value>,
{
    infer_observed(values).unwrap_or(StoreType::Text)
}
