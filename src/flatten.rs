//! Raw and flattened record shapes.
//!
//! `raw` keeps a record's top-level fields and leaves nested values to be
//! serialized as JSON text. `flat` lifts nested objects into
//! `parent<sep>child` keys, descending at most `max_depth` levels; deeper
//! objects and every list stay whole.

use serde_json::{Map, Value as JsonValue};

pub type Record = Map<String, JsonValue>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordShape {
    Raw,
    Flat { separator: String, max_depth: usize },
}

impl RecordShape {
    pub fn apply(&self, record: &Record) -> Record {
        match self {
            RecordShape::Raw => record.clone(),
            RecordShape::Flat {
                separator,
                max_depth,
            } => {
                let mut out = Map::with_capacity(record.len());
                flatten_into(record, None, separator, 0, *max_depth, &mut out);
                out
            }
        }
    }

    pub fn apply_all(&self, records: &[Record]) -> Vec<Record> {
        records.iter().map(|record| self.apply(record)).collect()
    }
}

fn flatten_into(
    object: &Record,
    prefix: Option<&str>,
    separator: &str,
    depth: usize,
    max_depth: usize,
    out: &mut Record,
) {
    for (key, value) in object {
        let full_key = match prefix {
            Some(prefix) => format!("{prefix}{separator}{key}"),
            None => key.clone(),
        };
        match value {
            JsonValue::Object(nested) if depth < max_depth => {
                flatten_into(nested, Some(&full_key), separator, depth + 1, max_depth, out);
            }
            _ => {
                out.insert(full_key, value.clone());
            }
        }
    }
}
