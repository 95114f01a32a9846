//! Column view of one batch after name normalization.

use std::collections::HashMap;

use crate::{
    data::Value,
    error::{IngestError, IngestResult},
    flatten::Record,
    normalize::canonical_name,
    schema::{ColumnDef, StoreType, TableSchema, infer_observed},
};

pub const UNIQUE_KEY_COLUMN: &str = "unique_key";

#[derive(Debug, Clone, PartialEq)]
pub struct BatchColumn {
    pub name: String,
    /// Join of the column's value types; `None` when every value is null.
    pub observed: Option<StoreType>,
    /// One entry per batch row, `Value::Null` where the record lacked the field.
    pub values: Vec<Value>,
}

impl BatchColumn {
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        let observed = infer_observed(&values);
        Self {
            name: name.into(),
            observed,
            values,
        }
    }

    /// Type the column is created with when the table lacks it.
    pub fn creation_type(&self) -> StoreType {
        self.observed.unwrap_or(StoreType::Text)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedBatch {
    columns: Vec<BatchColumn>,
    row_count: usize,
}

impl NormalizedBatch {
    /// Builds canonical columns in order of first appearance. Two distinct raw
    /// field names that normalize to the same column reject the whole batch.
    pub fn from_records(records: &[Record]) -> IngestResult<Self> {
        struct Pending<'a> {
            canonical: String,
            raw: &'a str,
            values: Vec<Value>,
        }

        let mut pending: Vec<Pending<'_>> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();

        for (row, record) in records.iter().enumerate() {
            for (raw, json) in record {
                let canonical = canonical_name(raw)?;
                let idx = match positions.get(&canonical) {
                    Some(&idx) => {
                        let first = pending[idx].raw;
                        if first != raw.as_str() {
                            return Err(IngestError::NameCollision {
                                canonical,
                                first: first.to_string(),
                                second: raw.clone(),
                            });
                        }
                        idx
                    }
                    None => {
                        positions.insert(canonical.clone(), pending.len());
                        pending.push(Pending {
                            canonical,
                            raw: raw.as_str(),
                            values: Vec::new(),
                        });
                        pending.len() - 1
                    }
                };
                let values = &mut pending[idx].values;
                values.resize(row, Value::Null);
                values.push(Value::from_json(json));
            }
        }

        let row_count = records.len();
        let columns = pending
            .into_iter()
            .map(|mut column| {
                column.values.resize(row_count, Value::Null);
                BatchColumn::new(column.canonical, column.values)
            })
            .collect();

        Ok(Self { columns, row_count })
    }

    /// Assembles a batch from prepared columns. The row count grows to the
    /// longest column and shorter columns are padded with nulls, so every
    /// column holds exactly one value per row.
    pub fn from_columns(mut columns: Vec<BatchColumn>, row_count: usize) -> Self {
        let row_count = columns
            .iter()
            .map(|c| c.values.len())
            .fold(row_count, usize::max);
        for column in &mut columns {
            column.values.resize(row_count, Value::Null);
        }
        Self { columns, row_count }
    }

    pub fn columns(&self) -> &[BatchColumn] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&BatchColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// A batch with no rows or no fields carries nothing to store.
    pub fn is_empty(&self) -> bool {
        self.row_count == 0 || self.columns.is_empty()
    }

    /// Schema a fresh table is created with.
    pub fn inferred_schema(&self) -> TableSchema {
        TableSchema::new(
            self.columns
                .iter()
                .map(|c| ColumnDef::new(c.name.clone(), c.creation_type()))
                .collect(),
        )
    }

    /// Adds a `unique_key` text column joining `parts` with `-` for rows
    /// where every part is non-null. Skipped when any part column is absent
    /// from the batch.
    pub fn derive_unique_key(&mut self, parts: &[String]) -> IngestResult<bool> {
        if parts.is_empty() {
            return Ok(false);
        }
        let mut sources = Vec::with_capacity(parts.len());
        for part in parts {
            let name = canonical_name(part)?;
            match self.column(&name) {
                Some(column) => sources.push(column),
                None => return Ok(false),
            }
        }
        if self.column(UNIQUE_KEY_COLUMN).is_some() {
            return Err(IngestError::NameCollision {
                canonical: UNIQUE_KEY_COLUMN.to_string(),
                first: UNIQUE_KEY_COLUMN.to_string(),
                second: format!("derived from {}", parts.join("+")),
            });
        }

        let values = (0..self.row_count)
            .map(|row| {
                let cells: Option<Vec<String>> = sources
                    .iter()
                    .map(|column| {
                        let value = &column.values[row];
                        (!value.is_null()).then(|| value.as_display())
                    })
                    .collect();
                cells.map_or(Value::Null, |cells| Value::Text(cells.join("-")))
            })
            .collect();
        self.columns
            .push(BatchColumn::new(UNIQUE_KEY_COLUMN, values));
        Ok(true)
    }
}
