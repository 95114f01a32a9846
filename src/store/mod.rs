//! Persistent table stores.
//!
//! [`TableStore`] is the seam between the append engine and whatever holds
//! the tables. Every mutation happens inside a transaction opened with
//! [`TableStore::begin`]; [`TableStore::commit`] publishes all of it and
//! [`TableStore::rollback`] discards all of it.
//!
//! Structural operations are idempotent so a replayed plan is harmless:
//! creating an identical table, adding a column that exists, and widening a
//! column to its current type all succeed without changing anything.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use std::collections::HashSet;

use log::debug;

use crate::{
    data::Value,
    error::{StoreError, StoreResult},
    normalize::is_canonical,
    schema::{ColumnDef, StoreType, TableSchema},
};

pub trait TableStore {
    /// Live schema of `table`, or `None` when it does not exist. Inside a
    /// transaction this reflects the transaction's pending changes.
    fn describe(&self, table: &str) -> StoreResult<Option<TableSchema>>;

    fn create_table(&mut self, table: &str, schema: &TableSchema) -> StoreResult<()>;

    fn add_column(&mut self, table: &str, column: &ColumnDef) -> StoreResult<()>;

    fn alter_column_type(&mut self, table: &str, column: &str, datatype: StoreType)
    -> StoreResult<()>;

    /// Appends `rows`, each a positional tuple aligned to `columns`. The
    /// tuple must cover every table column.
    fn insert_rows(
        &mut self,
        table: &str,
        columns: &[String],
        rows: &[Vec<Value>],
    ) -> StoreResult<usize>;

    /// All rows of `table` in insertion order, aligned to its schema.
    fn scan(&self, table: &str) -> StoreResult<Vec<Vec<Value>>>;

    fn tables(&self) -> StoreResult<Vec<String>>;

    fn begin(&mut self, table: &str) -> StoreResult<()>;

    fn commit(&mut self) -> StoreResult<()>;

    fn rollback(&mut self) -> StoreResult<()>;
}

pub(crate) fn ensure_identifier(name: &str) -> StoreResult<()> {
    if is_canonical(name) {
        Ok(())
    } else {
        Err(StoreError::InvalidIdentifier {
            name: name.to_string(),
        })
    }
}

pub(crate) fn validate_new_schema(table: &str, schema: &TableSchema) -> StoreResult<()> {
    ensure_identifier(table)?;
    if schema.is_empty() {
        return Err(StoreError::EmptySchema {
            table: table.to_string(),
        });
    }
    let mut seen = HashSet::with_capacity(schema.len());
    for column in &schema.columns {
        ensure_identifier(&column.name)?;
        if !seen.insert(column.name.as_str()) {
            return Err(StoreError::RowShape {
                table: table.to_string(),
                reason: format!("column '{}' is defined twice", column.name),
            });
        }
    }
    Ok(())
}

/// Appends `column` with a null cell in every row. Returns `false` when the
/// column already exists.
pub(crate) fn add_column_to(
    table: &str,
    schema: &mut TableSchema,
    rows: &mut [Vec<Value>],
    column: &ColumnDef,
) -> StoreResult<bool> {
    ensure_identifier(&column.name)?;
    if schema.column(&column.name).is_some() {
        return Ok(false);
    }
    schema.columns.push(column.clone());
    for row in rows.iter_mut() {
        row.push(Value::Null);
    }
    debug!("Added column {table}.{} {}", column.name, column.datatype);
    Ok(true)
}

/// Rewrites every cell of `column` under `datatype`. Returns `false` when the
/// column already has that type; rejects anything that is not a widening.
pub(crate) fn widen_column_in(
    table: &str,
    schema: &mut TableSchema,
    rows: &mut [Vec<Value>],
    column: &str,
    datatype: StoreType,
) -> StoreResult<bool> {
    let idx = schema
        .column_index(column)
        .ok_or_else(|| StoreError::ColumnNotFound {
            table: table.to_string(),
            column: column.to_string(),
        })?;
    let current = schema.columns[idx].datatype;
    if current == datatype {
        return Ok(false);
    }
    if !datatype.contains(current) {
        return Err(StoreError::Narrowing {
            table: table.to_string(),
            column: column.to_string(),
            from: current,
            to: datatype,
        });
    }

    let mut converted = Vec::with_capacity(rows.len());
    for row in rows.iter() {
        let cell = &row[idx];
        let value = cell
            .coerce(datatype)
            .ok_or_else(|| StoreError::CellConversion {
                table: table.to_string(),
                column: column.to_string(),
                value: cell.as_display(),
                to: datatype,
            })?;
        converted.push(value);
    }
    for (row, value) in rows.iter_mut().zip(converted) {
        row[idx] = value;
    }
    schema.columns[idx].datatype = datatype;
    debug!("Widened column {table}.{column} {current} -> {datatype}");
    Ok(true)
}

/// Reorders positional tuples from `columns` order into `schema` order and
/// checks every value already has its column's type.
pub(crate) fn align_rows(
    table: &str,
    schema: &TableSchema,
    columns: &[String],
    rows: &[Vec<Value>],
) -> StoreResult<Vec<Vec<Value>>> {
    let shape_error = |reason: String| StoreError::RowShape {
        table: table.to_string(),
        reason,
    };

    if columns.len() != schema.len() {
        return Err(shape_error(format!(
            "expected {} column(s), got {}",
            schema.len(),
            columns.len()
        )));
    }
    let mut source_of = vec![None; schema.len()];
    for (source_idx, name) in columns.iter().enumerate() {
        let target_idx = schema
            .column_index(name)
            .ok_or_else(|| shape_error(format!("unknown column '{name}'")))?;
        if source_of[target_idx].replace(source_idx).is_some() {
            return Err(shape_error(format!("column '{name}' listed twice")));
        }
    }

    let mut aligned = Vec::with_capacity(rows.len());
    for (row_idx, row) in rows.iter().enumerate() {
        if row.len() != columns.len() {
            return Err(shape_error(format!(
                "row {row_idx} has {} value(s) for {} column(s)",
                row.len(),
                columns.len()
            )));
        }
        let mut tuple = Vec::with_capacity(schema.len());
        for (target_idx, column) in schema.columns.iter().enumerate() {
            // Every slot was filled above: lengths match and names are unique.
            let source_idx = source_of[target_idx].unwrap_or_default();
            let value = &row[source_idx];
            if let Some(found) = value.stored_type()
                && found != column.datatype
            {
                return Err(shape_error(format!(
                    "row {row_idx} column '{}' holds {found}, column is {}",
                    column.name, column.datatype
                )));
            }
            tuple.push(value.clone());
        }
        aligned.push(tuple);
    }
    Ok(aligned)
}
