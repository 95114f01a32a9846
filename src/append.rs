use log::debug;

use crate::{
    batch::NormalizedBatch,
    data::Value,
    error::{IngestError, IngestResult},
    schema::TableSchema,
    store::TableStore,
};

/// Lays out every batch row positionally in `schema` order. Columns the batch
/// lacks are null; each present value is coerced into its column's type.
pub fn build_rows(
    table: &str,
    schema: &TableSchema,
    batch: &NormalizedBatch,
) -> IngestResult<Vec<Vec<Value>>> {
    let mut sources = Vec::with_capacity(schema.len());
    for def in &schema.columns {
        sources.push(batch.column(&def.name));
    }
    if let Some(missing) = batch
        .columns()
        .iter()
        .find(|c| schema.column(&c.name).is_none())
    {
        return Err(IngestError::SchemaVerification {
            table: table.to_string(),
            column: missing.name.clone(),
            expected: missing.creation_type(),
            found: "no such column".to_string(),
        });
    }

    let mut rows = Vec::with_capacity(batch.row_count());
    for row_idx in 0..batch.row_count() {
        let mut row = Vec::with_capacity(schema.len());
        for (def, source) in schema.columns.iter().zip(&sources) {
            let value = match source {
                None => Value::Null,
                Some(column) => {
                    let raw = &column.values[row_idx];
                    raw.coerce(def.datatype)
                        .ok_or_else(|| IngestError::TypeCoercionFailure {
                            row: row_idx,
                            column: def.name.clone(),
                            value: raw.as_display(),
                            target: def.datatype,
                        })?
                }
            };
            row.push(value);
        }
        rows.push(row);
    }
    Ok(rows)
}

/// Inserts the batch into `table` under `schema`, returning the row count.
pub fn append<S>(
    store: &mut S,
    table: &str,
    schema: &TableSchema,
    batch: &NormalizedBatch,
) -> IngestResult<usize>
where
    S: TableStore + ?Sized,
{
    let rows = build_rows(table, schema, batch)?;
    let inserted = store.insert_rows(table, &schema.names(), &rows)?;
    debug!("Inserted {inserted} row(s) into {table}");
    Ok(inserted)
}
