use std::collections::BTreeMap;

use crate::{
    data::Value,
    error::{StoreError, StoreResult},
    schema::{ColumnDef, StoreType, TableSchema},
};

use super::{
    TableStore, add_column_to, align_rows, ensure_identifier, validate_new_schema, widen_column_in,
};

#[derive(Debug, Clone, Default, PartialEq)]
struct TableData {
    schema: TableSchema,
    rows: Vec<Vec<Value>>,
}

#[derive(Debug)]
struct Snapshot {
    table: String,
    original: Option<TableData>,
}

/// Process-local store. Rollback restores the table snapshot taken at
/// `begin`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: BTreeMap<String, TableData>,
    snapshot: Option<Snapshot>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a committed table outside any transaction.
    pub fn with_table(mut self, table: &str, schema: TableSchema, rows: Vec<Vec<Value>>) -> Self {
        self.tables
            .insert(table.to_string(), TableData { schema, rows });
        self
    }

    pub fn in_transaction(&self) -> bool {
        self.snapshot.is_some()
    }

    fn guard(&self, table: &str) -> StoreResult<()> {
        match &self.snapshot {
            None => Err(StoreError::NoTransaction),
            Some(snapshot) if snapshot.table != table => Err(StoreError::WrongTable {
                open: snapshot.table.clone(),
                requested: table.to_string(),
            }),
            Some(_) => Ok(()),
        }
    }

    fn table_mut(&mut self, table: &str) -> StoreResult<&mut TableData> {
        self.guard(table)?;
        self.tables
            .get_mut(table)
            .ok_or_else(|| StoreError::TableNotFound {
                table: table.to_string(),
            })
    }
}

impl TableStore for MemoryStore {
    fn describe(&self, table: &str) -> StoreResult<Option<TableSchema>> {
        Ok(self.tables.get(table).map(|data| data.schema.clone()))
    }

    fn create_table(&mut self, table: &str, schema: &TableSchema) -> StoreResult<()> {
        self.guard(table)?;
        validate_new_schema(table, schema)?;
        if let Some(existing) = self.tables.get(table) {
            return if existing.schema.same_structure(schema) {
                Ok(())
            } else {
                Err(StoreError::TableConflict {
                    table: table.to_string(),
                })
            };
        }
        self.tables.insert(
            table.to_string(),
            TableData {
                schema: schema.clone().with_version(),
                rows: Vec::new(),
            },
        );
        Ok(())
    }

    fn add_column(&mut self, table: &str, column: &ColumnDef) -> StoreResult<()> {
        let data = self.table_mut(table)?;
        add_column_to(table, &mut data.schema, &mut data.rows, column)?;
        Ok(())
    }

    fn alter_column_type(
        &mut self,
        table: &str,
        column: &str,
        datatype: StoreType,
    ) -> StoreResult<()> {
        let data = self.table_mut(table)?;
        widen_column_in(table, &mut data.schema, &mut data.rows, column, datatype)?;
        Ok(())
    }

    fn insert_rows(
        &mut self,
        table: &str,
        columns: &[String],
        rows: &[Vec<Value>],
    ) -> StoreResult<usize> {
        let data = self.table_mut(table)?;
        let aligned = align_rows(table, &data.schema, columns, rows)?;
        let inserted = aligned.len();
        data.rows.extend(aligned);
        Ok(inserted)
    }

    fn scan(&self, table: &str) -> StoreResult<Vec<Vec<Value>>> {
        self.tables
            .get(table)
            .map(|data| data.rows.clone())
            .ok_or_else(|| StoreError::TableNotFound {
                table: table.to_string(),
            })
    }

    fn tables(&self) -> StoreResult<Vec<String>> {
        Ok(self.tables.keys().cloned().collect())
    }

    fn begin(&mut self, table: &str) -> StoreResult<()> {
        if let Some(open) = &self.snapshot {
            return Err(StoreError::TransactionOpen {
                table: open.table.clone(),
            });
        }
        ensure_identifier(table)?;
        self.snapshot = Some(Snapshot {
            table: table.to_string(),
            original: self.tables.get(table).cloned(),
        });
        Ok(())
    }

    fn commit(&mut self) -> StoreResult<()> {
        self.snapshot
            .take()
            .map(|_| ())
            .ok_or(StoreError::NoTransaction)
    }

    fn rollback(&mut self) -> StoreResult<()> {
        let snapshot = self.snapshot.take().ok_or(StoreError::NoTransaction)?;
        match snapshot.original {
            Some(original) => {
                self.tables.insert(snapshot.table, original);
            }
            None => {
                self.tables.remove(&snapshot.table);
            }
        }
        Ok(())
    }
}
