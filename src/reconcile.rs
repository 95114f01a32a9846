//! Schema reconciliation: the structural changes a batch needs.
//!
//! [`reconcile`] compares a batch against the live schema and produces a
//! [`BatchPlan`]. A missing table becomes one `CreateTable`; otherwise every
//! batch column the table lacks becomes an `AddColumn` and every existing
//! column whose type cannot hold the observed values becomes a `WidenColumn`
//! to the join of the two types. Columns only ever widen.

use std::fmt;

use log::debug;

use crate::{
    batch::BatchColumn,
    error::{IngestError, IngestResult},
    schema::{ColumnDef, StoreType, TableSchema},
    store::TableStore,
};

#[derive(Debug, Clone, PartialEq)]
pub enum SchemaOperation {
    CreateTable { schema: TableSchema },
    AddColumn { name: String, datatype: StoreType },
    WidenColumn {
        name: String,
        from: StoreType,
        to: StoreType,
    },
}

impl fmt::Display for SchemaOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaOperation::CreateTable { schema } => {
                write!(f, "CREATE TABLE (")?;
                for (idx, column) in schema.columns.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} {}", column.name, column.datatype)?;
                }
                write!(f, ")")
            }
            SchemaOperation::AddColumn { name, datatype } => {
                write!(f, "ADD COLUMN {name} {datatype}")
            }
            SchemaOperation::WidenColumn { name, from, to } => {
                write!(f, "ALTER COLUMN {name} {from} -> {to}")
            }
        }
    }
}

/// Ordered structural operations plus the schema the table has once they
/// are applied.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchPlan {
    pub operations: Vec<SchemaOperation>,
    pub schema: TableSchema,
}

impl BatchPlan {
    pub fn is_noop(&self) -> bool {
        self.operations.is_empty()
    }
}

/// Plans the changes `columns` need on top of `current`. Pure: the same
/// inputs always give the same plan, and a table that already accepts the
/// batch gets an empty plan.
pub fn reconcile(current: Option<&TableSchema>, columns: &[BatchColumn]) -> BatchPlan {
    let Some(current) = current else {
        let schema = TableSchema::new(
            columns
                .iter()
                .map(|c| ColumnDef::new(c.name.clone(), c.creation_type()))
                .collect(),
        );
        return BatchPlan {
            operations: vec![SchemaOperation::CreateTable {
                schema: schema.clone(),
            }],
            schema,
        };
    };

    let mut schema = current.clone();
    let mut operations = Vec::new();
    for column in columns {
        match schema.column_index(&column.name) {
            None => {
                let datatype = column.creation_type();
                schema
                    .columns
                    .push(ColumnDef::new(column.name.clone(), datatype));
                operations.push(SchemaOperation::AddColumn {
                    name: column.name.clone(),
                    datatype,
                });
            }
            Some(idx) => {
                let Some(observed) = column.observed else {
                    continue;
                };
                let from = schema.columns[idx].datatype;
                let to = from.join(observed);
                if to != from {
                    schema.columns[idx].datatype = to;
                    operations.push(SchemaOperation::WidenColumn {
                        name: column.name.clone(),
                        from,
                        to,
                    });
                }
            }
        }
    }
    BatchPlan { operations, schema }
}

/// Applies `plan` to `table` in order. Must run inside an open transaction.
pub fn apply_plan<S>(store: &mut S, table: &str, plan: &BatchPlan) -> IngestResult<()>
where
    S: TableStore + ?Sized,
{
    for operation in &plan.operations {
        debug!("{table}: {operation}");
        let result = match operation {
            SchemaOperation::CreateTable { schema } => store.create_table(table, schema),
            SchemaOperation::AddColumn { name, datatype } => {
                store.add_column(table, &ColumnDef::new(name.clone(), *datatype))
            }
            SchemaOperation::WidenColumn { name, to, .. } => {
                store.alter_column_type(table, name, *to)
            }
        };
        result.map_err(|source| IngestError::StructuralMutationFailure {
            table: table.to_string(),
            operation: operation.to_string(),
            source,
        })?;
    }
    Ok(())
}
