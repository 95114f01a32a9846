//! Typed errors for the append engine and the table stores.
//!
//! Command handlers wrap these in `anyhow` with context; everything below the
//! CLI returns [`IngestResult`] or [`StoreResult`] so callers can match on the
//! failure kind.

use std::{io, path::PathBuf};

use thiserror::Error;

use crate::schema::StoreType;

pub type StoreResult<T> = Result<T, StoreError>;
pub type IngestResult<T> = Result<T, IngestError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("CSV error in {path:?}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Schema file {path:?} is invalid: {source}")]
    SchemaFile {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Identifier '{name}' is not a canonical table or column name")]
    InvalidIdentifier { name: String },

    #[error("Table '{table}' does not exist")]
    TableNotFound { table: String },

    #[error("Table '{table}' already exists with a different structure")]
    TableConflict { table: String },

    #[error("Table '{table}' must define at least one column")]
    EmptySchema { table: String },

    #[error("Table '{table}' has no column '{column}'")]
    ColumnNotFound { table: String, column: String },

    #[error("Column '{table}.{column}' cannot change from {from} to {to}: only widening is allowed")]
    Narrowing {
        table: String,
        column: String,
        from: StoreType,
        to: StoreType,
    },

    #[error("Column '{table}.{column}' holds value '{value}' that does not fit {to}")]
    CellConversion {
        table: String,
        column: String,
        value: String,
        to: StoreType,
    },

    #[error("Insert into '{table}' does not match its columns: {reason}")]
    RowShape { table: String, reason: String },

    #[error("Corrupt data for table '{table}' at row {row}: {reason}")]
    CorruptRow {
        table: String,
        row: usize,
        reason: String,
    },

    #[error("No transaction is open")]
    NoTransaction,

    #[error("A transaction on '{table}' is already open")]
    TransactionOpen { table: String },

    #[error("Transaction is bound to '{open}', not '{requested}'")]
    WrongTable { open: String, requested: String },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        StoreError::Csv {
            path: path.into(),
            source,
        }
    }
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Fields '{first}' and '{second}' both map to column '{canonical}'")]
    NameCollision {
        canonical: String,
        first: String,
        second: String,
    },

    #[error("Name '{raw}' has no alphanumeric characters")]
    EmptyName { raw: String },

    #[error("Record {row} column '{column}': value '{value}' cannot be stored as {target}")]
    TypeCoercionFailure {
        row: usize,
        column: String,
        value: String,
        target: StoreType,
    },

    #[error("{operation} on table '{table}' failed: {source}")]
    StructuralMutationFailure {
        table: String,
        operation: String,
        #[source]
        source: StoreError,
    },

    #[error("Column '{table}.{column}' reads back as {found} after reconciliation, expected {expected}")]
    SchemaVerification {
        table: String,
        column: String,
        expected: StoreType,
        found: String,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}
