//! Batch pipeline: normalize, reconcile, append, one transaction per target.
//!
//! A batch moves `Normalizing → Reconciling → Reconciled → Appended`, or to
//! `Failed` from any of them. Name normalization and collision checks run
//! before the transaction opens, so a rejected batch never touches the
//! store. Once the transaction is open, any error rolls it back in full and
//! the original error is returned.

use std::fmt;

use log::{debug, info, warn};

use crate::{
    append::append,
    batch::NormalizedBatch,
    config::TargetConfig,
    error::{IngestError, IngestResult, StoreError},
    flatten::Record,
    normalize::canonical_name,
    reconcile::{BatchPlan, SchemaOperation, apply_plan, reconcile},
    schema::TableSchema,
    store::TableStore,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    Normalizing,
    Reconciling,
    Reconciled,
    Appended,
    Failed,
}

impl fmt::Display for BatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BatchState::Normalizing => "normalizing",
            BatchState::Reconciling => "reconciling",
            BatchState::Reconciled => "reconciled",
            BatchState::Appended => "appended",
            BatchState::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// Outcome of one batch against one table.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport {
    pub table: String,
    pub operations: Vec<SchemaOperation>,
    pub rows_inserted: usize,
    pub state: BatchState,
    /// Live schema after the batch; `None` for an empty batch, which never
    /// reads the store.
    pub schema: Option<TableSchema>,
}

struct Tracker<'a> {
    table: &'a str,
    state: BatchState,
}

impl<'a> Tracker<'a> {
    fn new(table: &'a str) -> Self {
        debug!("{table}: batch {}", BatchState::Normalizing);
        Self {
            table,
            state: BatchState::Normalizing,
        }
    }

    fn advance(&mut self, next: BatchState) {
        debug!("{}: batch {} -> {next}", self.table, self.state);
        self.state = next;
    }
}

/// Ingests `records` into the table `target` names.
pub fn ingest_batch<S>(
    store: &mut S,
    target: &TargetConfig,
    records: &[Record],
) -> IngestResult<BatchReport>
where
    S: TableStore + ?Sized,
{
    let table = canonical_name(&target.table)?;
    let mut tracker = Tracker::new(&table);

    let batch = match normalize_batch(target, records) {
        Ok(batch) => batch,
        Err(err) => {
            tracker.advance(BatchState::Failed);
            return Err(err);
        }
    };

    if batch.is_empty() {
        info!("Empty batch for {table}; nothing to ingest");
        tracker.advance(BatchState::Appended);
        return Ok(BatchReport {
            table: table.clone(),
            operations: Vec::new(),
            rows_inserted: 0,
            state: tracker.state,
            schema: None,
        });
    }

    store.begin(&table)?;
    match reconcile_and_append(store, &table, &batch, &mut tracker) {
        Ok((plan, rows_inserted, schema)) => {
            if let Err(err) = store.commit() {
                tracker.advance(BatchState::Failed);
                return Err(err.into());
            }
            log_plan(&table, &plan);
            info!("Appended {rows_inserted} row(s) to {table}");
            Ok(BatchReport {
                table: table.clone(),
                operations: plan.operations,
                rows_inserted,
                state: tracker.state,
                schema: Some(schema),
            })
        }
        Err(err) => {
            tracker.advance(BatchState::Failed);
            match store.rollback() {
                Ok(()) => warn!("Rolled back batch for {table}: {err}"),
                Err(rollback_err) => {
                    warn!("Rollback for {table} failed: {rollback_err}; batch error: {err}")
                }
            }
            Err(err)
        }
    }
}

/// Ingests `records` into every target in order, each in its own
/// transaction. Stops at the first failing target; earlier targets stay
/// committed.
pub fn ingest_all<S>(
    store: &mut S,
    targets: &[TargetConfig],
    records: &[Record],
) -> IngestResult<Vec<BatchReport>>
where
    S: TableStore + ?Sized,
{
    let mut reports = Vec::with_capacity(targets.len());
    for target in targets {
        reports.push(ingest_batch(store, target, records)?);
    }
    Ok(reports)
}

fn normalize_batch(target: &TargetConfig, records: &[Record]) -> IngestResult<NormalizedBatch> {
    let shaped = target.shape().apply_all(records);
    let mut batch = NormalizedBatch::from_records(&shaped)?;
    if batch.derive_unique_key(&target.unique_key)? {
        debug!("Derived unique_key from {:?}", target.unique_key);
    }
    Ok(batch)
}

fn reconcile_and_append<S>(
    store: &mut S,
    table: &str,
    batch: &NormalizedBatch,
    tracker: &mut Tracker<'_>,
) -> IngestResult<(BatchPlan, usize, TableSchema)>
where
    S: TableStore + ?Sized,
{
    tracker.advance(BatchState::Reconciling);
    let current = store.describe(table)?;
    let plan = reconcile(current.as_ref(), batch.columns());
    debug!("{table}: {} planned operation(s)", plan.operations.len());
    apply_plan(store, table, &plan)?;

    let live = store
        .describe(table)?
        .ok_or_else(|| StoreError::TableNotFound {
            table: table.to_string(),
        })?;
    verify_schema(table, &plan, &live)?;
    tracker.advance(BatchState::Reconciled);

    let rows_inserted = append(store, table, &live, batch)?;
    tracker.advance(BatchState::Appended);
    Ok((plan, rows_inserted, live))
}

/// Every planned column must read back with exactly its planned type.
fn verify_schema(table: &str, plan: &BatchPlan, live: &TableSchema) -> IngestResult<()> {
    for planned in &plan.schema.columns {
        match live.column_type(&planned.name) {
            Some(found) if found == planned.datatype => {}
            found => {
                return Err(IngestError::SchemaVerification {
                    table: table.to_string(),
                    column: planned.name.clone(),
                    expected: planned.datatype,
                    found: found.map_or_else(|| "missing".to_string(), |ty| ty.to_string()),
                });
            }
        }
    }
    Ok(())
}

fn log_plan(table: &str, plan: &BatchPlan) {
    for operation in &plan.operations {
        match operation {
            SchemaOperation::CreateTable { schema } => {
                info!("Created table {table} with {} column(s)", schema.len())
            }
            SchemaOperation::AddColumn { name, datatype } => {
                info!("Added column {table}.{name} {datatype}")
            }
            SchemaOperation::WidenColumn { name, from, to } => {
                info!("Widened column {table}.{name} from {from} to {to}")
            }
        }
    }
}
