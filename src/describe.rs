use anyhow::{Context, Result, anyhow};
use log::info;

use crate::{
    cli::DescribeArgs,
    normalize::canonical_name,
    store::{FileStore, TableStore},
    table,
};

pub fn execute(args: &DescribeArgs) -> Result<()> {
    let table = canonical_name(&args.table)?;
    let store = FileStore::open(&args.store)
        .with_context(|| format!("Opening store at {:?}", args.store))?;
    let schema = store
        .describe(&table)
        .with_context(|| format!("Reading schema for '{table}'"))?
        .ok_or_else(|| anyhow!("Table '{table}' does not exist in {:?}", args.store))?;
    table::print_schema(&schema);
    info!(
        "Table {table} has {} column(s) (schema version {})",
        schema.len(),
        schema.schema_version.as_deref().unwrap_or("unversioned")
    );
    Ok(())
}
