use anyhow::{Context, Result, anyhow};
use log::info;

use crate::{
    cli::PreviewArgs,
    normalize::canonical_name,
    store::{FileStore, TableStore},
    table,
};

pub fn execute(args: &PreviewArgs) -> Result<()> {
    let table = canonical_name(&args.table)?;
    let store = FileStore::open(&args.store)
        .with_context(|| format!("Opening store at {:?}", args.store))?;
    let schema = store
        .describe(&table)?
        .ok_or_else(|| anyhow!("Table '{table}' does not exist in {:?}", args.store))?;
    let mut rows = store
        .scan(&table)
        .with_context(|| format!("Reading rows of '{table}'"))?;
    let total = rows.len();
    rows.truncate(args.rows);

    table::print_rows(&schema, &rows);
    info!("Displayed {} of {total} row(s) from {table}", rows.len());
    Ok(())
}
