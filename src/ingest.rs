use anyhow::{Context, Result, anyhow, bail};
use log::info;

use crate::{
    cli::IngestArgs,
    config::{IngestConfig, TargetConfig},
    io_utils,
    normalize::normalize,
    pipeline::{BatchReport, ingest_all},
    play_text::{PlayRules, annotate_records},
    store::FileStore,
};

pub fn execute(args: &IngestArgs) -> Result<()> {
    let config = resolve_config(args)?;
    let mut records = io_utils::read_records(&args.input)?;
    info!(
        "Read {} record(s) from {:?} for {} target(s)",
        records.len(),
        args.input,
        config.targets.len()
    );

    if let Some(play_text) = &config.play_text {
        annotate_records(&mut records, play_text, &PlayRules::default());
    }

    let mut store = FileStore::open(&config.store)
        .with_context(|| format!("Opening store at {:?}", config.store))?;
    let reports = ingest_all(&mut store, &config.targets, &records)
        .with_context(|| format!("Ingesting {:?}", args.input))?;
    for report in &reports {
        print_report(report);
    }
    Ok(())
}

/// Folds command-line flags into the configuration file, or builds a
/// single-target configuration from flags alone.
pub fn resolve_config(args: &IngestArgs) -> Result<IngestConfig> {
    let mut config = match &args.config {
        Some(path) => IngestConfig::load(path)?,
        None => {
            let table = args
                .table
                .clone()
                .ok_or_else(|| anyhow!("--table is required when no --config is given"))?;
            IngestConfig {
                targets: vec![TargetConfig::new(table)],
                ..IngestConfig::default()
            }
        }
    };

    if args.config.is_some()
        && let Some(table) = &args.table
    {
        let wanted = normalize(table);
        config
            .targets
            .retain(|target| normalize(&target.table) == wanted);
        if config.targets.is_empty() {
            bail!("Table '{table}' is not a target in the configuration");
        }
    }
    if let Some(store) = &args.store {
        config.store = store.clone();
    }
    for target in &mut config.targets {
        if let Some(mode) = args.mode {
            target.mode = mode;
        }
        if !args.unique_key.is_empty() {
            target.unique_key = args.unique_key.clone();
        }
    }
    if args.classify_plays && config.play_text.is_none() {
        config.play_text = Some(Default::default());
    }
    config.validate()?;
    Ok(config)
}

fn print_report(report: &BatchReport) {
    println!(
        "{}: {} row(s) appended, {} schema change(s)",
        report.table,
        report.rows_inserted,
        report.operations.len()
    );
    for operation in &report.operations {
        println!("  {operation}");
    }
}
