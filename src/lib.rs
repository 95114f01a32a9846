pub mod append;
pub mod batch;
pub mod cli;
pub mod config;
pub mod data;
pub mod describe;
pub mod error;
pub mod flatten;
pub mod ingest;
pub mod io_utils;
pub mod normalize;
pub mod pipeline;
pub mod play_text;
pub mod preview;
pub mod reconcile;
pub mod schema;
pub mod store;
pub mod table;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, debug, info};

use crate::{
    cli::{Cli, Commands},
    store::{FileStore, TableStore},
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("dynappend", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Ingest(args) => ingest::execute(&args),
        Commands::Describe(args) => describe::execute(&args),
        Commands::Preview(args) => preview::execute(&args),
        Commands::Classify(args) => handle_classify(&args),
        Commands::Tables(args) => handle_tables(&args),
    }
}

fn handle_classify(args: &cli::ClassifyArgs) -> Result<()> {
    let result = play_text::classify(&args.text, args.shooting);
    debug!("Classified {:?} (shooting: {})", args.text, args.shooting);
    println!("category: {}", result.category);
    println!("actor: {}", result.actor);
    Ok(())
}

fn handle_tables(args: &cli::TablesArgs) -> Result<()> {
    let store = FileStore::open(&args.store)
        .with_context(|| format!("Opening store at {:?}", args.store))?;
    let tables = store
        .tables()
        .with_context(|| format!("Listing tables in {:?}", args.store))?;
    for name in &tables {
        println!("{name}");
    }
    info!("{} table(s) in {:?}", tables.len(), args.store);
    Ok(())
}
