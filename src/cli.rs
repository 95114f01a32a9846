use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::{DEFAULT_STORE_DIR, RecordMode};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Append semi-structured records to tables whose schema evolves with the data",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Ingest a JSON batch, creating, extending, or widening tables as needed
    Ingest(IngestArgs),
    /// Show the stored schema of a table
    Describe(DescribeArgs),
    /// Preview the first rows of a table in a formatted grid
    Preview(PreviewArgs),
    /// Classify one play-by-play description
    Classify(ClassifyArgs),
    /// List the tables in a store
    Tables(TablesArgs),
}

#[derive(Debug, Args)]
pub struct IngestArgs {
    /// JSON input: an array of objects, one object, or NDJSON (`-` for stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Target table (required without --config; selects one target with it)
    #[arg(short = 't', long = "table")]
    pub table: Option<String>,
    /// Store root directory (overrides the configuration file)
    #[arg(long)]
    pub store: Option<PathBuf>,
    /// Record shaping for every target
    #[arg(long, value_enum)]
    pub mode: Option<RecordMode>,
    /// YAML configuration listing targets and options
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,
    /// Comma-separated fields joined into a derived `unique_key` column
    #[arg(long = "unique-key", value_delimiter = ',')]
    pub unique_key: Vec<String>,
    /// Add play_type and player columns parsed from play text
    #[arg(long = "classify-plays")]
    pub classify_plays: bool,
}

#[derive(Debug, Args)]
pub struct DescribeArgs {
    /// Table to describe
    #[arg(short = 't', long = "table")]
    pub table: String,
    /// Store root directory
    #[arg(long, default_value = DEFAULT_STORE_DIR)]
    pub store: PathBuf,
}

#[derive(Debug, Args)]
pub struct PreviewArgs {
    /// Table to preview
    #[arg(short = 't', long = "table")]
    pub table: String,
    /// Store root directory
    #[arg(long, default_value = DEFAULT_STORE_DIR)]
    pub store: PathBuf,
    /// Number of rows to display
    #[arg(long, default_value_t = 10)]
    pub rows: usize,
}

#[derive(Debug, Args)]
pub struct ClassifyArgs {
    /// Play description text
    #[arg(long)]
    pub text: String,
    /// Treat the play as a shooting play
    #[arg(long)]
    pub shooting: bool,
}

#[derive(Debug, Args)]
pub struct TablesArgs {
    /// Store root directory
    #[arg(long, default_value = DEFAULT_STORE_DIR)]
    pub store: PathBuf,
}
