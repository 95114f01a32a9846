//! I/O helpers for batch input and table files.
//!
//! - **Batch input**: [`read_records`] accepts a JSON array of objects, a
//!   single object, or newline-delimited objects, from a file or from stdin
//!   when the path is `-`.
//! - **Table files**: [`open_csv_reader`] and [`csv_writer`] fix the CSV
//!   dialect the file store uses. Output always quotes every field so empty
//!   text survives a round trip.

use std::{
    fs::File,
    io::{self, BufReader, Read, Write},
    path::Path,
};

use anyhow::{Context, Result, bail};
use csv::QuoteStyle;
use serde_json::Value as JsonValue;

use crate::flatten::Record;

pub fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

pub fn open_csv_reader<R>(reader: R) -> csv::Reader<R>
where
    R: Read,
{
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(true)
        .double_quote(true)
        .flexible(false);
    builder.from_reader(reader)
}

pub fn csv_writer<W>(writer: W) -> csv::Writer<W>
where
    W: Write,
{
    let mut builder = csv::WriterBuilder::new();
    builder.quote_style(QuoteStyle::Always).double_quote(true);
    builder.from_writer(writer)
}

fn read_input(path: &Path) -> Result<String> {
    let mut contents = String::new();
    if is_dash(path) {
        io::stdin()
            .lock()
            .read_to_string(&mut contents)
            .context("Reading records from stdin")?;
    } else {
        let file = File::open(path).with_context(|| format!("Opening input file {path:?}"))?;
        BufReader::new(file)
            .read_to_string(&mut contents)
            .with_context(|| format!("Reading input file {path:?}"))?;
    }
    Ok(contents)
}

/// Reads a batch of records from `path` (`-` for stdin).
pub fn read_records(path: &Path) -> Result<Vec<Record>> {
    let contents = read_input(path)?;
    parse_records(&contents).with_context(|| format!("Parsing records from {path:?}"))
}

/// Parses a JSON array, a single object, or a stream of objects. Empty input
/// is an empty batch.
pub fn parse_records(contents: &str) -> Result<Vec<Record>> {
    let mut records = Vec::new();
    let stream = serde_json::Deserializer::from_str(contents).into_iter::<JsonValue>();
    for (idx, item) in stream.enumerate() {
        let item = item.with_context(|| format!("Invalid JSON at document {}", idx + 1))?;
        match item {
            JsonValue::Object(record) => records.push(record),
            JsonValue::Array(items) => {
                for (pos, element) in items.into_iter().enumerate() {
                    match element {
                        JsonValue::Object(record) => records.push(record),
                        other => bail!(
                            "Element {pos} of document {} is {}, expected an object",
                            idx + 1,
                            json_kind(&other)
                        ),
                    }
                }
            }
            other => bail!(
                "Document {} is {}, expected an object or an array of objects",
                idx + 1,
                json_kind(&other)
            ),
        }
    }
    Ok(records)
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}
