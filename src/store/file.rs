//! Directory-backed table store.
//!
//! Each table lives in `<root>/<table>/` as a `schema.yaml` column list and a
//! `rows.csv` file whose header repeats the column names. Cells use the
//! column's text grammar; `\N` is null and text starting with a backslash is
//! stored with one extra leading backslash.
//!
//! A transaction buffers everything in memory. Commit writes the new table
//! into `<root>/.staging/<table>/` and swaps it into place with renames, so
//! readers only ever see the previous or the committed state. A swap cut
//! short leaves the previous table in `<root>/.staging/<table>.old/`; opening
//! the store or beginning a transaction on that table moves it back.

use std::{
    fs::{self, File},
    io::BufWriter,
    path::{Path, PathBuf},
};

use itertools::Itertools;
use log::{debug, info, warn};

use crate::{
    data::{Value, parse_typed_value},
    error::{StoreError, StoreResult},
    io_utils::{csv_writer, open_csv_reader},
    schema::{ColumnDef, StoreType, TableSchema},
};

use super::{
    TableStore, add_column_to, align_rows, ensure_identifier, validate_new_schema, widen_column_in,
};

const SCHEMA_FILE: &str = "schema.yaml";
const ROWS_FILE: &str = "rows.csv";
const STAGING_DIR: &str = ".staging";
const NULL_CELL: &str = "\\N";
const RETIRED_SUFFIX: &str = ".old";

#[derive(Debug)]
struct FileTxn {
    table: String,
    base: Option<TableSchema>,
    schema: Option<TableSchema>,
    /// Full row set, loaded on the first structural change.
    rows: Option<Vec<Vec<Value>>>,
    /// Rows appended while `rows` is still unloaded.
    appended: Vec<Vec<Value>>,
    structural: bool,
}

impl FileTxn {
    fn is_dirty(&self) -> bool {
        self.structural || !self.appended.is_empty()
    }
}

#[derive(Debug)]
pub struct FileStore {
    root: PathBuf,
    txn: Option<FileTxn>,
}

impl FileStore {
    /// Opens the store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| StoreError::io(&root, e))?;
        recover_all(&root)?;
        debug!("Opened file store at {root:?}");
        Ok(Self { root, txn: None })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn txn_for(&mut self, table: &str) -> StoreResult<(&Path, &mut FileTxn)> {
        let Self { root, txn } = self;
        match txn {
            None => Err(StoreError::NoTransaction),
            Some(txn) if txn.table != table => Err(StoreError::WrongTable {
                open: txn.table.clone(),
                requested: table.to_string(),
            }),
            Some(txn) => Ok((root.as_path(), txn)),
        }
    }
}

fn schema_path(dir: &Path) -> PathBuf {
    dir.join(SCHEMA_FILE)
}

fn rows_path(dir: &Path) -> PathBuf {
    dir.join(ROWS_FILE)
}

fn load_schema(root: &Path, table: &str) -> StoreResult<Option<TableSchema>> {
    let path = schema_path(&root.join(table));
    if !path.exists() {
        return Ok(None);
    }
    let contents = fs::read_to_string(&path).map_err(|e| StoreError::io(&path, e))?;
    let schema: TableSchema = serde_yaml::from_str(&contents)
        .map_err(|source| StoreError::SchemaFile { path, source })?;
    Ok(Some(schema))
}

fn read_rows(root: &Path, table: &str, schema: &TableSchema) -> StoreResult<Vec<Vec<Value>>> {
    let path = rows_path(&root.join(table));
    let file = File::open(&path).map_err(|e| StoreError::io(&path, e))?;
    let mut reader = open_csv_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| StoreError::csv(&path, e))?
        .clone();
    let header_matches = headers.len() == schema.len()
        && headers
            .iter()
            .zip(&schema.columns)
            .all(|(found, column)| found == column.name);
    if !header_matches {
        return Err(StoreError::CorruptRow {
            table: table.to_string(),
            row: 0,
            reason: format!(
                "header [{}] does not match schema [{}]",
                headers.iter().join(", "),
                schema.names().join(", ")
            ),
        });
    }

    let mut rows = Vec::new();
    for (row_idx, record) in reader.records().enumerate() {
        let record = record.map_err(|e| StoreError::csv(&path, e))?;
        if record.len() != schema.len() {
            return Err(StoreError::CorruptRow {
                table: table.to_string(),
                row: row_idx,
                reason: format!(
                    "expected {} cell(s), found {}",
                    schema.len(),
                    record.len()
                ),
            });
        }
        let mut row = Vec::with_capacity(schema.len());
        for (cell, column) in record.iter().zip(&schema.columns) {
            let value =
                decode_cell(cell, column.datatype).map_err(|reason| StoreError::CorruptRow {
                    table: table.to_string(),
                    row: row_idx,
                    reason: format!("column '{}': {reason}", column.name),
                })?;
            row.push(value);
        }
        rows.push(row);
    }
    Ok(rows)
}

fn encode_cell(value: &Value) -> String {
    match value {
        Value::Null => NULL_CELL.to_string(),
        Value::Text(text) if text.starts_with('\\') => format!("\\{text}"),
        other => other.as_display(),
    }
}

fn decode_cell(cell: &str, datatype: StoreType) -> Result<Value, String> {
    if cell == NULL_CELL {
        return Ok(Value::Null);
    }
    if datatype == StoreType::Text {
        let text = cell.strip_prefix('\\').unwrap_or(cell);
        return Ok(Value::Text(text.to_string()));
    }
    parse_typed_value(cell, datatype).map_err(|err| err.to_string())
}

fn write_rows_file(
    path: &Path,
    schema: &TableSchema,
    existing: Option<&Path>,
    rows: &[Vec<Value>],
) -> StoreResult<()> {
    let file = match existing {
        Some(source) => {
            fs::copy(source, path).map_err(|e| StoreError::io(source, e))?;
            fs::OpenOptions::new()
                .append(true)
                .open(path)
                .map_err(|e| StoreError::io(path, e))?
        }
        None => File::create(path).map_err(|e| StoreError::io(path, e))?,
    };
    let mut writer = csv_writer(BufWriter::new(file));
    if existing.is_none() {
        writer
            .write_record(schema.columns.iter().map(|c| c.name.as_str()))
            .map_err(|e| StoreError::csv(path, e))?;
    }
    for row in rows {
        writer
            .write_record(row.iter().map(encode_cell))
            .map_err(|e| StoreError::csv(path, e))?;
    }
    writer.flush().map_err(|e| StoreError::io(path, e))?;
    Ok(())
}

fn reset_dir(path: &Path) -> StoreResult<()> {
    if path.exists() {
        fs::remove_dir_all(path).map_err(|e| StoreError::io(path, e))?;
    }
    fs::create_dir_all(path).map_err(|e| StoreError::io(path, e))
}

fn retired_dir(root: &Path, table: &str) -> PathBuf {
    root.join(STAGING_DIR).join(format!("{table}{RETIRED_SUFFIX}"))
}

/// Settles a swap that did not finish: the retired copy replaces a missing
/// live directory, and is discarded when the live one is present.
fn recover_table(root: &Path, table: &str) -> StoreResult<()> {
    let retired = retired_dir(root, table);
    if !retired.exists() {
        return Ok(());
    }
    let live = root.join(table);
    if live.exists() {
        fs::remove_dir_all(&retired).map_err(|e| StoreError::io(&retired, e))?;
    } else {
        warn!("Restoring table {table} from {retired:?}");
        fs::rename(&retired, &live).map_err(|e| StoreError::io(&retired, e))?;
    }
    Ok(())
}

fn recover_all(root: &Path) -> StoreResult<()> {
    let staging_root = root.join(STAGING_DIR);
    if !staging_root.exists() {
        return Ok(());
    }
    let entries = fs::read_dir(&staging_root).map_err(|e| StoreError::io(&staging_root, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| StoreError::io(&staging_root, e))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if let Some(table) = name.strip_suffix(RETIRED_SUFFIX) {
            recover_table(root, table)?;
        }
    }
    Ok(())
}

/// Replaces `live` with `staged`, parking the previous table at `retired`
/// until the new one is in place. On failure `live` is put back.
fn swap_into_place(staged: &Path, live: &Path, retired: &Path) -> StoreResult<()> {
    let had_live = live.exists();
    if had_live {
        fs::rename(live, retired).map_err(|e| StoreError::io(live, e))?;
    }
    if let Err(err) = fs::rename(staged, live) {
        if had_live && let Err(restore) = fs::rename(retired, live) {
            warn!("Failed to restore {live:?} from {retired:?}: {restore}");
        }
        return Err(StoreError::io(staged, err));
    }
    if had_live {
        fs::remove_dir_all(retired).map_err(|e| StoreError::io(retired, e))?;
    }
    Ok(())
}

fn publish(root: &Path, txn: FileTxn) -> StoreResult<()> {
    let Some(schema) = txn.schema else {
        return Ok(());
    };
    let staging_root = root.join(STAGING_DIR);
    let staged = staging_root.join(&txn.table);
    let retired = retired_dir(root, &txn.table);
    let live = root.join(&txn.table);
    reset_dir(&staged)?;

    let yaml = serde_yaml::to_string(&schema).map_err(|source| StoreError::SchemaFile {
        path: schema_path(&staged),
        source,
    })?;
    let staged_schema = schema_path(&staged);
    fs::write(&staged_schema, yaml).map_err(|e| StoreError::io(&staged_schema, e))?;

    let staged_rows = rows_path(&staged);
    match &txn.rows {
        Some(rows) => write_rows_file(&staged_rows, &schema, None, rows)?,
        None if txn.base.is_some() => {
            write_rows_file(&staged_rows, &schema, Some(rows_path(&live).as_path()), &txn.appended)?
        }
        None => write_rows_file(&staged_rows, &schema, None, &txn.appended)?,
    }

    recover_table(root, &txn.table)?;
    swap_into_place(&staged, &live, &retired)
}

/// Loads the committed rows into the transaction and folds in pending appends.
fn materialize(root: &Path, txn: &mut FileTxn) -> StoreResult<()> {
    if txn.rows.is_none() {
        let mut rows = match &txn.base {
            Some(base) => read_rows(root, &txn.table, base)?,
            None => Vec::new(),
        };
        rows.append(&mut txn.appended);
        txn.rows = Some(rows);
    }
    Ok(())
}

fn table_missing(table: &str) -> StoreError {
    StoreError::TableNotFound {
        table: table.to_string(),
    }
}

impl TableStore for FileStore {
    fn describe(&self, table: &str) -> StoreResult<Option<TableSchema>> {
        match &self.txn {
            Some(txn) if txn.table == table => Ok(txn.schema.clone()),
            _ => load_schema(&self.root, table),
        }
    }

    fn create_table(&mut self, table: &str, schema: &TableSchema) -> StoreResult<()> {
        let (_, txn) = self.txn_for(table)?;
        validate_new_schema(table, schema)?;
        if let Some(existing) = &txn.schema {
            return if existing.same_structure(schema) {
                Ok(())
            } else {
                Err(StoreError::TableConflict {
                    table: table.to_string(),
                })
            };
        }
        txn.schema = Some(schema.clone().with_version());
        txn.rows = Some(Vec::new());
        txn.structural = true;
        debug!("Created table {table} with {} column(s)", schema.len());
        Ok(())
    }

    fn add_column(&mut self, table: &str, column: &ColumnDef) -> StoreResult<()> {
        let (root, txn) = self.txn_for(table)?;
        ensure_identifier(&column.name)?;
        let exists = match &txn.schema {
            Some(schema) => schema.column(&column.name).is_some(),
            None => return Err(table_missing(table)),
        };
        if exists {
            return Ok(());
        }
        materialize(root, txn)?;
        if let (Some(schema), Some(rows)) = (txn.schema.as_mut(), txn.rows.as_mut()) {
            add_column_to(table, schema, rows, column)?;
            txn.structural = true;
        }
        Ok(())
    }

    fn alter_column_type(
        &mut self,
        table: &str,
        column: &str,
        datatype: StoreType,
    ) -> StoreResult<()> {
        let (root, txn) = self.txn_for(table)?;
        let current = match &txn.schema {
            Some(schema) => schema.column_type(column),
            None => return Err(table_missing(table)),
        };
        if current == Some(datatype) {
            return Ok(());
        }
        materialize(root, txn)?;
        if let (Some(schema), Some(rows)) = (txn.schema.as_mut(), txn.rows.as_mut())
            && widen_column_in(table, schema, rows, column, datatype)?
        {
            txn.structural = true;
        }
        Ok(())
    }

    fn insert_rows(
        &mut self,
        table: &str,
        columns: &[String],
        rows: &[Vec<Value>],
    ) -> StoreResult<usize> {
        let (_, txn) = self.txn_for(table)?;
        let schema = txn.schema.as_ref().ok_or_else(|| table_missing(table))?;
        let aligned = align_rows(table, schema, columns, rows)?;
        let inserted = aligned.len();
        match txn.rows.as_mut() {
            Some(loaded) => loaded.extend(aligned),
            None => txn.appended.extend(aligned),
        }
        Ok(inserted)
    }

    fn scan(&self, table: &str) -> StoreResult<Vec<Vec<Value>>> {
        if let Some(txn) = &self.txn
            && txn.table == table
        {
            if let Some(rows) = &txn.rows {
                return Ok(rows.clone());
            }
            let schema = txn.schema.as_ref().ok_or_else(|| table_missing(table))?;
            let mut rows = read_rows(&self.root, table, schema)?;
            rows.extend(txn.appended.iter().cloned());
            return Ok(rows);
        }
        let schema = load_schema(&self.root, table)?.ok_or_else(|| table_missing(table))?;
        read_rows(&self.root, table, &schema)
    }

    fn tables(&self) -> StoreResult<Vec<String>> {
        let entries = fs::read_dir(&self.root).map_err(|e| StoreError::io(&self.root, e))?;
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::io(&self.root, e))?;
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if name.starts_with('.') || !schema_path(&entry.path()).exists() {
                continue;
            }
            names.push(name);
        }
        names.sort();
        Ok(names)
    }

    fn begin(&mut self, table: &str) -> StoreResult<()> {
        if let Some(open) = &self.txn {
            return Err(StoreError::TransactionOpen {
                table: open.table.clone(),
            });
        }
        ensure_identifier(table)?;
        recover_table(&self.root, table)?;
        let base = load_schema(&self.root, table)?;
        debug!("Begin transaction on {table}");
        self.txn = Some(FileTxn {
            table: table.to_string(),
            schema: base.clone(),
            base,
            rows: None,
            appended: Vec::new(),
            structural: false,
        });
        Ok(())
    }

    fn commit(&mut self) -> StoreResult<()> {
        let txn = self.txn.take().ok_or(StoreError::NoTransaction)?;
        if !txn.is_dirty() {
            debug!("Commit on {} had no changes", txn.table);
            return Ok(());
        }
        let table = txn.table.clone();
        publish(&self.root, txn)?;
        info!("Committed table {table} under {:?}", self.root);
        Ok(())
    }

    fn rollback(&mut self) -> StoreResult<()> {
        let txn = self.txn.take().ok_or(StoreError::NoTransaction)?;
        debug!("Rolled back transaction on {}", txn.table);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn players_schema() -> TableSchema {
        TableSchema::new(vec![
            ColumnDef::new("player_id", StoreType::Integer),
            ColumnDef::new("name", StoreType::Text),
        ])
    }

    fn names(schema: &TableSchema) -> Vec<String> {
        schema.names()
    }

    #[test]
    fn committed_table_survives_reopen() {
        let dir = tempdir().unwrap();
        {
            let mut store = FileStore::open(dir.path()).unwrap();
            store.begin("players").unwrap();
            store.create_table("players", &players_schema()).unwrap();
            store
                .insert_rows(
                    "players",
                    &names(&players_schema()),
                    &[vec![Value::Integer(1), Value::Text("Ana".into())]],
                )
                .unwrap();
            store.commit().unwrap();
        }

        let store = FileStore::open(dir.path()).unwrap();
        let schema = store.describe("players").unwrap().expect("table exists");
        assert!(schema.same_structure(&players_schema()));
        assert_eq!(schema.schema_version.as_deref(), Some("1.0.0"));
        assert_eq!(
            store.scan("players").unwrap(),
            vec![vec![Value::Integer(1), Value::Text("Ana".into())]]
        );
        assert_eq!(store.tables().unwrap(), vec!["players".to_string()]);
    }

    #[test]
    fn rollback_leaves_no_trace() {
        let dir = tempdir().unwrap();
        let mut store = FileStore::open(dir.path()).unwrap();
        store.begin("players").unwrap();
        store.create_table("players", &players_schema()).unwrap();
        assert!(store.describe("players").unwrap().is_some());
        store.rollback().unwrap();

        assert!(store.describe("players").unwrap().is_none());
        assert!(!dir.path().join("players").exists());
        assert!(store.tables().unwrap().is_empty());
    }

    #[test]
    fn cell_codec_distinguishes_null_empty_and_backslashes() {
        let dir = tempdir().unwrap();
        let schema = TableSchema::new(vec![
            ColumnDef::new("note", StoreType::Text),
            ColumnDef::new("tipoff", StoreType::Timestamp),
            ColumnDef::new("pct", StoreType::Float),
            ColumnDef::new("starter", StoreType::Boolean),
        ]);
        let tipoff = NaiveDate::from_ymd_opt(2024, 11, 4)
            .unwrap()
            .and_hms_milli_opt(19, 0, 0, 250)
            .unwrap();
        let rows = vec![
            vec![
                Value::Null,
                Value::Timestamp(tipoff),
                Value::Float(0.1),
                Value::Boolean(false),
            ],
            vec![Value::Text(String::new()), Value::Null, Value::Null, Value::Null],
            vec![Value::Text("\\N".into()), Value::Null, Value::Float(-2.5), Value::Null],
            vec![Value::Text("\\\\x".into()), Value::Null, Value::Null, Value::Boolean(true)],
        ];

        let mut store = FileStore::open(dir.path()).unwrap();
        store.begin("notes").unwrap();
        store.create_table("notes", &schema).unwrap();
        store.insert_rows("notes", &schema.names(), &rows).unwrap();
        store.commit().unwrap();

        assert_eq!(store.scan("notes").unwrap(), rows);
    }

    #[test]
    fn append_only_commit_keeps_existing_rows() {
        let dir = tempdir().unwrap();
        let mut store = FileStore::open(dir.path()).unwrap();
        let columns = names(&players_schema());

        store.begin("players").unwrap();
        store.create_table("players", &players_schema()).unwrap();
        store
            .insert_rows("players", &columns, &[vec![Value::Integer(1), Value::Null]])
            .unwrap();
        store.commit().unwrap();

        store.begin("players").unwrap();
        store
            .insert_rows(
                "players",
                &columns,
                &[vec![Value::Integer(2), Value::Text("Bo".into())]],
            )
            .unwrap();
        assert_eq!(store.scan("players").unwrap().len(), 2);
        store.commit().unwrap();

        assert_eq!(
            store.scan("players").unwrap(),
            vec![
                vec![Value::Integer(1), Value::Null],
                vec![Value::Integer(2), Value::Text("Bo".into())],
            ]
        );
        assert!(!dir.path().join(".staging").join("players").exists());
    }

    #[test]
    fn structural_changes_rewrite_existing_rows() {
        let dir = tempdir().unwrap();
        let mut store = FileStore::open(dir.path()).unwrap();

        store.begin("players").unwrap();
        store.create_table("players", &players_schema()).unwrap();
        store
            .insert_rows(
                "players",
                &names(&players_schema()),
                &[vec![Value::Integer(1), Value::Text("Ana".into())]],
            )
            .unwrap();
        store.commit().unwrap();

        store.begin("players").unwrap();
        store
            .insert_rows(
                "players",
                &names(&players_schema()),
                &[vec![Value::Integer(2), Value::Text("Bo".into())]],
            )
            .unwrap();
        store
            .alter_column_type("players", "player_id", StoreType::Text)
            .unwrap();
        store
            .add_column("players", &ColumnDef::new("pts", StoreType::Integer))
            .unwrap();
        store.commit().unwrap();

        let schema = store.describe("players").unwrap().unwrap();
        assert_eq!(schema.column_type("player_id"), Some(StoreType::Text));
        assert_eq!(schema.column_type("pts"), Some(StoreType::Integer));
        assert_eq!(
            store.scan("players").unwrap(),
            vec![
                vec![Value::Text("1".into()), Value::Text("Ana".into()), Value::Null],
                vec![Value::Text("2".into()), Value::Text("Bo".into()), Value::Null],
            ]
        );
    }

    #[test]
    fn mutations_outside_a_transaction_fail() {
        let dir = tempdir().unwrap();
        let mut store = FileStore::open(dir.path()).unwrap();
        assert!(matches!(
            store.create_table("players", &players_schema()),
            Err(StoreError::NoTransaction)
        ));
        assert!(matches!(store.commit(), Err(StoreError::NoTransaction)));
        assert!(matches!(
            store.begin("Bad Name"),
            Err(StoreError::InvalidIdentifier { .. })
        ));
    }

    #[test]
    fn corrupt_header_is_reported() {
        let dir = tempdir().unwrap();
        let mut store = FileStore::open(dir.path()).unwrap();
        store.begin("players").unwrap();
        store.create_table("players", &players_schema()).unwrap();
        store.commit().unwrap();

        fs::write(dir.path().join("players").join(ROWS_FILE), "\"id\",\"name\"\n").unwrap();
        assert!(matches!(
            store.scan("players"),
            Err(StoreError::CorruptRow { row: 0, .. })
        ));
    }

    fn commit_one_player(store: &mut FileStore, id: i64) {
        store.begin("players").unwrap();
        store.create_table("players", &players_schema()).unwrap();
        store
            .insert_rows(
                "players",
                &names(&players_schema()),
                &[vec![Value::Integer(id), Value::Text("Ana".into())]],
            )
            .unwrap();
        store.commit().unwrap();
    }

    #[test]
    fn failed_swap_puts_the_live_table_back() {
        let dir = tempdir().unwrap();
        let mut store = FileStore::open(dir.path()).unwrap();
        commit_one_player(&mut store, 1);

        let live = dir.path().join("players");
        let retired = retired_dir(dir.path(), "players");
        let missing = dir.path().join(STAGING_DIR).join("never_staged");
        assert!(swap_into_place(&missing, &live, &retired).is_err());

        assert!(live.join(SCHEMA_FILE).exists());
        assert!(!retired.exists());
        assert_eq!(store.scan("players").unwrap().len(), 1);
    }

    #[test]
    fn interrupted_swap_is_recovered_on_open() {
        let dir = tempdir().unwrap();
        {
            let mut store = FileStore::open(dir.path()).unwrap();
            commit_one_player(&mut store, 1);
        }
        let live = dir.path().join("players");
        let retired = retired_dir(dir.path(), "players");
        fs::rename(&live, &retired).unwrap();

        let mut store = FileStore::open(dir.path()).unwrap();
        assert!(!retired.exists());
        assert!(store.describe("players").unwrap().is_some());

        commit_one_player(&mut store, 2);
        assert_eq!(
            store.scan("players").unwrap(),
            vec![
                vec![Value::Integer(1), Value::Text("Ana".into())],
                vec![Value::Integer(2), Value::Text("Ana".into())],
            ]
        );
    }

    #[test]
    fn begin_recovers_a_table_parked_after_open() {
        let dir = tempdir().unwrap();
        let mut store = FileStore::open(dir.path()).unwrap();
        commit_one_player(&mut store, 1);
        let retired = retired_dir(dir.path(), "players");
        fs::rename(dir.path().join("players"), &retired).unwrap();

        store.begin("players").unwrap();
        assert!(store.describe("players").unwrap().is_some());
        store.rollback().unwrap();
        assert_eq!(store.scan("players").unwrap().len(), 1);
    }

    #[test]
    fn stale_retired_copy_is_discarded_when_live_exists() {
        let dir = tempdir().unwrap();
        {
            let mut store = FileStore::open(dir.path()).unwrap();
            commit_one_player(&mut store, 1);
        }
        let retired = retired_dir(dir.path(), "players");
        fs::create_dir_all(&retired).unwrap();
        fs::write(retired.join(SCHEMA_FILE), "stale").unwrap();

        let store = FileStore::open(dir.path()).unwrap();
        assert!(!retired.exists());
        assert_eq!(store.scan("players").unwrap().len(), 1);
    }
}
