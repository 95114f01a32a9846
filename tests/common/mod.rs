#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use dynappend::{flatten::Record, store::FileStore};
use serde_json::Value as JsonValue;
use tempfile::{TempDir, tempdir};

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Creates a fresh scratch directory for the current test case.
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    /// Returns the root path for all files owned by this workspace.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Directory the file store lives in.
    pub fn store_dir(&self) -> PathBuf {
        self.temp_dir.path().join("store")
    }

    pub fn open_store(&self) -> FileStore {
        FileStore::open(self.store_dir()).expect("open file store")
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }
}

/// Converts a JSON array literal into batch records.
pub fn records(value: JsonValue) -> Vec<Record> {
    value
        .as_array()
        .expect("array literal")
        .iter()
        .map(|item| item.as_object().cloned().expect("object literal"))
        .collect()
}
