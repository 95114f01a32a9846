//! Boundary conditions: empty and fieldless input, malformed JSON, names that
//! normalize oddly, oversized integers, nested lists, and text that looks
//! like the store's own null marker.

mod common;

use assert_cmd::Command;
use common::{TestWorkspace, records};
use dynappend::{
    config::{RecordMode, TargetConfig},
    data::Value,
    error::IngestError,
    pipeline::ingest_batch,
    schema::StoreType,
    store::TableStore,
};
use predicates::str::contains;
use serde_json::json;

#[test]
fn empty_stdin_is_an_empty_batch() {
    let workspace = TestWorkspace::new();
    Command::cargo_bin("dynappend")
        .expect("binary exists")
        .args([
            "ingest",
            "-i",
            "-",
            "-t",
            "players",
            "--store",
            workspace.store_dir().to_str().unwrap(),
        ])
        .write_stdin("")
        .assert()
        .success()
        .stdout(contains("players: 0 row(s) appended"));
}

#[test]
fn empty_batch_leaves_an_unreadable_table_alone() {
    let workspace = TestWorkspace::new();
    let mut store = workspace.open_store();
    ingest_batch(
        &mut store,
        &TargetConfig::new("players"),
        &records(json!([{"player_id": 1}])),
    )
    .unwrap();
    let schema_file = workspace.store_dir().join("players").join("schema.yaml");
    std::fs::write(&schema_file, "columns: [not, a, schema").unwrap();

    let report = ingest_batch(&mut store, &TargetConfig::new("players"), &[]).unwrap();
    assert_eq!(report.rows_inserted, 0);
    assert!(report.schema.is_none());
    assert_eq!(
        std::fs::read_to_string(&schema_file).unwrap(),
        "columns: [not, a, schema"
    );
}

#[test]
fn malformed_json_fails_before_touching_the_store() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("broken.json", r#"[{"player_id": 1},"#);
    Command::cargo_bin("dynappend")
        .expect("binary exists")
        .args([
            "ingest",
            "-i",
            input.to_str().unwrap(),
            "-t",
            "players",
            "--store",
            workspace.store_dir().to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(contains("Parsing records"));
    assert!(!workspace.store_dir().join("players").exists());
}

#[test]
fn fieldless_records_are_skipped() {
    let workspace = TestWorkspace::new();
    let mut store = workspace.open_store();
    let report = ingest_batch(
        &mut store,
        &TargetConfig::new("players"),
        &records(json!([{}, {}])),
    )
    .unwrap();
    assert_eq!(report.rows_inserted, 0);
    assert!(store.describe("players").unwrap().is_none());
}

#[test]
fn punctuation_only_field_name_is_rejected() {
    let workspace = TestWorkspace::new();
    let mut store = workspace.open_store();
    let err = ingest_batch(
        &mut store,
        &TargetConfig::new("players"),
        &records(json!([{"player_id": 1, "--": 2}])),
    )
    .unwrap_err();
    assert!(matches!(err, IngestError::EmptyName { ref raw } if raw == "--"));
    assert!(store.tables().unwrap().is_empty());
}

#[test]
fn unicode_letters_survive_normalization() {
    let workspace = TestWorkspace::new();
    let mut store = workspace.open_store();
    let report = ingest_batch(
        &mut store,
        &TargetConfig::new("players"),
        &records(json!([{"Año": 2025, "Équipe Name": "Boise"}])),
    )
    .unwrap();
    let schema = report.schema.unwrap();
    assert_eq!(schema.names(), vec!["año", "équipe_name"]);
    assert_eq!(store.scan("players").unwrap().len(), 1);
}

#[test]
fn accented_names_differing_only_in_case_share_a_column() {
    let workspace = TestWorkspace::new();
    let mut store = workspace.open_store();
    let target = TargetConfig::new("teams");
    ingest_batch(&mut store, &target, &records(json!([{"Équipe": "A"}]))).unwrap();
    ingest_batch(&mut store, &target, &records(json!([{"équipe": "B"}]))).unwrap();

    let schema = store.describe("teams").unwrap().unwrap();
    assert_eq!(schema.names(), vec!["équipe"]);
    assert_eq!(
        store.scan("teams").unwrap(),
        vec![vec![Value::Text("A".into())], vec![Value::Text("B".into())]]
    );
}

#[test]
fn accented_case_variants_in_one_batch_collide() {
    let workspace = TestWorkspace::new();
    let mut store = workspace.open_store();
    let err = ingest_batch(
        &mut store,
        &TargetConfig::new("teams"),
        &records(json!([{"Équipe": "A", "équipe": "B"}])),
    )
    .unwrap_err();
    assert!(matches!(err, IngestError::NameCollision { .. }));
}

#[test]
fn integers_beyond_i64_are_kept_as_text() {
    let workspace = TestWorkspace::new();
    let mut store = workspace.open_store();
    ingest_batch(
        &mut store,
        &TargetConfig::new("events"),
        &records(json!([{"event_id": 18_446_744_073_709_551_615_u64}])),
    )
    .unwrap();
    let schema = store.describe("events").unwrap().unwrap();
    assert_eq!(schema.column_type("event_id"), Some(StoreType::Text));
    assert_eq!(
        store.scan("events").unwrap(),
        vec![vec![Value::Text("18446744073709551615".into())]]
    );
}

#[test]
fn lists_are_stored_as_json_text_in_both_modes() {
    let workspace = TestWorkspace::new();
    let mut store = workspace.open_store();
    let batch = records(json!([{"game_id": 1, "periods": [{"home": 30}, {"home": 40}]}]));
    ingest_batch(&mut store, &TargetConfig::new("games_raw"), &batch).unwrap();
    ingest_batch(
        &mut store,
        &TargetConfig::new("games_flat").with_mode(RecordMode::Flat),
        &batch,
    )
    .unwrap();

    for table in ["games_raw", "games_flat"] {
        let rows = store.scan(table).unwrap();
        assert_eq!(rows[0][1], Value::Text(r#"[{"home":30},{"home":40}]"#.into()));
    }
}

#[test]
fn null_marker_lookalikes_round_trip_through_the_file_store() {
    let workspace = TestWorkspace::new();
    let mut store = workspace.open_store();
    ingest_batch(
        &mut store,
        &TargetConfig::new("notes"),
        &records(json!([
            {"note": "\\N"},
            {"note": ""},
            {"note": null},
            {"note": "C:\\path"}
        ])),
    )
    .unwrap();

    let reopened = workspace.open_store();
    assert_eq!(
        reopened.scan("notes").unwrap(),
        vec![
            vec![Value::Text("\\N".into())],
            vec![Value::Text(String::new())],
            vec![Value::Null],
            vec![Value::Text("C:\\path".into())],
        ]
    );
}
