mod common;

use std::fs;

use common::{TestWorkspace, records};
use dynappend::{
    config::{RecordMode, TargetConfig},
    error::IngestError,
    pipeline::{ingest_all, ingest_batch},
    schema::StoreType,
    store::TableStore,
};
use serde_json::json;

fn seed(workspace: &TestWorkspace) {
    let mut store = workspace.open_store();
    ingest_batch(
        &mut store,
        &TargetConfig::new("players"),
        &records(json!([{"player_id": 1, "pts": 10}, {"player_id": 2, "pts": 8}])),
    )
    .expect("seed batch");
}

#[test]
fn failed_insert_leaves_schema_and_rows_untouched() {
    let workspace = TestWorkspace::new();
    seed(&workspace);
    let table_dir = workspace.store_dir().join("players");
    let schema_before = fs::read_to_string(table_dir.join("schema.yaml")).unwrap();
    let rows_before = fs::read_to_string(table_dir.join("rows.csv")).unwrap();

    let mut store = workspace.open_store();
    let err = ingest_batch(
        &mut store,
        &TargetConfig::new("players"),
        &records(json!([
            {"player_id": 3, "pts": 9_007_199_254_740_993_i64, "blk": 1},
            {"player_id": 4, "pts": 0.5}
        ])),
    )
    .unwrap_err();

    match err {
        IngestError::TypeCoercionFailure {
            row,
            column,
            target,
            ..
        } => {
            assert_eq!(row, 0);
            assert_eq!(column, "pts");
            assert_eq!(target, StoreType::Float);
        }
        other => panic!("unexpected error {other:?}"),
    }

    assert_eq!(
        fs::read_to_string(table_dir.join("schema.yaml")).unwrap(),
        schema_before
    );
    assert_eq!(fs::read_to_string(table_dir.join("rows.csv")).unwrap(), rows_before);

    let reopened = workspace.open_store();
    let schema = reopened.describe("players").unwrap().unwrap();
    assert_eq!(schema.names(), vec!["player_id", "pts"]);
    assert_eq!(schema.column_type("pts"), Some(StoreType::Integer));
    assert_eq!(reopened.scan("players").unwrap().len(), 2);
}

#[test]
fn retrying_a_failed_batch_after_fixing_it_succeeds() {
    let workspace = TestWorkspace::new();
    seed(&workspace);
    let mut store = workspace.open_store();
    let target = TargetConfig::new("players");

    let bad = records(json!([{"player_id": 3, "Pts": 1, "pts": 2}]));
    assert!(matches!(
        ingest_batch(&mut store, &target, &bad),
        Err(IngestError::NameCollision { .. })
    ));

    let report = ingest_batch(
        &mut store,
        &target,
        &records(json!([{"player_id": 3, "pts": 2}])),
    )
    .unwrap();
    assert_eq!(report.rows_inserted, 1);
    assert_eq!(store.scan("players").unwrap().len(), 3);
}

#[test]
fn fan_out_commits_earlier_targets_before_a_failure() {
    let workspace = TestWorkspace::new();
    seed(&workspace);
    let mut store = workspace.open_store();
    let targets = vec![
        TargetConfig::new("audit"),
        TargetConfig::new("players").with_mode(RecordMode::Flat),
    ];

    // Flattening turns `team.name` into a second `team_name` field.
    let err = ingest_all(
        &mut store,
        &targets,
        &records(json!([{"player_id": 5, "team": {"name": "BSU"}, "team_name": "Broncos"}])),
    )
    .unwrap_err();
    assert!(matches!(err, IngestError::NameCollision { .. }));

    let audit = store.describe("audit").unwrap().expect("audit committed");
    assert_eq!(audit.names(), vec!["player_id", "team", "team_name"]);
    assert_eq!(store.scan("audit").unwrap().len(), 1);
    assert_eq!(store.scan("players").unwrap().len(), 2);
}

#[test]
fn no_staging_directories_survive_a_commit_or_rollback() {
    let workspace = TestWorkspace::new();
    seed(&workspace);
    let mut store = workspace.open_store();
    let _ = ingest_batch(
        &mut store,
        &TargetConfig::new("players"),
        &records(json!([{"player_id": 9_007_199_254_740_993_i64}, {"player_id": 0.5}])),
    )
    .unwrap_err();

    let staging = workspace.store_dir().join(".staging");
    let leftovers = match fs::read_dir(&staging) {
        Ok(entries) => entries.count(),
        Err(_) => 0,
    };
    assert_eq!(leftovers, 0);
    assert_eq!(store.tables().unwrap(), vec!["players"]);
}
