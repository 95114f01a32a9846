use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use dynappend::config::{RecordMode, TargetConfig};
use dynappend::flatten::Record;
use dynappend::pipeline::ingest_batch;
use dynappend::store::{FileStore, MemoryStore};
use serde_json::json;

fn generate_box_scores(rows: usize, offset: usize) -> Vec<Record> {
    (0..rows)
        .map(|i| {
            let id = offset + i;
            let pts = if i % 7 == 0 { json!(f64::from(i as u32) + 0.5) } else { json!(i % 40) };
            let value = json!({
                "playerId": id,
                "gameId": id / 10,
                "pts": pts,
                "team": {"name": "Boise State", "conference": "MWC"},
                "starter": i % 2 == 0,
                "tipoff": "2024-11-04T19:00:00"
            });
            value.as_object().cloned().expect("object literal")
        })
        .collect()
}

fn bench_memory_store(c: &mut Criterion) {
    let target = TargetConfig::new("box_scores").with_mode(RecordMode::Flat);
    let batches: Vec<Vec<Record>> = (0..5).map(|b| generate_box_scores(1_000, b * 1_000)).collect();

    c.bench_function("memory_store_five_batches", |b| {
        b.iter_batched(
            MemoryStore::new,
            |mut store| {
                for batch in &batches {
                    ingest_batch(&mut store, &target, batch).expect("ingest");
                }
                store
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_file_store(c: &mut Criterion) {
    let target = TargetConfig::new("box_scores").with_mode(RecordMode::Flat);
    let batch = generate_box_scores(2_000, 0);

    c.bench_function("file_store_append_batch", |b| {
        b.iter_batched(
            || {
                let temp_dir = tempfile::tempdir().expect("temp dir");
                let mut store = FileStore::open(temp_dir.path()).expect("open store");
                ingest_batch(&mut store, &target, &batch).expect("seed");
                (temp_dir, store)
            },
            |(temp_dir, mut store)| {
                ingest_batch(&mut store, &target, &batch).expect("ingest");
                temp_dir
            },
            BatchSize::PerIteration,
        )
    });
}

criterion_group!(benches, bench_memory_store, bench_file_store);
criterion_main!(benches);
