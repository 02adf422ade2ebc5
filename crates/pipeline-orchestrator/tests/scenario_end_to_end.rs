//! End-to-end run against a filesystem object store and an on-disk sled
//! registry: 38 staged blobs (18 clean, 20 defective) under `rfb/json/`,
//! one job run, and the resulting bucket/metric-view state (§8 scenario 6).

use object_store_port::{FilesystemObjectStore, ObjectStore};
use pipeline_orchestrator::EvaluateJob;
use registry_store::{MoveRegistry, SchemaRegistry, StorageConnection};
use std::sync::Arc;
use tempfile::tempdir;

const SCHEMA: &str = r#"{
    "type": "record",
    "namespace": "rfb.json",
    "name": "R",
    "fields": [
        {"name": "name", "type": "string"},
        {"name": "age", "type": "int"},
        {"name": "salary", "type": "double"},
        {"name": "data_criacao", "type": "string"},
        {"name": "data_nascimento", "type": "string"},
        {"name": "hora_registro", "type": "string"},
        {"name": "tags", "type": {"type": "array", "items": "string"}},
        {"name": "codigo", "type": ["null", "int"], "default": null}
    ]
}"#;

fn clean_record(i: usize) -> String {
    let codigo = if i % 2 == 0 { "null".to_string() } else { i.to_string() };
    format!(
        r#"{{"name":"pessoa{i}","age":{age},"salary":{salary},
        "data_criacao":"2025-11-14","data_nascimento":"1995-01-10",
        "hora_registro":"12:22:00","tags":["a","b"],"codigo":{codigo}}}"#,
        i = i,
        age = 20 + (i % 40),
        salary = 1000.0 + i as f64,
        codigo = codigo,
    )
}

/// Four defect shapes, cycled over the 20 broken records: extra field,
/// missing required field, wrong type, and missing-plus-wrong-type.
fn defective_record(i: usize) -> String {
    match i % 4 {
        0 => format!(
            r#"{{"name":"x{i}","age":30,"salary":10.0,"data_criacao":"2025-01-01",
            "data_nascimento":"1990-01-01","hora_registro":"08:00:00","tags":["a"],
            "codigo":null,"extra_field":123}}"#
        ),
        1 => format!(
            r#"{{"name":"x{i}","age":30,"salary":10.0,"tags":["a"],"codigo":null}}"#
        ),
        2 => format!(
            r#"{{"name":"x{i}","age":"thirty","salary":10.0,"data_criacao":"2025-01-01",
            "data_nascimento":"1990-01-01","hora_registro":"08:00:00","tags":["a"],
            "codigo":null}}"#
        ),
        _ => format!(
            r#"{{"name":"x{i}","age":30,"salary":"not-a-number","tags":["a"]}}"#
        ),
    }
}

#[test]
fn scenario_6_end_to_end_routing_and_metrics() {
    let bucket_dir = tempdir().unwrap();
    let object_store: Arc<dyn ObjectStore> = Arc::new(FilesystemObjectStore::new(bucket_dir.path()));
    object_store.create_bucket("gold").unwrap();
    object_store.create_bucket("validated").unwrap();
    object_store.create_bucket("quarantine").unwrap();

    for i in 0..18 {
        object_store
            .put_object("gold", &format!("rfb/json/valid_{i}.json"), clean_record(i).as_bytes(), "application/json")
            .unwrap();
    }
    for i in 0..20 {
        object_store
            .put_object("gold", &format!("rfb/json/bad_{i}.json"), defective_record(i).as_bytes(), "application/json")
            .unwrap();
    }

    let db_dir = tempdir().unwrap();
    let storage = StorageConnection::open(db_dir.path()).unwrap();
    let session = storage.session();
    SchemaRegistry::initialize(&session).unwrap();
    MoveRegistry::initialize(&session).unwrap();
    SchemaRegistry::insert(&session, "rfb.json", SCHEMA).unwrap();

    let job = EvaluateJob::new(object_store.clone(), storage.clone(), "gold", "validated", "quarantine");
    let outcome = job.run("rfb.json").unwrap();

    assert_eq!(outcome.processed, 38);
    assert_eq!(outcome.validated, 18);
    assert_eq!(outcome.quarantined, 20);
    assert_eq!(outcome.skipped, 0);

    assert_eq!(object_store.iter_by_prefix("gold", "rfb/json").unwrap().count(), 0);
    assert_eq!(object_store.iter_by_prefix("validated", "rfb/json").unwrap().count(), 18);
    assert_eq!(object_store.iter_by_prefix("quarantine", "rfb/json").unwrap().count(), 20);

    let mut view = MoveRegistry::get_metric_view(&session).unwrap();
    view.sort_by(|a, b| a.new_bucket.cmp(&b.new_bucket));
    assert_eq!(view.len(), 2);
    assert_eq!(view[0].new_bucket, "quarantine");
    assert_eq!(view[0].total, 20);
    assert_eq!(view[1].new_bucket, "validated");
    assert_eq!(view[1].total, 18);
}
