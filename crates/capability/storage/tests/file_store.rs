use dam_storage::{JsonFileKeyValueStore, KeyValueStore, KvReadingRepository, ReadingRepository};
use domain::{FacilityContext, PendingReading};
use std::collections::BTreeMap;
use std::sync::Arc;

#[tokio::test]
async fn file_store_survives_reopen() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("nested").join("store.json");

    let store = JsonFileKeyValueStore::open(&path).await.expect("open");
    store.set_item("a", "1").await.expect("set a");
    store.set_item("b", "2").await.expect("set b");
    store.remove_item("a").await.expect("remove a");

    let reopened = JsonFileKeyValueStore::open(&path).await.expect("reopen");
    assert_eq!(reopened.get_item("a").await.expect("get a"), None);
    assert_eq!(
        reopened.get_item("b").await.expect("get b").as_deref(),
        Some("2")
    );
    assert_eq!(reopened.all_keys().await.expect("keys"), vec!["b".to_string()]);
}

#[tokio::test]
async fn corrupt_file_is_reported() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("store.json");
    std::fs::write(&path, "not json").expect("write");

    let err = JsonFileKeyValueStore::open(&path)
        .await
        .err()
        .expect("corrupt");
    assert!(err.to_string().contains("corrupt"));
}

#[tokio::test]
async fn readings_persist_across_sessions() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("store.json");
    let ctx = FacilityContext::new("North", false);
    let reading = PendingReading {
        instrument_template_id: "t1".to_string(),
        instrument_type_id: "type-pz".to_string(),
        instrument_type_name: "Piezometer".to_string(),
        custom_name: "PZ-01".to_string(),
        values: BTreeMap::from([("Level".to_string(), "12,50".to_string())]),
        notes: "after rain".to_string(),
        date: "2024-05-01".to_string(),
    };

    {
        let store = Arc::new(JsonFileKeyValueStore::open(&path).await.expect("open"));
        let repo = KvReadingRepository::new(store);
        repo.upsert(&ctx, &[reading.clone()]).await.expect("save");
    }

    let store = Arc::new(JsonFileKeyValueStore::open(&path).await.expect("reopen"));
    let repo = KvReadingRepository::new(store);
    assert_eq!(repo.load_all(&ctx).await.expect("load"), vec![reading]);
}
