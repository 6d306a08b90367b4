use dam_storage::{
    InMemoryKeyValueStore, KeyValueStore, KvReadingRepository, ReadingRepository, reading_key,
};
use domain::{FacilityContext, PendingReading};
use std::collections::BTreeMap;
use std::sync::Arc;

fn sample_reading(template_id: &str, level: &str, date: &str) -> PendingReading {
    PendingReading {
        instrument_template_id: template_id.to_string(),
        instrument_type_id: "type-pz".to_string(),
        instrument_type_name: "Piezometer".to_string(),
        custom_name: format!("PZ-{}", template_id),
        values: BTreeMap::from([("Level".to_string(), level.to_string())]),
        notes: String::new(),
        date: date.to_string(),
    }
}

fn repository() -> (Arc<InMemoryKeyValueStore>, KvReadingRepository) {
    let store = Arc::new(InMemoryKeyValueStore::new());
    let repo = KvReadingRepository::new(store.clone());
    (store, repo)
}

#[tokio::test]
async fn upsert_keeps_last_value_per_template() {
    let (_, repo) = repository();
    let ctx = FacilityContext::new("Dam North", false);

    repo.upsert(&ctx, &[sample_reading("t1", "1,5", "2024-05-01")])
        .await
        .expect("first");
    repo.upsert(&ctx, &[sample_reading("t2", "3", "2024-05-01")])
        .await
        .expect("second");
    let merged = repo
        .upsert(&ctx, &[sample_reading("t1", "2,5", "2024-05-02")])
        .await
        .expect("overwrite");

    assert_eq!(merged.len(), 2);
    let loaded = repo.load_all(&ctx).await.expect("load");
    let t1: Vec<_> = loaded
        .iter()
        .filter(|reading| reading.instrument_template_id == "t1")
        .collect();
    assert_eq!(t1.len(), 1);
    assert_eq!(t1[0].values["Level"], "2,5");
    assert_eq!(t1[0].date, "2024-05-02");
}

#[tokio::test]
async fn facilities_are_isolated() {
    let (_, repo) = repository();
    let north = FacilityContext::new("North", false);
    let south = FacilityContext::new("South", false);

    repo.save(&north, &[sample_reading("t1", "1", "2024-05-01")])
        .await
        .expect("north");
    repo.save(&south, &[sample_reading("t9", "9", "2024-05-01")])
        .await
        .expect("south");

    let loaded = repo.load_all(&north).await.expect("load");
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].instrument_template_id, "t1");

    let removed = repo.clear_facility(&north).await.expect("clear");
    assert_eq!(removed, 1);
    assert!(repo.load_all(&north).await.expect("north").is_empty());
    assert_eq!(repo.load_all(&south).await.expect("south").len(), 1);
}

#[tokio::test]
async fn overlapping_facility_names_stay_separate() {
    let (store, repo) = repository();
    let north = FacilityContext::new("North", false);
    let annex = FacilityContext::new("North Annex", false);

    repo.save(&north, &[sample_reading("a", "1", "2024-05-01")])
        .await
        .expect("north");
    repo.save(&annex, &[sample_reading("b", "2", "2024-05-01")])
        .await
        .expect("annex");
    let suffixed = format!("{}:previous", reading_key("North"));
    store
        .set_item(
            &suffixed,
            r#"{"readings":[{"instrumentTemplateId":"c","values":{}}]}"#,
        )
        .await
        .expect("suffixed");

    let loaded = repo.load_all(&north).await.expect("load");
    let ids: Vec<_> = loaded
        .iter()
        .map(|reading| reading.instrument_template_id.as_str())
        .collect();
    assert_eq!(ids, vec!["a", "c"]);

    assert_eq!(
        repo.remove_templates(&north, &["b".to_string()])
            .await
            .expect("remove"),
        0
    );
    assert_eq!(repo.clear_facility(&north).await.expect("clear"), 2);
    let remaining = repo.load_all(&annex).await.expect("annex");
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].instrument_template_id, "b");
}

#[tokio::test]
async fn malformed_value_degrades_to_empty() {
    let (store, repo) = repository();
    let ctx = FacilityContext::new("North", false);
    store
        .set_item(&reading_key("North"), "{not json")
        .await
        .expect("write");

    assert!(repo.load(&ctx).await.expect("load").is_empty());
    assert!(repo.load_all(&ctx).await.expect("load all").is_empty());
}

#[tokio::test]
async fn clear_all_removes_every_reading_key_only() {
    let (store, repo) = repository();
    repo.save(
        &FacilityContext::new("North", false),
        &[sample_reading("t1", "1", "2024-05-01")],
    )
    .await
    .expect("north");
    repo.save(
        &FacilityContext::new("South", false),
        &[sample_reading("t2", "2", "2024-05-01")],
    )
    .await
    .expect("south");
    store
        .set_item("@inspection_images_North", "[]")
        .await
        .expect("inspection");

    let removed = repo.clear_all().await.expect("clear");
    assert_eq!(removed, 2);
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn remove_templates_keeps_other_readings() {
    let (store, repo) = repository();
    let ctx = FacilityContext::new("North", false);
    repo.save(
        &ctx,
        &[
            sample_reading("t1", "1", "2024-05-01"),
            sample_reading("t2", "2", "2024-05-01"),
        ],
    )
    .await
    .expect("save");

    let removed = repo
        .remove_templates(&ctx, &["t1".to_string()])
        .await
        .expect("remove");
    assert_eq!(removed, 1);
    let remaining = repo.load(&ctx).await.expect("load");
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].instrument_template_id, "t2");

    repo.remove_templates(&ctx, &["t2".to_string()])
        .await
        .expect("remove last");
    assert!(store.is_empty());
}

#[tokio::test]
async fn blank_facility_is_rejected() {
    let (_, repo) = repository();
    let err = repo
        .save(&FacilityContext::default(), &[])
        .await
        .expect_err("blank facility");
    assert_eq!(err.to_string(), "facility name required");
}
