mod common;

use chrono::Utc;
use std::sync::Arc;
use space_bio_engine::domain::entities::{Mission, Species};
use space_bio_engine::domain::query::{Collection, Direction, Field};
use space_bio_engine::domain::store::{DataClient, StoreError};
use space_bio_engine::infrastructure::persistence::LocalDataStore;
use space_bio_engine::infrastructure::storage::{KeyValueStorage, MemoryStorage};

fn client(storage: Arc<MemoryStorage>) -> DataClient {
    DataClient::new(Arc::new(LocalDataStore::new(storage)))
}

#[tokio::test]
async fn test_insert_then_select_round_trip() {
    let client = client(Arc::new(MemoryStorage::new()));
    let started = Utc::now();

    let inserted = client
        .from(Collection::Publications)
        .insert(vec![common::draft(
            "Crew bone loss",
            &[Species::Humans],
            &[Mission::Iss],
            2020,
        )])
        .await
        .unwrap();

    assert_eq!(inserted.len(), 1);
    assert!(!inserted[0].id.is_nil());
    assert!(inserted[0].created_at >= started);
    assert_eq!(inserted[0].created_at, inserted[0].updated_at);

    let found = client
        .from(Collection::Publications)
        .select()
        .eq(Field::Id, inserted[0].id)
        .await
        .unwrap();
    assert_eq!(found, inserted);
}

#[tokio::test]
async fn test_delete_removes_only_matching_records() {
    let client = client(Arc::new(MemoryStorage::new()));
    let table = || client.from(Collection::Publications);

    let inserted = table()
        .insert(vec![
            common::draft("First", &[Species::Humans], &[Mission::Iss], 2018),
            common::draft("Second", &[Species::Plants], &[Mission::Iss], 2019),
            common::draft("Third", &[Species::Animals], &[Mission::Iss], 2020),
        ])
        .await
        .unwrap();

    let removed = table()
        .delete()
        .eq(Field::Id, inserted[1].id)
        .await
        .unwrap();
    assert_eq!(removed, 1);

    let remaining = table().select().await.unwrap();
    assert_eq!(remaining.len(), 2);
    assert!(remaining.iter().all(|p| p.id != inserted[1].id));

    let removed_again = table()
        .delete()
        .eq(Field::Id, inserted[1].id)
        .await
        .unwrap();
    assert_eq!(removed_again, 0);
}

#[tokio::test]
async fn test_unfiltered_delete_is_rejected() {
    let client = client(Arc::new(MemoryStorage::new()));

    let result = client.from(Collection::Publications).delete().await;

    assert!(matches!(result, Err(StoreError::InvalidQuery(_))));
}

#[tokio::test]
async fn test_select_orders_and_narrows() {
    let client = client(Arc::new(MemoryStorage::new()));
    let table = || client.from(Collection::Publications);

    table()
        .insert(vec![
            common::draft("Old", &[Species::Humans], &[Mission::Iss], 2016),
            common::draft("Mid", &[Species::Plants], &[Mission::MarsSimulations], 2020),
            common::draft("New", &[Species::Plants], &[Mission::Iss], 2024),
        ])
        .await
        .unwrap();

    let by_year = table()
        .select()
        .order(Field::Year, Direction::Descending)
        .await
        .unwrap();
    let years: Vec<i32> = by_year.iter().map(|p| p.year).collect();
    assert_eq!(years, vec![2024, 2020, 2016]);

    let plants_on_iss = table()
        .select()
        .overlaps(Field::Species, ["Plants"])
        .overlaps(Field::Missions, ["ISS"])
        .await
        .unwrap();
    assert_eq!(plants_on_iss.len(), 1);
    assert_eq!(plants_on_iss[0].title, "New");

    let ranged = table()
        .select()
        .gte(Field::Year, 2017)
        .lte(Field::Year, 2022)
        .await
        .unwrap();
    assert_eq!(ranged.len(), 1);
    assert_eq!(ranged[0].title, "Mid");
}

#[tokio::test]
async fn test_legacy_records_are_rewritten_on_write() {
    let legacy = r#"[{
        "id": "6f1c1d2e-8a51-4d8e-9a57-0c0a4b1a2f10",
        "author_name": "Ada",
        "project_name": "Plant roots on the ISS",
        "summary": "Root growth",
        "project_link": "https://example.org/roots",
        "species": ["Plants"],
        "missions": ["ISS"],
        "year": 2019,
        "created_at": "2024-01-01T00:00:00Z",
        "updated_at": "2024-01-01T00:00:00Z"
    }]"#;
    let storage = Arc::new(MemoryStorage::with_item("publications", legacy));
    let client = client(storage.clone());

    let read = client.from(Collection::Publications).select().await.unwrap();
    assert_eq!(read.len(), 1);
    assert_eq!(read[0].title, "Plant roots on the ISS");

    client
        .from(Collection::Publications)
        .insert(vec![common::draft(
            "Crew bone loss",
            &[Species::Humans],
            &[Mission::Iss],
            2020,
        )])
        .await
        .unwrap();

    let raw = storage.get_item("publications").await.unwrap().unwrap();
    assert!(!raw.contains("project_name"));
    assert!(raw.contains("\"title\":\"Plant roots on the ISS\""));
}

#[tokio::test]
async fn test_corrupted_collection_reads_as_empty() {
    let storage = Arc::new(MemoryStorage::with_item("publications", "{not json"));
    let client = client(storage);

    let read = client.from(Collection::Publications).select().await.unwrap();

    assert!(read.is_empty());
}
