mod common;

use sqlx::PgPool;
use std::sync::Arc;
use space_bio_engine::domain::entities::{Mission, Species};
use space_bio_engine::domain::filter::{FilterState, YearRange};
use space_bio_engine::domain::query::{Collection, Field};
use space_bio_engine::domain::store::{DataClient, StoreError};
use space_bio_engine::infrastructure::persistence::PgDataStore;

fn client(pool: PgPool) -> DataClient {
    DataClient::new(Arc::new(PgDataStore::new(Arc::new(pool))))
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_filter_is_translated_to_sql(pool: PgPool) {
    let client = client(pool);
    let table = || client.from(Collection::Publications);

    table()
        .insert(vec![
            common::draft("Crew bone loss", &[Species::Humans], &[Mission::Iss], 2020),
            common::draft("Root growth", &[Species::Plants], &[Mission::MoonSimulations], 2022),
        ])
        .await
        .unwrap();

    let filter = FilterState {
        species: [Species::Humans].into_iter().collect(),
        missions: [Mission::Iss].into_iter().collect(),
        year_range: YearRange::new(2015, 2025),
    };
    let found = filter.narrow(table().select()).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].title, "Crew bone loss");

    let out_of_range = FilterState {
        year_range: YearRange::new(2021, 2025),
        ..filter
    };
    assert!(out_of_range.narrow(table().select()).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_delete_by_id(pool: PgPool) {
    let client = client(pool);
    let table = || client.from(Collection::Publications);

    let inserted = table()
        .insert(vec![
            common::draft("Keep", &[Species::Humans], &[Mission::Iss], 2020),
            common::draft("Drop", &[Species::Plants], &[Mission::Iss], 2021),
        ])
        .await
        .unwrap();

    let removed = table().delete().eq(Field::Id, inserted[1].id).await.unwrap();
    assert_eq!(removed, 1);

    let remaining = table().select().await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, inserted[0].id);
}

#[sqlx::test(migrations = false)]
#[ignore = "requires DATABASE_URL"]
async fn test_missing_table_is_reported(pool: PgPool) {
    let client = client(pool);

    let result = client.health_check().await;

    assert!(matches!(result, Err(StoreError::MissingCollection(_))));
}
