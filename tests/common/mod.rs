#![allow(dead_code)]

use async_trait::async_trait;
use axum_test::TestServer;
use std::sync::Arc;
use tokio::sync::broadcast;
use space_bio_engine::application::services::PublicationService;
use space_bio_engine::domain::entities::{Mission, NewPublication, Publication, Species};
use space_bio_engine::domain::events::PublicationEvent;
use space_bio_engine::domain::store::{DataClient, DataStore};
use space_bio_engine::infrastructure::persistence::LocalDataStore;
use space_bio_engine::infrastructure::storage::{
    KeyValueStorage, MemoryStorage, StorageError, StorageResult,
};
use space_bio_engine::routes::build_router;
use space_bio_engine::state::AppState;

/// Storage whose every call fails, for exercising error paths.
pub struct FailingStorage;

#[async_trait]
impl KeyValueStorage for FailingStorage {
    async fn get_item(&self, _key: &str) -> StorageResult<Option<String>> {
        Err(StorageError::Io(std::io::Error::other("disk unavailable")))
    }

    async fn set_item(&self, _key: &str, _value: &str) -> StorageResult<()> {
        Err(StorageError::Io(std::io::Error::other("disk unavailable")))
    }

    async fn remove_item(&self, _key: &str) -> StorageResult<()> {
        Err(StorageError::Io(std::io::Error::other("disk unavailable")))
    }
}

pub fn create_service(storage: Arc<dyn KeyValueStorage>) -> Arc<PublicationService> {
    let store: Arc<dyn DataStore> = Arc::new(LocalDataStore::new(storage));
    let (events, _) = broadcast::channel::<PublicationEvent>(64);
    Arc::new(PublicationService::new(DataClient::new(store), events))
}

pub fn create_test_state() -> AppState {
    AppState::new(create_service(Arc::new(MemoryStorage::new())))
}

pub fn create_failing_state() -> AppState {
    AppState::new(create_service(Arc::new(FailingStorage)))
}

pub fn create_test_server(state: AppState) -> TestServer {
    TestServer::new(build_router(state, "static")).unwrap()
}

pub fn draft(title: &str, species: &[Species], missions: &[Mission], year: i32) -> NewPublication {
    NewPublication {
        title: title.to_string(),
        author_name: Some("Dr. Sarah Chen".to_string()),
        summary: format!("{title}: observations from orbit."),
        research_link: "https://osdr.nasa.gov/bio/repo/data/studies/OSD-379".to_string(),
        species: species.to_vec(),
        missions: missions.to_vec(),
        year,
    }
}

pub async fn seed(state: &AppState, new: NewPublication) -> Publication {
    state.publication_service.create(new).await.unwrap()
}
