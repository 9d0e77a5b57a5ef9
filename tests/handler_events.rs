mod common;

use axum_test::TestServer;
use std::future::IntoFuture;
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use space_bio_engine::application::services::PublicationService;
use space_bio_engine::domain::entities::{Mission, Species};
use space_bio_engine::domain::events::PublicationEvent;
use space_bio_engine::domain::store::{DataClient, DataStore};
use space_bio_engine::infrastructure::persistence::LocalDataStore;
use space_bio_engine::infrastructure::storage::MemoryStorage;
use space_bio_engine::routes::build_router;
use space_bio_engine::state::AppState;

struct EventHarness {
    server: TestServer,
    service: Arc<PublicationService>,
    events: broadcast::Sender<PublicationEvent>,
    shutdown: watch::Sender<bool>,
}

fn harness(capacity: usize) -> EventHarness {
    let store: Arc<dyn DataStore> = Arc::new(LocalDataStore::new(Arc::new(MemoryStorage::new())));
    let (events, _) = broadcast::channel(capacity);
    let service = Arc::new(PublicationService::new(
        DataClient::new(store),
        events.clone(),
    ));
    let (shutdown, shutdown_rx) = watch::channel(false);
    let state = AppState::new(service.clone()).with_shutdown(shutdown_rx);
    let server = TestServer::new(build_router(state, "static")).unwrap();

    EventHarness {
        server,
        service,
        events,
        shutdown,
    }
}

async fn until_subscribed(events: &broadcast::Sender<PublicationEvent>) {
    while events.receiver_count() == 0 {
        tokio::task::yield_now().await;
    }
}

async fn until_drained(events: &broadcast::Sender<PublicationEvent>) {
    while !events.is_empty() {
        tokio::task::yield_now().await;
    }
}

#[tokio::test]
async fn test_create_emits_publication_event() {
    let h = harness(16);

    let driver = async {
        until_subscribed(&h.events).await;
        let created = h
            .service
            .create(common::draft("Crew bone loss", &[Species::Humans], &[Mission::Iss], 2020))
            .await
            .unwrap();
        until_drained(&h.events).await;
        h.shutdown.send_replace(true);
        created
    };

    let (response, created) = tokio::join!(h.server.get("/api/events").into_future(), driver);

    response.assert_status_ok();
    let body = response.text();
    assert!(body.contains("event: publication"));
    assert!(body.contains("\"type\":\"created\""));
    assert!(body.contains(&format!("\"id\":\"{}\"", created.id)));
    assert!(body.contains("\"revision\":1"));
}

#[tokio::test]
async fn test_lagging_subscriber_is_told_to_resync() {
    let h = harness(1);

    let driver = async {
        until_subscribed(&h.events).await;
        for title in ["First", "Second", "Third", "Fourth"] {
            h.service
                .create(common::draft(title, &[Species::Plants], &[Mission::Iss], 2021))
                .await
                .unwrap();
        }
        until_drained(&h.events).await;
        h.shutdown.send_replace(true);
    };

    let (response, ()) = tokio::join!(h.server.get("/api/events").into_future(), driver);

    response.assert_status_ok();
    let body = response.text();
    assert!(body.contains("event: resync"));
    assert!(body.contains("\"title\":\"Fourth\""));
}

#[tokio::test]
async fn test_stream_ends_on_shutdown() {
    let h = harness(16);

    let driver = async {
        until_subscribed(&h.events).await;
        h.shutdown.send_replace(true);
    };

    let (response, ()) = tokio::join!(h.server.get("/api/events").into_future(), driver);

    response.assert_status_ok();
    assert!(!response.text().contains("event: publication"));
}
