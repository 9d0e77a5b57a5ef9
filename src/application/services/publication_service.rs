//! Publication catalog service.

use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::{Map, Value, json};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::domain::entities::{MAX_YEAR, MIN_YEAR, NewPublication, Publication};
use crate::domain::events::PublicationEvent;
use crate::domain::filter::FilterState;
use crate::domain::query::{Collection, Field};
use crate::domain::store::{DataClient, StoreError};
use crate::error::AppError;
use crate::utils::text::is_web_link;

/// Service for creating, listing and deleting catalog publications.
///
/// All reads go through the filter engine so narrowing always happens in the
/// store query. Every successful mutation bumps the catalog revision and
/// publishes a [`PublicationEvent`] to subscribers.
pub struct PublicationService {
    client: DataClient,
    events: broadcast::Sender<PublicationEvent>,
    revision: AtomicU64,
}

impl PublicationService {
    /// Creates a new publication service.
    pub fn new(client: DataClient, events: broadcast::Sender<PublicationEvent>) -> Self {
        Self {
            client,
            events,
            revision: AtomicU64::new(0),
        }
    }

    /// Name of the storage backend in use.
    pub fn backend(&self) -> &'static str {
        self.client.backend()
    }

    /// Current catalog revision. Starts at zero and increases with every mutation.
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::SeqCst)
    }

    /// Subscribes to catalog change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<PublicationEvent> {
        self.events.subscribe()
    }

    /// Creates a publication.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if:
    /// - title, summary or research link is blank
    /// - research link is not an http(s) URL
    /// - no species or no mission is selected
    /// - year falls outside the supported span
    ///
    /// Returns [`AppError::Storage`] if the store rejects the insert.
    pub async fn create(&self, new: NewPublication) -> Result<Publication, AppError> {
        let new = check_invariants(new)?;

        let created = self
            .client
            .from(Collection::Publications)
            .insert(vec![new])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::internal("Store returned no inserted record", json!({})))?;

        tracing::info!(id = %created.id, title = %created.title, "Publication created");

        let revision = self.bump_revision();
        self.publish(PublicationEvent::Created {
            id: created.id,
            title: created.title.clone(),
            revision,
        });

        Ok(created)
    }

    /// Inserts a batch of publications in one store call.
    ///
    /// Every record is checked before anything is written; a single invalid
    /// record rejects the whole batch.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] naming the offending record index, or
    /// [`AppError::Storage`] if the insert fails.
    pub async fn import(&self, records: Vec<NewPublication>) -> Result<Vec<Publication>, AppError> {
        let records = records
            .into_iter()
            .enumerate()
            .map(|(index, record)| {
                check_invariants(record).map_err(|e| {
                    AppError::bad_request(
                        format!("Record {index} is invalid: {}", e.message()),
                        json!({ "index": index }),
                    )
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        if records.is_empty() {
            return Ok(Vec::new());
        }

        let inserted = self
            .client
            .from(Collection::Publications)
            .insert(records)
            .await?;

        let revision = self.bump_revision();
        for publication in &inserted {
            self.publish(PublicationEvent::Created {
                id: publication.id,
                title: publication.title.clone(),
                revision,
            });
        }

        Ok(inserted)
    }

    /// Lists publications visible under the given filter, newest first.
    ///
    /// An empty result is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Storage`] if the store cannot be read.
    pub async fn list(&self, filter: &FilterState) -> Result<Vec<Publication>, AppError> {
        let select = filter.narrow(self.client.from(Collection::Publications).select());
        let rows = select.await?;
        tracing::debug!(count = rows.len(), "Listed publications");
        Ok(rows)
    }

    /// Number of stored publications, whatever their year or facets.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Storage`] if the store cannot be read.
    pub async fn count(&self) -> Result<usize, AppError> {
        let rows = self.client.from(Collection::Publications).select().await?;
        Ok(rows.len())
    }

    /// Retrieves a publication by id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no publication has this id.
    pub async fn get(&self, id: Uuid) -> Result<Publication, AppError> {
        self.client
            .from(Collection::Publications)
            .select()
            .eq(Field::Id, id)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::not_found("Publication not found", json!({ "id": id })))
    }

    /// Deletes a publication by id. Other records are left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if nothing was removed.
    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let removed = self
            .client
            .from(Collection::Publications)
            .delete()
            .eq(Field::Id, id)
            .await?;

        if removed == 0 {
            return Err(AppError::not_found(
                "Publication not found",
                json!({ "id": id }),
            ));
        }

        tracing::info!(%id, "Publication deleted");

        let revision = self.bump_revision();
        self.publish(PublicationEvent::Deleted { id, revision });

        Ok(())
    }

    /// Checks that the backing store is reachable.
    pub async fn check_storage(&self) -> Result<(), StoreError> {
        self.client.health_check().await
    }

    fn bump_revision(&self) -> u64 {
        self.revision.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn publish(&self, event: PublicationEvent) {
        // No receivers is fine: nobody has a dashboard open.
        if self.events.send(event).is_err() {
            tracing::trace!("No subscribers for publication event");
        }
    }
}

/// Trims free-text fields and enforces the catalog invariants.
fn check_invariants(mut new: NewPublication) -> Result<NewPublication, AppError> {
    new.title = new.title.trim().to_string();
    new.summary = new.summary.trim().to_string();
    new.research_link = new.research_link.trim().to_string();
    new.author_name = new
        .author_name
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty());
    new.species.sort();
    new.species.dedup();
    new.missions.sort();
    new.missions.dedup();

    let mut fields = Map::new();
    let mut fail = |field: &str, message: &str| {
        fields.insert(field.to_string(), json!([message]));
    };

    if new.title.is_empty() {
        fail("title", "Title is required");
    }
    if new.summary.is_empty() {
        fail("summary", "Summary is required");
    }
    if new.research_link.is_empty() {
        fail("research_link", "Research link is required");
    } else if !is_web_link(&new.research_link) {
        fail("research_link", "Research link must be an http(s) URL");
    }
    if new.species.is_empty() {
        fail("species", "Select at least one species");
    }
    if new.missions.is_empty() {
        fail("missions", "Select at least one mission");
    }
    if !(MIN_YEAR..=MAX_YEAR).contains(&new.year) {
        fail("year", "Year must be between 2015 and 2025");
    }

    if fields.is_empty() {
        Ok(new)
    } else {
        Err(AppError::bad_request(
            "Validation failed",
            json!({ "fields": Value::Object(fields) }),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Mission, Species};
    use crate::domain::query::Predicate;
    use crate::domain::store::MockDataStore;
    use chrono::Utc;
    use std::sync::Arc;

    fn sample_new() -> NewPublication {
        NewPublication {
            title: "  Bone loss in orbit ".to_string(),
            author_name: Some("  ".to_string()),
            summary: "Long-duration flight effects".to_string(),
            research_link: "https://example.org/bone".to_string(),
            species: vec![Species::Humans],
            missions: vec![Mission::Iss],
            year: 2020,
        }
    }

    fn service(store: MockDataStore) -> (PublicationService, broadcast::Receiver<PublicationEvent>) {
        let (tx, rx) = broadcast::channel(16);
        let service = PublicationService::new(DataClient::new(Arc::new(store)), tx);
        (service, rx)
    }

    #[tokio::test]
    async fn test_create_success_publishes_event() {
        let mut store = MockDataStore::new();
        store
            .expect_insert()
            .withf(|collection, records| {
                *collection == Collection::Publications
                    && records.len() == 1
                    && records[0].title == "Bone loss in orbit"
                    && records[0].author_name.is_none()
            })
            .times(1)
            .returning(|_, records| {
                Ok(records
                    .into_iter()
                    .map(|r| Publication::from_new(r, Uuid::new_v4(), Utc::now()))
                    .collect())
            });

        let (service, mut rx) = service(store);
        let created = service.create(sample_new()).await.unwrap();

        assert_eq!(service.revision(), 1);
        assert_eq!(
            rx.try_recv().unwrap(),
            PublicationEvent::Created {
                id: created.id,
                title: created.title,
                revision: 1,
            }
        );
    }

    #[tokio::test]
    async fn test_create_rejects_empty_facets_before_store() {
        let mut store = MockDataStore::new();
        store.expect_insert().times(0);

        let (service, _rx) = service(store);
        let mut new = sample_new();
        new.species.clear();
        new.missions.clear();
        new.year = 2030;

        let err = service.create(new).await.unwrap_err();
        match err {
            AppError::Validation { details, .. } => {
                assert!(details["fields"]["species"].is_array());
                assert!(details["fields"]["missions"].is_array());
                assert!(details["fields"]["year"].is_array());
                assert!(details["fields"].get("title").is_none());
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        assert_eq!(service.revision(), 0);
    }

    #[tokio::test]
    async fn test_create_surfaces_store_error() {
        let mut store = MockDataStore::new();
        store
            .expect_insert()
            .returning(|_, _| Err(StoreError::MissingCollection("publications".into())));

        let (service, mut rx) = service(store);
        let err = service.create(sample_new()).await.unwrap_err();

        assert!(matches!(err, AppError::Storage { .. }));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_list_pushes_filter_into_query() {
        let mut filter = FilterState::default();
        filter.species.insert(Species::Plants);
        let expected = filter.query();

        let mut store = MockDataStore::new();
        store
            .expect_select()
            .withf(move |query| *query == expected)
            .times(1)
            .returning(|_| Ok(Vec::new()));

        let (service, _rx) = service(store);
        assert!(service.list(&filter).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_count_ignores_year_span() {
        let mut store = MockDataStore::new();
        store
            .expect_select()
            .withf(|query| query.predicates.is_empty() && query.order.is_none())
            .times(1)
            .returning(|_| {
                let mut old = sample_new();
                old.year = 2009;
                Ok(vec![
                    Publication::from_new(sample_new(), Uuid::new_v4(), Utc::now()),
                    Publication::from_new(old, Uuid::new_v4(), Utc::now()),
                ])
            });

        let (service, _rx) = service(store);
        assert_eq!(service.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let id = Uuid::new_v4();
        let mut store = MockDataStore::new();
        store
            .expect_select()
            .withf(move |query| {
                query.predicates == vec![Predicate::Eq(Field::Id, id.into())]
            })
            .returning(|_| Ok(Vec::new()));

        let (service, _rx) = service(store);
        assert!(matches!(
            service.get(id).await,
            Err(AppError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_delete_publishes_only_when_removed() {
        let mut store = MockDataStore::new();
        let mut removed = vec![0u64, 1u64].into_iter();
        store
            .expect_delete()
            .times(2)
            .returning(move |_| Ok(removed.next().unwrap_or(0)));

        let (service, mut rx) = service(store);
        let id = Uuid::new_v4();

        assert!(matches!(
            service.delete(id).await,
            Err(AppError::NotFound { .. })
        ));
        assert!(rx.try_recv().is_err());

        service.delete(id).await.unwrap();
        assert_eq!(
            rx.try_recv().unwrap(),
            PublicationEvent::Deleted { id, revision: 1 }
        );
    }

    #[tokio::test]
    async fn test_import_rejects_whole_batch_on_invalid_record() {
        let mut store = MockDataStore::new();
        store.expect_insert().times(0);

        let (service, _rx) = service(store);
        let mut bad = sample_new();
        bad.title = String::new();

        let err = service.import(vec![sample_new(), bad]).await.unwrap_err();
        assert!(err.message().contains("Record 1"));
    }
}
