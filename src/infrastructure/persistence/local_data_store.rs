//! Data store backed by key-value storage.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::entities::legacy;
use crate::domain::entities::{NewPublication, Publication};
use crate::domain::query::{Collection, DeleteQuery, SelectQuery};
use crate::domain::store::{DataStore, StoreError};
use crate::infrastructure::storage::KeyValueStorage;

/// Stores each collection as a serialized JSON array under its own key.
///
/// Predicates are evaluated in memory with [`SelectQuery::evaluate`], so this
/// store honours exactly the same narrowing as the PostgreSQL store.
///
/// # Degraded Data
///
/// - A missing key reads as an empty collection.
/// - A value that is not a JSON array reads as an empty collection (logged),
///   and writes to it fail with [`StoreError::Malformed`] instead of
///   overwriting it.
/// - Array elements matching neither schema are skipped on read (logged) and
///   written back unchanged on every write.
///
/// Records written under the legacy project schema are normalized on read and
/// persisted in the current schema on the next write.
pub struct LocalDataStore {
    storage: Arc<dyn KeyValueStorage>,
    write_lock: Mutex<()>,
}

/// Decoded view of one stored collection.
#[derive(Default)]
struct Snapshot {
    records: Vec<Publication>,
    /// Elements that decode under neither schema, kept verbatim.
    undecodable: Vec<serde_json::Value>,
    /// Set when the stored value is not a JSON array at all.
    malformed: Option<String>,
}

impl LocalDataStore {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self {
            storage,
            write_lock: Mutex::new(()),
        }
    }

    async fn load(&self, collection: Collection) -> Result<Snapshot, StoreError> {
        let raw = self
            .storage
            .get_item(collection.name())
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        let Some(raw) = raw else {
            return Ok(Snapshot::default());
        };

        let values: Vec<serde_json::Value> = match serde_json::from_str(&raw) {
            Ok(values) => values,
            Err(e) => {
                warn!(
                    collection = %collection,
                    error = %e,
                    "Stored collection is malformed, treating as empty"
                );
                return Ok(Snapshot {
                    malformed: Some(e.to_string()),
                    ..Snapshot::default()
                });
            }
        };

        let mut snapshot = Snapshot::default();
        for value in values {
            match legacy::normalize(value.clone()) {
                Ok(publication) => snapshot.records.push(publication),
                Err(e) => {
                    warn!(collection = %collection, error = %e, "Skipping undecodable record");
                    snapshot.undecodable.push(value);
                }
            }
        }

        debug!(
            collection = %collection,
            loaded = snapshot.records.len(),
            skipped = snapshot.undecodable.len(),
            "Loaded collection from storage"
        );

        Ok(snapshot)
    }

    /// Loads a collection that is about to be rewritten.
    async fn load_for_write(&self, collection: Collection) -> Result<Snapshot, StoreError> {
        let snapshot = self.load(collection).await?;
        if let Some(reason) = &snapshot.malformed {
            return Err(StoreError::Malformed(format!(
                "stored {collection} is not a JSON array, refusing to overwrite: {reason}"
            )));
        }
        Ok(snapshot)
    }

    async fn save(
        &self,
        collection: Collection,
        records: &[Publication],
        undecodable: &[serde_json::Value],
    ) -> Result<(), StoreError> {
        let mut values = records
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        values.extend(undecodable.iter().cloned());

        let encoded =
            serde_json::to_string(&values).map_err(|e| StoreError::Backend(e.to_string()))?;

        self.storage
            .set_item(collection.name(), &encoded)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }
}

#[async_trait]
impl DataStore for LocalDataStore {
    fn backend(&self) -> &'static str {
        "local"
    }

    async fn insert(
        &self,
        collection: Collection,
        records: Vec<NewPublication>,
    ) -> Result<Vec<Publication>, StoreError> {
        let _guard = self.write_lock.lock().await;

        let mut snapshot = self.load_for_write(collection).await?;
        let now = Utc::now();
        let inserted: Vec<Publication> = records
            .into_iter()
            .map(|record| Publication::from_new(record, Uuid::new_v4(), now))
            .collect();

        snapshot.records.extend(inserted.iter().cloned());
        self.save(collection, &snapshot.records, &snapshot.undecodable)
            .await?;

        debug!(collection = %collection, count = inserted.len(), "Inserted records");
        Ok(inserted)
    }

    async fn select(&self, query: SelectQuery) -> Result<Vec<Publication>, StoreError> {
        let snapshot = self.load(query.collection).await?;
        Ok(query.evaluate(&snapshot.records))
    }

    async fn delete(&self, query: DeleteQuery) -> Result<u64, StoreError> {
        let _guard = self.write_lock.lock().await;

        let snapshot = self.load_for_write(query.collection).await?;
        let before = snapshot.records.len();
        let kept: Vec<Publication> = snapshot
            .records
            .into_iter()
            .filter(|p| !query.matches(p))
            .collect();
        let removed = (before - kept.len()) as u64;

        if removed > 0 {
            self.save(query.collection, &kept, &snapshot.undecodable)
                .await?;
        }

        debug!(collection = %query.collection, removed, "Deleted records");
        Ok(removed)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        self.storage
            .get_item(Collection::Publications.name())
            .await
            .map(|_| ())
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Mission, Species};
    use crate::domain::query::{Field, Predicate, Value};
    use crate::infrastructure::storage::MemoryStorage;

    fn draft(title: &str) -> NewPublication {
        NewPublication {
            title: title.to_string(),
            author_name: None,
            summary: "summary".to_string(),
            research_link: "https://example.org".to_string(),
            species: vec![Species::Animals],
            missions: vec![Mission::MoonSimulations],
            year: 2021,
        }
    }

    #[tokio::test]
    async fn test_malformed_collection_reads_as_empty() {
        let storage = Arc::new(MemoryStorage::with_item("publications", "{not json"));
        let store = LocalDataStore::new(storage);

        let rows = store
            .select(SelectQuery::new(Collection::Publications))
            .await
            .unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_undecodable_records_are_skipped() {
        let raw = r#"[
            {"garbage": true},
            {
                "id": "6f1c1d2e-8a51-4d8e-9a57-0c0a4b1a2f10",
                "author_name": "Ada",
                "project_name": "Roots",
                "summary": "s",
                "project_link": "https://example.org/roots",
                "species": ["Plants"],
                "missions": ["ISS"],
                "year": 2019,
                "created_at": "2024-01-01T00:00:00Z",
                "updated_at": "2024-01-01T00:00:00Z"
            }
        ]"#;
        let storage = Arc::new(MemoryStorage::with_item("publications", raw));
        let store = LocalDataStore::new(storage);

        let rows = store
            .select(SelectQuery::new(Collection::Publications))
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].title, "Roots");
    }

    #[tokio::test]
    async fn test_undecodable_records_survive_writes() {
        let raw = r#"[{"species":["Fungi"],"title":"Fungi study"}]"#;
        let storage = Arc::new(MemoryStorage::with_item("publications", raw));
        let store = LocalDataStore::new(storage.clone());

        let inserted = store
            .insert(Collection::Publications, vec![draft("New")])
            .await
            .unwrap();

        let persisted = storage.get_item("publications").await.unwrap().unwrap();
        assert!(persisted.contains("Fungi study"));
        assert!(persisted.contains("\"title\":\"New\""));

        let mut query = DeleteQuery::new(Collection::Publications);
        query
            .predicates
            .push(Predicate::Eq(Field::Id, Value::Uuid(inserted[0].id)));
        assert_eq!(store.delete(query).await.unwrap(), 1);

        let persisted = storage.get_item("publications").await.unwrap().unwrap();
        assert!(persisted.contains("Fungi study"));
        assert!(!persisted.contains("\"title\":\"New\""));
    }

    #[tokio::test]
    async fn test_malformed_collection_is_not_overwritten() {
        let raw = r#"[{"id":1}, oops"#;
        let storage = Arc::new(MemoryStorage::with_item("publications", raw));
        let store = LocalDataStore::new(storage.clone());

        let result = store
            .insert(Collection::Publications, vec![draft("New")])
            .await;
        assert!(matches!(result, Err(StoreError::Malformed(_))));

        let mut query = DeleteQuery::new(Collection::Publications);
        query
            .predicates
            .push(Predicate::Eq(Field::Id, Value::Uuid(Uuid::new_v4())));
        assert!(matches!(
            store.delete(query).await,
            Err(StoreError::Malformed(_))
        ));

        let persisted = storage.get_item("publications").await.unwrap();
        assert_eq!(persisted.as_deref(), Some(raw));
    }

    #[tokio::test]
    async fn test_write_rewrites_legacy_records_canonically() {
        let raw = r#"[{
            "id": "6f1c1d2e-8a51-4d8e-9a57-0c0a4b1a2f10",
            "author_name": "Ada",
            "project_name": "Roots",
            "summary": "s",
            "project_link": "https://example.org/roots",
            "species": ["Plants"],
            "missions": ["ISS"],
            "year": 2019,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        }]"#;
        let storage = Arc::new(MemoryStorage::with_item("publications", raw));
        let store = LocalDataStore::new(storage.clone());

        store
            .insert(Collection::Publications, vec![draft("New")])
            .await
            .unwrap();

        let persisted = storage.get_item("publications").await.unwrap().unwrap();
        assert!(!persisted.contains("project_name"));
        assert!(persisted.contains("\"research_link\":\"https://example.org/roots\""));
    }

    #[tokio::test]
    async fn test_delete_without_match_leaves_storage_untouched() {
        let storage = Arc::new(MemoryStorage::new());
        let store = LocalDataStore::new(storage.clone());

        let mut query = DeleteQuery::new(Collection::Publications);
        query
            .predicates
            .push(Predicate::Eq(Field::Id, Value::Uuid(Uuid::new_v4())));

        assert_eq!(store.delete(query).await.unwrap(), 0);
        assert_eq!(storage.get_item("publications").await.unwrap(), None);
    }
}
