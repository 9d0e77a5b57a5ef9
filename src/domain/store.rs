//! Data-access contract and the chainable client built on top of it.
//!
//! Every backing store implements [`DataStore`]. Callers never talk to a store
//! directly; they go through [`DataClient`], which offers the familiar
//! `from(collection).select().eq(..).order(..)` shape regardless of whether
//! the records live in PostgreSQL or in local key-value storage.
//!
//! # Example
//!
//! ```rust,ignore
//! let rows = client
//!     .from(Collection::Publications)
//!     .select()
//!     .overlaps(Field::Species, ["Humans"])
//!     .gte(Field::Year, 2018)
//!     .order(Field::CreatedAt, Direction::Descending)
//!     .await?;
//! ```

use async_trait::async_trait;
use std::future::{Future, IntoFuture};
use std::pin::Pin;
use std::sync::Arc;

use super::entities::{NewPublication, Publication};
use super::query::{
    Collection, DeleteQuery, Direction, Field, Order, Predicate, SelectQuery, Value,
};

/// Errors surfaced by a [`DataStore`].
///
/// Stores never panic or throw across this boundary; every failure is
/// returned as one of these values.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    #[error("relation \"{0}\" does not exist")]
    MissingCollection(String),

    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("malformed stored data: {0}")]
    Malformed(String),

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Stable machine-readable identifier for the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            StoreError::MissingCollection(_) => "missing_collection",
            StoreError::Unavailable(_) => "unavailable",
            StoreError::Malformed(_) => "malformed",
            StoreError::InvalidQuery(_) => "invalid_query",
            StoreError::Backend(_) => "backend",
        }
    }
}

/// Backing store for catalog records.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgDataStore`] - PostgreSQL
/// - [`crate::infrastructure::persistence::LocalDataStore`] - key-value storage
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DataStore: Send + Sync {
    /// Short backend name for logs and health output.
    fn backend(&self) -> &'static str;

    /// Appends records, assigning ids and timestamps.
    ///
    /// Returns the records as stored.
    async fn insert(
        &self,
        collection: Collection,
        records: Vec<NewPublication>,
    ) -> Result<Vec<Publication>, StoreError>;

    /// Returns every record matching the query. No pagination.
    async fn select(&self, query: SelectQuery) -> Result<Vec<Publication>, StoreError>;

    /// Removes matching records and returns how many were removed.
    async fn delete(&self, query: DeleteQuery) -> Result<u64, StoreError>;

    /// Checks the store for liveness.
    async fn health_check(&self) -> Result<(), StoreError>;
}

type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send + 'a>>;

/// Store-agnostic entry point used by services and tools.
#[derive(Clone)]
pub struct DataClient {
    store: Arc<dyn DataStore>,
}

impl DataClient {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }

    /// Name of the underlying backend.
    pub fn backend(&self) -> &'static str {
        self.store.backend()
    }

    /// Targets a collection.
    pub fn from(&self, collection: Collection) -> Table<'_> {
        Table {
            store: self.store.as_ref(),
            collection,
        }
    }

    pub async fn health_check(&self) -> Result<(), StoreError> {
        self.store.health_check().await
    }
}

/// Operations available on one collection.
pub struct Table<'a> {
    store: &'a dyn DataStore,
    collection: Collection,
}

impl<'a> Table<'a> {
    pub async fn insert(self, records: Vec<NewPublication>) -> Result<Vec<Publication>, StoreError> {
        self.store.insert(self.collection, records).await
    }

    pub fn select(self) -> SelectBuilder<'a> {
        SelectBuilder {
            store: self.store,
            query: SelectQuery::new(self.collection),
        }
    }

    pub fn delete(self) -> DeleteBuilder<'a> {
        DeleteBuilder {
            store: self.store,
            query: DeleteQuery::new(self.collection),
        }
    }
}

/// Chainable select. Await it (or call [`SelectBuilder::execute`]) to run.
#[must_use = "a select does nothing until awaited"]
pub struct SelectBuilder<'a> {
    store: &'a dyn DataStore,
    query: SelectQuery,
}

impl<'a> SelectBuilder<'a> {
    pub fn eq(mut self, field: Field, value: impl Into<Value>) -> Self {
        self.query.predicates.push(Predicate::Eq(field, value.into()));
        self
    }

    pub fn in_<V, I>(mut self, field: Field, values: I) -> Self
    where
        V: Into<Value>,
        I: IntoIterator<Item = V>,
    {
        self.query.predicates.push(Predicate::In(
            field,
            values.into_iter().map(Into::into).collect(),
        ));
        self
    }

    pub fn gte(mut self, field: Field, value: impl Into<Value>) -> Self {
        self.query
            .predicates
            .push(Predicate::Gte(field, value.into()));
        self
    }

    pub fn lte(mut self, field: Field, value: impl Into<Value>) -> Self {
        self.query
            .predicates
            .push(Predicate::Lte(field, value.into()));
        self
    }

    pub fn overlaps<S, I>(mut self, field: Field, values: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = S>,
    {
        self.query.predicates.push(Predicate::Overlaps(
            field,
            values.into_iter().map(Into::into).collect(),
        ));
        self
    }

    /// Sets the ordering key, replacing any previous one.
    pub fn order(mut self, field: Field, direction: Direction) -> Self {
        self.query.order = Some(Order { field, direction });
        self
    }

    /// The query accumulated so far.
    pub fn query(&self) -> &SelectQuery {
        &self.query
    }

    pub async fn execute(self) -> Result<Vec<Publication>, StoreError> {
        let query = self.query.validated()?;
        self.store.select(query).await
    }
}

impl<'a> IntoFuture for SelectBuilder<'a> {
    type Output = Result<Vec<Publication>, StoreError>;
    type IntoFuture = StoreFuture<'a, Vec<Publication>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.execute())
    }
}

/// Chainable delete. Requires at least one filter.
#[must_use = "a delete does nothing until awaited"]
pub struct DeleteBuilder<'a> {
    store: &'a dyn DataStore,
    query: DeleteQuery,
}

impl<'a> DeleteBuilder<'a> {
    pub fn eq(mut self, field: Field, value: impl Into<Value>) -> Self {
        self.query.predicates.push(Predicate::Eq(field, value.into()));
        self
    }

    pub fn in_<V, I>(mut self, field: Field, values: I) -> Self
    where
        V: Into<Value>,
        I: IntoIterator<Item = V>,
    {
        self.query.predicates.push(Predicate::In(
            field,
            values.into_iter().map(Into::into).collect(),
        ));
        self
    }

    pub async fn execute(self) -> Result<u64, StoreError> {
        let query = self.query.validated()?;
        self.store.delete(query).await
    }
}

impl<'a> IntoFuture for DeleteBuilder<'a> {
    type Output = Result<u64, StoreError>;
    type IntoFuture = StoreFuture<'a, u64>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.execute())
    }
}
