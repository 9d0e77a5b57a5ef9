//! Data store implementations.
//!
//! Concrete implementations of [`crate::domain::store::DataStore`].
//!
//! # Stores
//!
//! - [`PgDataStore`] - PostgreSQL via SQLx, predicates translated to SQL
//! - [`LocalDataStore`] - Key-value storage, predicates evaluated in memory

pub mod local_data_store;
pub mod pg_data_store;

pub use local_data_store::LocalDataStore;
pub use pg_data_store::PgDataStore;
