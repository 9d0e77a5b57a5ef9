//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces defined by the domain layer.
//!
//! # Modules
//!
//! - [`persistence`] - PostgreSQL and local data stores
//! - [`storage`] - Key-value storage used by the local store
//!
//! The backing store is chosen once, at startup, by [`build_store`] and then
//! injected into services. Nothing selects a store through global state.

pub mod persistence;
pub mod storage;

use anyhow::{Context, Result};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{Config, StorageBackend};
use crate::domain::store::DataStore;
use persistence::{LocalDataStore, PgDataStore};
use storage::FileStorage;

/// Opens a PostgreSQL pool using the configured pool settings.
///
/// # Errors
///
/// Returns an error if no database URL is configured or the connection fails.
pub async fn connect_pool(config: &Config) -> Result<PgPool> {
    let url = config
        .database_url
        .as_deref()
        .context("DATABASE_URL must be configured for the postgres backend")?;

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(url)
        .await
        .context("Failed to connect to database")?;

    Ok(pool)
}

/// Runs the embedded schema migrations.
///
/// # Errors
///
/// Returns an error if a migration fails to apply.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("Failed to run migrations")?;
    Ok(())
}

/// Builds the data store selected by [`Config::storage_backend`].
///
/// # Errors
///
/// Returns an error if the PostgreSQL backend is selected and the database
/// cannot be reached or migrated.
pub async fn build_store(config: &Config) -> Result<Arc<dyn DataStore>> {
    match config.storage_backend {
        StorageBackend::Postgres => {
            let pool = connect_pool(config).await?;
            tracing::info!("Connected to database");

            if config.db_run_migrations {
                run_migrations(&pool).await?;
                tracing::info!("Migrations applied");
            }

            Ok(Arc::new(PgDataStore::new(Arc::new(pool))))
        }
        StorageBackend::Local => {
            let storage = FileStorage::new(config.local_storage_path.clone());
            tracing::info!(
                path = %config.local_storage_path.display(),
                "Using local storage backend"
            );
            Ok(Arc::new(LocalDataStore::new(Arc::new(storage))))
        }
    }
}
