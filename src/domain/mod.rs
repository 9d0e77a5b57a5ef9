//! Domain layer containing the catalog model and data-access contract.
//!
//! # Architecture
//!
//! - [`entities`] - Publication and facet vocabularies, legacy schema adapter
//! - [`query`] - Predicate narrowing model and in-memory evaluation
//! - [`store`] - [`store::DataStore`] trait and the chainable [`store::DataClient`]
//! - [`filter`] - Facet selection and its translation to store queries
//! - [`events`] - Change notifications emitted after mutations
//!
//! # Design Principles
//!
//! - Domain layer has no dependencies on infrastructure or presentation layers
//! - The store trait is implemented by the infrastructure layer and chosen at startup
//! - Business rules live in services (see [`crate::application::services`])

pub mod entities;
pub mod events;
pub mod filter;
pub mod query;
pub mod store;
