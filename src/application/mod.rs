//! Application layer services implementing business logic.
//!
//! This layer orchestrates domain operations: it checks catalog invariants,
//! runs narrowed queries through the data client and publishes change
//! notifications. HTTP handlers and the admin CLI consume it.
//!
//! # Available Services
//!
//! - [`services::publication_service::PublicationService`] - Publication catalog

pub mod services;
