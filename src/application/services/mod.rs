//! Business logic services for the application layer.

pub mod publication_service;

pub use publication_service::PublicationService;
