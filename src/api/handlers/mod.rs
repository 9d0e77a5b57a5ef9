//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod events;
pub mod health;
pub mod publications;

pub use events::events_handler;
pub use health::health_handler;
pub use publications::{
    create_publication_handler, delete_publication_handler, get_publication_handler,
    list_publications_handler,
};
