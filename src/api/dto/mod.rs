//! Data Transfer Objects for API requests and responses.
//!
//! All DTOs use Serde for serialization. Request bodies are checked with
//! validator; query strings are parsed with `serde_with` helpers so that
//! empty form inputs read as absent values.

pub mod filter;
pub mod health;
pub mod publication;
