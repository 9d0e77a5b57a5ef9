//! Utility functions shared across layers.
//!
//! - [`db_error`] - SQLx error classification into [`crate::domain::store::StoreError`]
//! - [`text`] - Display helpers for excerpts, dates and links

pub mod db_error;
pub mod text;
