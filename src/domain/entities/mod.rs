//! Core domain entities representing the catalog data model.
//!
//! # Entity Types
//!
//! - [`Publication`] - A stored research publication
//! - [`NewPublication`] - Draft used for inserts
//! - [`Species`] / [`Mission`] - Fixed facet vocabularies
//!
//! Records written under the older project schema are decoded through
//! [`legacy::StoredPublication`] and normalized before use.

pub mod legacy;
pub mod publication;

pub use legacy::StoredPublication;
pub use publication::{
    FacetParseError, MAX_YEAR, MIN_YEAR, Mission, NewPublication, Publication, Species,
};
