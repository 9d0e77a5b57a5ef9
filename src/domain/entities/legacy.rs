//! Adapter for publication records written under older schemas.
//!
//! Two shapes exist in the wild for the same entity:
//!
//! - **project schema**: `{author_name, project_name, project_link, ...}`
//! - **current schema**: `{title, research_link, author_name?, ...}`
//!
//! Both decode into [`StoredPublication`] and normalize to [`Publication`].
//! Drafts without id and timestamps decode into [`StoredDraft`] and normalize
//! to [`NewPublication`]. Writers only ever emit the current schema.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use super::publication::{Mission, NewPublication, Publication, Species};

/// A publication as found in storage, in either schema.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StoredPublication {
    Current(Publication),
    Project(ProjectRecord),
}

/// Record shape used before the `title`/`research_link` rename.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectRecord {
    pub id: Uuid,
    pub author_name: String,
    pub project_name: String,
    pub summary: String,
    pub project_link: String,
    pub species: Vec<Species>,
    pub missions: Vec<Mission>,
    pub year: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoredPublication {
    /// Returns true if the record had to be migrated from the project schema.
    pub fn is_legacy(&self) -> bool {
        matches!(self, StoredPublication::Project(_))
    }
}

impl From<ProjectRecord> for Publication {
    fn from(record: ProjectRecord) -> Self {
        let author_name = Some(record.author_name).filter(|name| !name.trim().is_empty());

        Publication {
            id: record.id,
            title: record.project_name,
            author_name,
            summary: record.summary,
            research_link: record.project_link,
            species: record.species,
            missions: record.missions,
            year: record.year,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

impl From<StoredPublication> for Publication {
    fn from(stored: StoredPublication) -> Self {
        match stored {
            StoredPublication::Current(publication) => publication,
            StoredPublication::Project(record) => record.into(),
        }
    }
}

/// Decodes one stored JSON value into the canonical schema.
///
/// # Errors
///
/// Returns the serde error when the value matches neither schema.
pub fn normalize(value: serde_json::Value) -> Result<Publication, serde_json::Error> {
    serde_json::from_value::<StoredPublication>(value).map(Publication::from)
}

/// Insert payload used before the `title`/`research_link` rename.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectDraft {
    pub author_name: String,
    pub project_name: String,
    pub summary: String,
    pub project_link: String,
    pub species: Vec<Species>,
    pub missions: Vec<Mission>,
    pub year: i32,
}

impl From<ProjectDraft> for NewPublication {
    fn from(draft: ProjectDraft) -> Self {
        let author_name = Some(draft.author_name).filter(|name| !name.trim().is_empty());

        NewPublication {
            title: draft.project_name,
            author_name,
            summary: draft.summary,
            research_link: draft.project_link,
            species: draft.species,
            missions: draft.missions,
            year: draft.year,
        }
    }
}

/// A draft in either schema.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StoredDraft {
    Current(NewPublication),
    Project(ProjectDraft),
}

impl From<StoredDraft> for NewPublication {
    fn from(draft: StoredDraft) -> Self {
        match draft {
            StoredDraft::Current(new) => new,
            StoredDraft::Project(draft) => draft.into(),
        }
    }
}

/// Decodes one draft (no id or timestamps) into the canonical schema.
///
/// # Errors
///
/// Returns the serde error when the value matches neither draft schema.
pub fn normalize_draft(value: serde_json::Value) -> Result<NewPublication, serde_json::Error> {
    serde_json::from_value::<StoredDraft>(value).map(NewPublication::from)
}
