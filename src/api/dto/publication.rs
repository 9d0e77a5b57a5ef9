//! DTOs for publication endpoints.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::domain::entities::{Mission, NewPublication, Publication, Species};

/// Request to create a publication.
///
/// ```json
/// {
///   "title": "Plant root growth in microgravity",
///   "author_name": "A. Researcher",
///   "summary": "Arabidopsis seedlings grown aboard the ISS...",
///   "research_link": "https://example.org/paper",
///   "species": ["Plants"],
///   "missions": ["ISS", "Microgravity Studies"],
///   "year": 2021
/// }
/// ```
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePublicationRequest {
    #[validate(custom(function = "non_blank"), length(max = 300))]
    pub title: String,

    #[serde(default)]
    #[validate(length(max = 200))]
    pub author_name: Option<String>,

    #[validate(custom(function = "non_blank"))]
    pub summary: String,

    #[validate(url(message = "Invalid URL format"))]
    pub research_link: String,

    #[validate(length(min = 1, message = "Select at least one species"))]
    pub species: Vec<Species>,

    #[validate(length(min = 1, message = "Select at least one mission"))]
    pub missions: Vec<Mission>,

    #[validate(range(min = 2015, max = 2025, message = "Year must be between 2015 and 2025"))]
    pub year: i32,
}

fn non_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Must not be blank".into());
        return Err(err);
    }
    Ok(())
}

impl From<CreatePublicationRequest> for NewPublication {
    fn from(req: CreatePublicationRequest) -> Self {
        NewPublication {
            title: req.title,
            author_name: req.author_name,
            summary: req.summary,
            research_link: req.research_link,
            species: req.species,
            missions: req.missions,
            year: req.year,
        }
    }
}

/// Filtered catalog listing.
#[derive(Debug, Serialize)]
pub struct PublicationListResponse {
    /// Client sequence number from the request, echoed unchanged.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seq: Option<u64>,
    /// Catalog revision at the time of the read.
    pub revision: u64,
    pub count: usize,
    pub data: Vec<Publication>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(value: serde_json::Value) -> CreatePublicationRequest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_valid_request() {
        let req = request(json!({
            "title": "Roots",
            "summary": "s",
            "research_link": "https://example.org/roots",
            "species": ["Plants"],
            "missions": ["ISS"],
            "year": 2021
        }));

        assert!(req.validate().is_ok());
        assert!(req.author_name.is_none());
    }

    #[test]
    fn test_invalid_request_reports_every_field() {
        let req = request(json!({
            "title": "   ",
            "summary": "s",
            "research_link": "not a url",
            "species": [],
            "missions": [],
            "year": 2014
        }));

        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        for field in ["title", "research_link", "species", "missions", "year"] {
            assert!(fields.contains_key(field), "missing error for {field}");
        }
        assert!(!fields.contains_key("summary"));
    }
}
