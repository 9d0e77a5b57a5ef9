//! View models shared by dashboard templates.

use serde_json::Value;

use crate::api::dto::filter::FilterParams;
use crate::domain::entities::{MAX_YEAR, MIN_YEAR, Mission, Publication, Species};
use crate::domain::filter::FilterState;
use crate::error::AppError;
use crate::utils::text::{excerpt, is_web_link, long_date};

/// Summary length shown on a grid card.
const CARD_EXCERPT_CHARS: usize = 180;

/// One publication card in the grid.
#[derive(Debug, Clone)]
pub struct CardView {
    pub id: String,
    pub short_id: String,
    pub title: String,
    pub author: Option<String>,
    pub excerpt: String,
    pub species: Vec<&'static str>,
    pub missions: Vec<&'static str>,
    pub year: i32,
    pub added_on: String,
}

impl From<&Publication> for CardView {
    fn from(p: &Publication) -> Self {
        Self {
            id: p.id.to_string(),
            short_id: p.short_id(),
            title: p.title.clone(),
            author: p.author_name.clone(),
            excerpt: excerpt(&p.summary, CARD_EXCERPT_CHARS),
            species: p.species.iter().map(|s| s.label()).collect(),
            missions: p.missions.iter().map(|m| m.label()).collect(),
            year: p.year,
            added_on: long_date(&p.created_at),
        }
    }
}

/// Full publication for the detail page.
#[derive(Debug, Clone)]
pub struct DetailView {
    pub id: String,
    pub title: String,
    pub author: Option<String>,
    pub summary: String,
    pub research_link: String,
    /// `Some` only for http(s) links; anything else is shown as plain text.
    pub link_href: Option<String>,
    pub species: Vec<&'static str>,
    pub missions: Vec<&'static str>,
    pub year: i32,
    pub added_on: String,
}

impl From<Publication> for DetailView {
    fn from(p: Publication) -> Self {
        Self {
            id: p.id.to_string(),
            added_on: long_date(&p.created_at),
            species: p.species.iter().map(|s| s.label()).collect(),
            missions: p.missions.iter().map(|m| m.label()).collect(),
            title: p.title,
            author: p.author_name,
            summary: p.summary,
            link_href: is_web_link(&p.research_link).then(|| p.research_link.clone()),
            research_link: p.research_link,
            year: p.year,
        }
    }
}

/// A checkbox in a facet group.
#[derive(Debug, Clone)]
pub struct FacetOption {
    pub value: &'static str,
    pub checked: bool,
}

pub fn species_options<'a>(selected: impl IntoIterator<Item = &'a Species>) -> Vec<FacetOption> {
    let selected: Vec<Species> = selected.into_iter().copied().collect();
    Species::ALL
        .iter()
        .map(|s| FacetOption {
            value: s.label(),
            checked: selected.contains(s),
        })
        .collect()
}

pub fn mission_options<'a>(selected: impl IntoIterator<Item = &'a Mission>) -> Vec<FacetOption> {
    let selected: Vec<Mission> = selected.into_iter().copied().collect();
    Mission::ALL
        .iter()
        .map(|m| FacetOption {
            value: m.label(),
            checked: selected.contains(m),
        })
        .collect()
}

/// Sidebar state rendered from the active filter.
#[derive(Debug, Clone)]
pub struct SidebarView {
    pub species: Vec<FacetOption>,
    pub missions: Vec<FacetOption>,
    pub year_min: i32,
    pub year_max: i32,
    pub min_year: i32,
    pub max_year: i32,
    pub constrained: bool,
}

impl SidebarView {
    pub fn new(filter: &FilterState) -> Self {
        Self {
            species: species_options(&filter.species),
            missions: mission_options(&filter.missions),
            year_min: filter.year_range.min(),
            year_max: filter.year_range.max(),
            min_year: MIN_YEAR,
            max_year: MAX_YEAR,
            constrained: !filter.is_unconstrained(),
        }
    }
}

/// Dashboard tab selected through `?tab=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Publications,
    KnowledgeGraph,
    Analytics,
}

impl Tab {
    /// Unknown values fall back to the publications tab.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("knowledge-graph") => Tab::KnowledgeGraph,
            Some("analytics") => Tab::Analytics,
            _ => Tab::Publications,
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            Tab::Publications => "publications",
            Tab::KnowledgeGraph => "knowledge-graph",
            Tab::Analytics => "analytics",
        }
    }
}

/// Navigation link to a dashboard tab, keeping the active filter.
#[derive(Debug, Clone)]
pub struct TabLink {
    pub label: &'static str,
    pub href: String,
    pub active: bool,
}

pub fn tab_links(active: Tab, params: &FilterParams) -> Vec<TabLink> {
    let query = params.to_query_string();
    [
        (Tab::Publications, "Publications"),
        (Tab::KnowledgeGraph, "Knowledge Graph"),
        (Tab::Analytics, "Analytics"),
    ]
    .into_iter()
    .map(|(tab, label)| TabLink {
        label,
        href: if query.is_empty() {
            format!("/dashboard?tab={}", tab.slug())
        } else {
            format!("/dashboard?tab={}&{}", tab.slug(), query)
        },
        active: tab == active,
    })
    .collect()
}

/// Inline messages next to form inputs.
#[derive(Debug, Clone, Default)]
pub struct FieldErrors {
    pub title: Option<String>,
    pub author_name: Option<String>,
    pub summary: Option<String>,
    pub research_link: Option<String>,
    pub species: Option<String>,
    pub missions: Option<String>,
    pub year: Option<String>,
}

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author_name.is_none()
            && self.summary.is_none()
            && self.research_link.is_none()
            && self.species.is_none()
            && self.missions.is_none()
            && self.year.is_none()
    }

    /// Records a message for a field, keeping the first one.
    pub fn set(&mut self, field: &str, message: impl Into<String>) {
        let slot = match field {
            "title" => &mut self.title,
            "author_name" => &mut self.author_name,
            "summary" => &mut self.summary,
            "research_link" => &mut self.research_link,
            "species" => &mut self.species,
            "missions" => &mut self.missions,
            "year" => &mut self.year,
            _ => return,
        };
        if slot.is_none() {
            *slot = Some(message.into());
        }
    }

    /// Merges the per-field messages carried by a validation error.
    pub fn absorb(&mut self, error: &AppError) {
        let AppError::Validation { details, .. } = error else {
            return;
        };
        let Some(fields) = details.get("fields").and_then(Value::as_object) else {
            return;
        };

        for (field, messages) in fields {
            let message = messages
                .as_array()
                .and_then(|m| m.first())
                .and_then(Value::as_str)
                .unwrap_or("Invalid value");
            self.set(field, message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tab_parse_falls_back_to_publications() {
        assert_eq!(Tab::parse(Some("analytics")), Tab::Analytics);
        assert_eq!(Tab::parse(Some("bogus")), Tab::Publications);
        assert_eq!(Tab::parse(None), Tab::Publications);
    }

    #[test]
    fn test_tab_links_keep_filter() {
        let params = FilterParams {
            species: vec!["Plants".to_string()],
            ..Default::default()
        };

        let links = tab_links(Tab::Analytics, &params);
        assert_eq!(links[2].href, "/dashboard?tab=analytics&species=Plants");
        assert!(links[2].active);
        assert!(!links[0].active);
    }

    #[test]
    fn test_field_errors_absorb_validation_details() {
        let err = AppError::bad_request(
            "Validation failed",
            json!({ "fields": { "species": ["Select at least one species"], "bogus": ["x"] } }),
        );

        let mut errors = FieldErrors::default();
        errors.absorb(&err);

        assert_eq!(errors.species.as_deref(), Some("Select at least one species"));
        assert!(errors.title.is_none());
        assert!(!errors.is_empty());
    }

    fn publication_with_link(link: &str) -> Publication {
        Publication::from_new(
            crate::domain::entities::NewPublication {
                title: "Roots".to_string(),
                author_name: None,
                summary: "Root growth".to_string(),
                research_link: link.to_string(),
                species: vec![Species::Plants],
                missions: vec![Mission::Iss],
                year: 2019,
            },
            uuid::Uuid::new_v4(),
            chrono::Utc::now(),
        )
    }

    #[test]
    fn test_detail_links_only_web_urls() {
        let view = DetailView::from(publication_with_link("https://example.org/roots"));
        assert_eq!(view.link_href.as_deref(), Some("https://example.org/roots"));

        let view = DetailView::from(publication_with_link("javascript:alert(1)"));
        assert_eq!(view.link_href, None);
        assert_eq!(view.research_link, "javascript:alert(1)");
    }
}
