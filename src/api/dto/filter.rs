//! Facet query parameters shared by the API and the dashboard.

use serde::Deserialize;
use serde_json::json;
use serde_with::{NoneAsEmptyString, serde_as};
use std::collections::BTreeSet;

use crate::domain::entities::{MAX_YEAR, MIN_YEAR, Mission, Species};
use crate::domain::filter::{FilterState, YearRange};
use crate::error::AppError;

/// Filter facets as they arrive in a query string.
///
/// Species and missions are repeated keys (`species=Humans&species=Plants`),
/// which is why handlers extract this with `axum_extra::extract::Query`.
/// Facet values accept either the display label or its slug (`cell-lines`).
///
/// `seq` is an opaque client sequence number echoed back in responses so the
/// client can discard responses that arrive out of order.
#[serde_as]
#[derive(Debug, Default, Clone, Deserialize)]
pub struct FilterParams {
    #[serde(default)]
    pub species: Vec<String>,

    #[serde(default)]
    pub missions: Vec<String>,

    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub year_min: Option<i32>,

    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub year_max: Option<i32>,

    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub seq: Option<u64>,
}

impl FilterParams {
    /// Converts the parameters into a filter state.
    ///
    /// Missing year bounds default to the full supported span; reversed
    /// bounds are swapped.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if a species or mission value is unknown.
    pub fn to_filter_state(&self) -> Result<FilterState, AppError> {
        let species = self
            .species
            .iter()
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.parse::<Species>())
            .collect::<Result<BTreeSet<_>, _>>()
            .map_err(|e| {
                AppError::bad_request(e.to_string(), json!({ "facet": e.facet, "value": e.value }))
            })?;

        let missions = self
            .missions
            .iter()
            .filter(|m| !m.trim().is_empty())
            .map(|m| m.parse::<Mission>())
            .collect::<Result<BTreeSet<_>, _>>()
            .map_err(|e| {
                AppError::bad_request(e.to_string(), json!({ "facet": e.facet, "value": e.value }))
            })?;

        Ok(FilterState {
            species,
            missions,
            year_range: YearRange::new(
                self.year_min.unwrap_or(MIN_YEAR),
                self.year_max.unwrap_or(MAX_YEAR),
            ),
        })
    }

    /// Encodes the facets (without `seq`) back into a query string.
    pub fn to_query_string(&self) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for species in &self.species {
            serializer.append_pair("species", species);
        }
        for mission in &self.missions {
            serializer.append_pair("missions", mission);
        }
        if let Some(min) = self.year_min {
            serializer.append_pair("year_min", &min.to_string());
        }
        if let Some(max) = self.year_max {
            serializer.append_pair("year_max", &max.to_string());
        }
        serializer.finish()
    }
}
