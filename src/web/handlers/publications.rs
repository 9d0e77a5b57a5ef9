//! Add-publication form, detail page and delete action.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::Form;
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::entities::{MAX_YEAR, MIN_YEAR, Mission, NewPublication, Species};
use crate::error::AppError;
use crate::state::AppState;
use crate::web::handlers::error_page;
use crate::web::views::{
    DetailView, FacetOption, FieldErrors, mission_options, species_options,
};

/// Raw form submission.
///
/// Every field defaults to empty so a partial submission reaches validation
/// instead of being rejected by the extractor. Checkbox groups arrive as
/// repeated keys.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PublicationForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author_name: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub research_link: String,
    #[serde(default)]
    pub species: Vec<String>,
    #[serde(default)]
    pub missions: Vec<String>,
    #[serde(default)]
    pub year: String,
}

impl PublicationForm {
    /// Parses the vocabulary fields. Blank-field checks are left to the service.
    fn parse(&self, errors: &mut FieldErrors) -> Option<NewPublication> {
        let species: Vec<Species> = self
            .species
            .iter()
            .filter_map(|s| match s.parse() {
                Ok(species) => Some(species),
                Err(e) => {
                    errors.set("species", format!("{e}"));
                    None
                }
            })
            .collect();

        let missions: Vec<Mission> = self
            .missions
            .iter()
            .filter_map(|m| match m.parse() {
                Ok(mission) => Some(mission),
                Err(e) => {
                    errors.set("missions", format!("{e}"));
                    None
                }
            })
            .collect();

        let year = match self.year.trim().parse::<i32>() {
            Ok(year) => Some(year),
            Err(_) => {
                errors.set("year", "Year must be a number");
                None
            }
        };

        if !errors.is_empty() {
            return None;
        }

        Some(NewPublication {
            title: self.title.clone(),
            author_name: Some(self.author_name.clone()),
            summary: self.summary.clone(),
            research_link: self.research_link.clone(),
            species,
            missions,
            year: year?,
        })
    }
}

/// Template for the add-publication form.
///
/// Renders `templates/publication_form.html`. Submitted values are kept on
/// re-render; `alert` carries a blocking persistence error.
#[derive(Template, WebTemplate)]
#[template(path = "publication_form.html")]
pub struct PublicationFormTemplate {
    pub form: PublicationForm,
    pub errors: FieldErrors,
    pub alert: Option<String>,
    pub species: Vec<FacetOption>,
    pub missions: Vec<FacetOption>,
    pub min_year: i32,
    pub max_year: i32,
}

impl PublicationFormTemplate {
    fn new(form: PublicationForm, errors: FieldErrors, alert: Option<String>) -> Self {
        let species = species_options(
            &form
                .species
                .iter()
                .filter_map(|s| s.parse().ok())
                .collect::<Vec<Species>>(),
        );
        let missions = mission_options(
            &form
                .missions
                .iter()
                .filter_map(|m| m.parse().ok())
                .collect::<Vec<Mission>>(),
        );

        Self {
            form,
            errors,
            alert,
            species,
            missions,
            min_year: MIN_YEAR,
            max_year: MAX_YEAR,
        }
    }
}

/// Template for the publication detail page.
#[derive(Template, WebTemplate)]
#[template(path = "publication_detail.html")]
pub struct PublicationDetailTemplate {
    pub publication: DetailView,
}

/// Renders an empty add-publication form.
///
/// # Endpoint
///
/// `GET /dashboard/publications/new`
pub async fn new_publication_handler() -> impl IntoResponse {
    let form = PublicationForm {
        year: MAX_YEAR.to_string(),
        ..Default::default()
    };
    PublicationFormTemplate::new(form, FieldErrors::default(), None)
}

/// Handles the add-publication form submission.
///
/// # Endpoint
///
/// `POST /dashboard/publications`
///
/// # Responses
///
/// - **303 See Other** to `/dashboard` on success
/// - **422 Unprocessable Entity** with inline field errors
/// - **502 Bad Gateway** with a blocking alert when storage fails
pub async fn create_publication_handler(
    State(state): State<AppState>,
    Form(form): Form<PublicationForm>,
) -> Response {
    let mut errors = FieldErrors::default();

    let Some(new) = form.parse(&mut errors) else {
        let page = PublicationFormTemplate::new(form, errors, None);
        return (StatusCode::UNPROCESSABLE_ENTITY, page).into_response();
    };

    match state.publication_service.create(new).await {
        Ok(_) => Redirect::to("/dashboard").into_response(),
        Err(e @ AppError::Validation { .. }) => {
            errors.absorb(&e);
            let page = PublicationFormTemplate::new(form, errors, None);
            (StatusCode::UNPROCESSABLE_ENTITY, page).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to save publication");
            let status = e.status();
            let alert = format!("Could not save the publication: {}", e.message());
            let page = PublicationFormTemplate::new(form, errors, Some(alert));
            (status, page).into_response()
        }
    }
}

/// Renders one publication.
///
/// # Endpoint
///
/// `GET /dashboard/publications/{id}`
pub async fn publication_detail_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Response {
    match state.publication_service.get(id).await {
        Ok(publication) => PublicationDetailTemplate {
            publication: publication.into(),
        }
        .into_response(),
        Err(e) => error_page(e),
    }
}

/// Deletes one publication and returns to the dashboard.
///
/// # Endpoint
///
/// `POST /dashboard/publications/{id}/delete`
pub async fn delete_publication_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Response {
    match state.publication_service.delete(id).await {
        Ok(()) => Redirect::to("/dashboard").into_response(),
        Err(e) => error_page(e),
    }
}
