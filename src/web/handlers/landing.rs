//! Landing page handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::IntoResponse;

use crate::domain::entities::{MAX_YEAR, MIN_YEAR};

/// Template for the landing page.
///
/// Renders `templates/landing.html` with the archive span and an
/// "Enter Dashboard" link.
#[derive(Template, WebTemplate)]
#[template(path = "landing.html")]
pub struct LandingTemplate {
    pub min_year: i32,
    pub max_year: i32,
}

/// Renders the landing page.
///
/// # Endpoint
///
/// `GET /`
pub async fn landing_handler() -> impl IntoResponse {
    LandingTemplate {
        min_year: MIN_YEAR,
        max_year: MAX_YEAR,
    }
}
