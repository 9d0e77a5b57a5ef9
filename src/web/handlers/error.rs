//! Error page rendering.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::{IntoResponse, Response};

use crate::error::AppError;

/// Full-page error shown when a dashboard request cannot be served.
#[derive(Template, WebTemplate)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub status: u16,
    pub title: &'static str,
    pub message: String,
}

/// Renders an [`AppError`] as an HTML page with the matching status code.
pub fn error_page(error: AppError) -> Response {
    let status = error.status();
    let title = match error {
        AppError::Validation { .. } => "Invalid request",
        AppError::NotFound { .. } => "Not found",
        AppError::Storage { .. } => "Storage unavailable",
        AppError::Internal { .. } => "Something went wrong",
    };

    if matches!(error, AppError::Storage { .. } | AppError::Internal { .. }) {
        tracing::error!(error = %error, "Dashboard request failed");
    }

    let page = ErrorTemplate {
        status: status.as_u16(),
        title,
        message: error.message().to_string(),
    };

    (status, page).into_response()
}
