//! Web dashboard route configuration.

use crate::state::AppState;
use crate::web::handlers::{
    create_publication_handler, dashboard_handler, delete_publication_handler, grid_handler,
    landing_handler, new_publication_handler, publication_detail_handler,
};
use axum::{
    Router,
    routing::{get, post},
};

/// Server-rendered dashboard routes.
///
/// # Endpoints
///
/// - `GET  /`                                 - Landing page
/// - `GET  /dashboard`                        - Dashboard with sidebar and tabs
/// - `GET  /dashboard/grid`                   - Publication grid fragment
/// - `GET  /dashboard/publications/new`       - Add-publication form
/// - `POST /dashboard/publications`           - Form submission
/// - `GET  /dashboard/publications/{id}`      - Publication detail
/// - `POST /dashboard/publications/{id}/delete` - Delete and return to the dashboard
pub fn web_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(landing_handler))
        .route("/dashboard", get(dashboard_handler))
        .route("/dashboard/grid", get(grid_handler))
        .route("/dashboard/publications", post(create_publication_handler))
        .route("/dashboard/publications/new", get(new_publication_handler))
        .route("/dashboard/publications/{id}", get(publication_detail_handler))
        .route(
            "/dashboard/publications/{id}/delete",
            post(delete_publication_handler),
        )
}
