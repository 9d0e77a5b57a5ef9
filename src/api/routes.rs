//! API route configuration.

use crate::api::handlers::{
    create_publication_handler, delete_publication_handler, events_handler,
    get_publication_handler, list_publications_handler,
};
use crate::state::AppState;
use axum::{Router, routing::get};

/// All JSON API routes, nested under `/api`.
///
/// # Endpoints
///
/// - `GET    /publications`       - Filtered catalog listing
/// - `POST   /publications`       - Create a publication
/// - `GET    /publications/{id}`  - Publication detail
/// - `DELETE /publications/{id}`  - Delete a publication
/// - `GET    /events`             - Change notifications (SSE)
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/publications",
            get(list_publications_handler).post(create_publication_handler),
        )
        .route(
            "/publications/{id}",
            get(get_publication_handler).delete(delete_publication_handler),
        )
        .route("/events", get(events_handler))
}
