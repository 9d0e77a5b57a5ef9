//! Handlers for the publication catalog endpoints.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use axum_extra::extract::Query;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::api::dto::filter::FilterParams;
use crate::api::dto::publication::{CreatePublicationRequest, PublicationListResponse};
use crate::domain::entities::Publication;
use crate::error::AppError;
use crate::state::AppState;

/// Lists publications matching the requested facets, newest first.
///
/// # Endpoint
///
/// `GET /api/publications?species=Humans&missions=ISS&year_min=2018&year_max=2025&seq=7`
///
/// Every parameter is optional and repeatable where it names a facet. An
/// empty `data` array is a valid result.
///
/// # Errors
///
/// Returns 400 for unknown facet values and 502 if storage cannot be read.
pub async fn list_publications_handler(
    State(state): State<AppState>,
    Query(params): Query<FilterParams>,
) -> Result<Json<PublicationListResponse>, AppError> {
    let filter = params.to_filter_state()?;
    let revision = state.publication_service.revision();

    let data = state.publication_service.list(&filter).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to list publications");
        e
    })?;

    Ok(Json(PublicationListResponse {
        seq: params.seq,
        revision,
        count: data.len(),
        data,
    }))
}

/// Creates a publication.
///
/// # Endpoint
///
/// `POST /api/publications`
///
/// # Errors
///
/// Returns 400 Bad Request for malformed JSON or failed validation and 502
/// if the store rejects the insert.
pub async fn create_publication_handler(
    State(state): State<AppState>,
    payload: Result<Json<CreatePublicationRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Publication>), AppError> {
    let Json(payload) = payload.map_err(|rejection| {
        AppError::bad_request(
            "Invalid request body",
            json!({ "reason": rejection.body_text() }),
        )
    })?;
    payload.validate()?;

    let created = state
        .publication_service
        .create(payload.into())
        .await
        .map_err(|e| {
            if matches!(e, AppError::Storage { .. } | AppError::Internal { .. }) {
                tracing::error!(error = %e, "Failed to create publication");
            }
            e
        })?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// Returns one publication.
///
/// # Endpoint
///
/// `GET /api/publications/{id}`
///
/// # Errors
///
/// Returns 404 Not Found if no publication has this id.
pub async fn get_publication_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Publication>, AppError> {
    let publication = state.publication_service.get(id).await?;
    Ok(Json(publication))
}

/// Deletes one publication.
///
/// # Endpoint
///
/// `DELETE /api/publications/{id}`
///
/// # Response
///
/// 204 No Content on success.
///
/// # Errors
///
/// Returns 404 Not Found if no publication has this id.
pub async fn delete_publication_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.publication_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
