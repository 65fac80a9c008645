//! Handlers for the `/books` resource.
//!
//! Each handler is one call into the collection. Nothing is validated: a body
//! only has to be a JSON object, `title` and `author` are documented but not
//! enforced.

use crate::backend::DocumentBackend;
use crate::document::Document;
use crate::http::error::ApiError;
use crate::http::state::{AppState, MissingIdPolicy};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always `"ok"`.
    pub status: &'static str,
    /// Books currently stored.
    pub books: usize,
}

/// `GET /health`
pub async fn health<M>(State(state): State<AppState<M>>) -> Json<HealthResponse>
where
    M: DocumentBackend + 'static,
{
    Json(HealthResponse {
        status: "ok",
        books: state.books().len(),
    })
}

/// `GET /books`: the whole collection in storage order.
pub async fn list<M>(State(state): State<AppState<M>>) -> Json<Vec<Document>>
where
    M: DocumentBackend + 'static,
{
    Json(state.books().all())
}

/// `GET /books/{id}`
pub async fn get_one<M>(
    State(state): State<AppState<M>>,
    Path(id): Path<String>,
) -> Result<Json<Document>, ApiError>
where
    M: DocumentBackend + 'static,
{
    state.books().find(&id).map(Json).ok_or(ApiError::NotFound)
}

/// `POST /books`: the server assigns `id`; one sent in the body is ignored.
pub async fn create<M>(
    State(state): State<AppState<M>>,
    Json(body): Json<Document>,
) -> Result<Json<Document>, ApiError>
where
    M: DocumentBackend + 'static,
{
    let book = state.books().create(body)?;
    tracing::debug!(id = ?book.get("id"), "book created");
    Ok(Json(book))
}

/// `PUT /books/{id}`: shallow merge. Responds with the merged book, or `null`
/// for an unknown id under [`MissingIdPolicy::Lenient`].
pub async fn update<M>(
    State(state): State<AppState<M>>,
    Path(id): Path<String>,
    Json(patch): Json<Document>,
) -> Result<Json<Option<Document>>, ApiError>
where
    M: DocumentBackend + 'static,
{
    match state.books().assign(&id, patch)? {
        Some(book) => {
            tracing::debug!(%id, "book updated");
            Ok(Json(Some(book)))
        }
        None => match state.missing_ids() {
            MissingIdPolicy::Strict => Err(ApiError::NotFound),
            MissingIdPolicy::Lenient => Ok(Json(None)),
        },
    }
}

/// `DELETE /books/{id}`: empty 200 body.
pub async fn delete<M>(
    State(state): State<AppState<M>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError>
where
    M: DocumentBackend + 'static,
{
    match state.books().remove(&id)? {
        Some(_) => {
            tracing::debug!(%id, "book deleted");
            Ok(StatusCode::OK)
        }
        None => match state.missing_ids() {
            MissingIdPolicy::Strict => Err(ApiError::NotFound),
            MissingIdPolicy::Lenient => Ok(StatusCode::OK),
        },
    }
}
