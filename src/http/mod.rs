//! HTTP surface: the `/books` resource plus a health probe.
//!
//! # Endpoints
//!
//! - `GET /health` - liveness and document count
//! - `GET /books` - every book, in storage order
//! - `GET /books/{id}` - one book, 404 when absent
//! - `POST /books` - create; the server assigns `id`
//! - `PUT /books/{id}` - shallow-merge the body onto the stored book
//! - `DELETE /books/{id}` - remove, empty 200 body

pub mod error;
pub mod handlers;
pub mod state;

pub use error::{ApiError, ErrorResponse};
pub use state::{AppState, MissingIdPolicy};

use crate::backend::DocumentBackend;
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

/// Build the router over an already opened collection.
pub fn router<M>(state: AppState<M>) -> Router
where
    M: DocumentBackend + 'static,
{
    Router::new()
        .route("/health", get(handlers::health::<M>))
        .route(
            "/books",
            get(handlers::list::<M>).post(handlers::create::<M>),
        )
        .route(
            "/books/{id}",
            get(handlers::get_one::<M>)
                .put(handlers::update::<M>)
                .delete(handlers::delete::<M>),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
