mod error;
mod health;
mod ingest_and_query;
mod openapi;

pub use error::ApiError;
pub use ingest_and_query::IngestAndQueryRequest;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Routes exposed to the chat host as an OpenAPI tool server.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/ingest_and_query",
            post(ingest_and_query::ingest_and_query),
        )
        .route("/health", get(health::health))
        .route("/openapi.json", get(openapi::openapi))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
