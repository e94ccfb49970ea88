use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::workflow::error::RunError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Run(#[from] RunError),

    #[error("Invalid request body: {}", .0.body_text())]
    Body(#[from] JsonRejection),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Run(RunError::NoFiles) => StatusCode::BAD_REQUEST,
            ApiError::Body(rejection) => rejection.status(),
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
