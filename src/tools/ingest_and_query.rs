use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;
use tracing::info;

use super::ApiError;
use crate::auth::HostContext;
use crate::state::AppState;
use crate::workflow::types::{AggregateResult, AttachedFile};

#[derive(Debug, Default, Deserialize)]
pub struct IngestAndQueryRequest {
    /// Optional question; blank falls back to the summary prompt.
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub files: Vec<AttachedFile>,
}

/// Upload all attached files to the assistant and run one RAG query per
/// indexed document. Credentials on the inbound request are forwarded to the
/// chat host when downloading attachments.
pub async fn ingest_and_query(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<IngestAndQueryRequest>, JsonRejection>,
) -> Result<Json<AggregateResult>, ApiError> {
    let Json(req) = body?;
    let context = HostContext::from_headers(&headers);

    info!(
        file_count = req.files.len(),
        has_question = req.question.as_deref().is_some_and(|q| !q.trim().is_empty()),
        "Tool call received"
    );

    let result = state
        .orchestrator
        .run(req.question.as_deref(), &req.files, Some(&context))
        .await?;

    Ok(Json(result))
}
