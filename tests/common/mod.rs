#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Multipart, Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use assistant_bridge::state::BridgeConfig;

#[derive(Debug, Clone)]
pub struct UploadRecord {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Everything the fake chat host and assistant saw.
#[derive(Debug, Default)]
pub struct Recorded {
    pub downloads: Vec<String>,
    pub download_auth: Vec<Option<String>>,
    pub download_cookies: Vec<Option<String>>,
    pub uploads: Vec<UploadRecord>,
    pub status_checks: HashMap<String, usize>,
    pub rag_bodies: Vec<Value>,
}

impl Recorded {
    pub fn status_check_count(&self, document_id: &str) -> usize {
        self.status_checks.get(document_id).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.downloads.len()
            + self.uploads.len()
            + self.status_checks.values().sum::<usize>()
            + self.rag_bodies.len()
    }
}

type Shared = Arc<Mutex<Recorded>>;

/// In-process stand-in for both upstreams. Behavior is keyed on names:
///
/// host file ids: `missing*` -> 404, anything else -> 200 with text content.
/// upload filenames: `reject*` -> 500, `noid*` -> 201 without id, else 201.
/// document ids (`doc-{filename}`): `broken` -> failed with error,
/// `silent` -> failed without error, `slow` -> always processing,
/// `gone` -> 404 on status, otherwise processing once then ready.
/// rag questions: `explode` -> 502, `nothing` -> answer with `"sources": null`.
pub struct FakeUpstream {
    pub base_url: String,
    pub recorded: Shared,
}

impl FakeUpstream {
    pub async fn spawn() -> Self {
        let recorded: Shared = Arc::new(Mutex::new(Recorded::default()));

        let app = Router::new()
            .route("/api/v1/files/:id/content", get(download))
            .route("/v1/documents", post(upload))
            .route("/v1/documents/:id", get(document_status))
            .route("/v1/rag/query", post(rag_query))
            .with_state(recorded.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            recorded,
        }
    }

    pub fn config(&self) -> BridgeConfig {
        BridgeConfig {
            assistant_api_url: self.base_url.clone(),
            host_base_url: self.base_url.clone(),
            ingest_timeout: Duration::from_millis(400),
            poll_interval: Duration::from_millis(10),
            default_question: "Сделай краткое summary документа".to_string(),
            ..BridgeConfig::default()
        }
    }

    pub fn recorded(&self) -> std::sync::MutexGuard<'_, Recorded> {
        self.recorded.lock().unwrap()
    }
}

async fn download(
    State(recorded): State<Shared>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    {
        let mut rec = recorded.lock().unwrap();
        rec.downloads.push(id.clone());
        rec.download_auth.push(
            headers
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
        );
        rec.download_cookies.push(
            headers
                .get(header::COOKIE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
        );
    }

    if id.starts_with("missing") {
        return (StatusCode::NOT_FOUND, r#"{"detail":"File not found"}"#).into_response();
    }

    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        format!("content of {}", id),
    )
        .into_response()
}

async fn upload(State(recorded): State<Shared>, mut multipart: Multipart) -> Response {
    let mut record = None;
    while let Some(field) = multipart.next_field().await.unwrap() {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field.bytes().await.unwrap().to_vec();
        record = Some(UploadRecord {
            filename,
            content_type,
            bytes,
        });
    }

    let Some(record) = record else {
        return (StatusCode::BAD_REQUEST, "missing file field").into_response();
    };
    let filename = record.filename.clone();
    recorded.lock().unwrap().uploads.push(record);

    if filename.starts_with("reject") {
        return (StatusCode::INTERNAL_SERVER_ERROR, "storage unavailable").into_response();
    }
    if filename.starts_with("noid") {
        return (StatusCode::CREATED, Json(json!({ "status": "uploaded" }))).into_response();
    }

    (
        StatusCode::CREATED,
        Json(json!({
            "id": format!("doc-{}", filename),
            "filename": filename,
            "status": "uploaded"
        })),
    )
        .into_response()
}

async fn document_status(State(recorded): State<Shared>, Path(id): Path<String>) -> Response {
    let checks = {
        let mut rec = recorded.lock().unwrap();
        let count = rec.status_checks.entry(id.clone()).or_insert(0);
        *count += 1;
        *count
    };

    if id.contains("gone") {
        return (StatusCode::NOT_FOUND, "document not found").into_response();
    }
    if id.contains("broken") {
        return Json(json!({ "id": id, "status": "failed", "error": "unsupported format" }))
            .into_response();
    }
    if id.contains("silent") {
        return Json(json!({ "id": id, "status": "failed" })).into_response();
    }
    if id.contains("slow") || checks < 2 {
        return Json(json!({ "id": id, "status": "processing" })).into_response();
    }

    Json(json!({ "id": id, "status": "ready" })).into_response()
}

async fn rag_query(State(recorded): State<Shared>, Json(body): Json<Value>) -> Response {
    recorded.lock().unwrap().rag_bodies.push(body.clone());

    let question = body["question"].as_str().unwrap_or_default().to_string();
    if question.contains("explode") {
        return (StatusCode::BAD_GATEWAY, "llm unavailable").into_response();
    }
    if question.contains("nothing") {
        return Json(json!({
            "text": "No relevant context found.",
            "sources": null,
            "retrieval": { "mode": "hybrid", "rerank_applied": false }
        }))
        .into_response();
    }

    Json(json!({
        "text": format!("answer: {}", question),
        "sources": [
            {
                "document_id": "doc-a",
                "filename": "a.txt",
                "category": "finance",
                "chunk_index": 0,
                "text": "Выручка выросла на 12%",
                "score": 0.91
            },
            {
                "document_id": "doc-a",
                "filename": "a.txt",
                "chunk_index": 3,
                "text": "Прибыль стабильна",
                "score": 0.74
            }
        ],
        "retrieval": { "mode": "hybrid", "rerank_applied": false }
    }))
    .into_response()
}
