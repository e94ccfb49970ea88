use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::state::BridgeConfig;
use crate::workflow::error::FileError;

/// Response of `POST /v1/documents`.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadedDocument {
    #[serde(default)]
    pub id: Option<String>,
}

/// Response of `GET /v1/documents/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentStatus {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl DocumentStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self.status.as_deref(), Some("ready") | Some("failed"))
    }
}

/// A retrieved chunk cited by a RAG answer. Unknown fields are kept so
/// sources are echoed back as the backend sent them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RagSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_index: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Response of `POST /v1/rag/query`. The backend sends `null` for an empty
/// source list.
#[derive(Debug, Clone, Deserialize)]
pub struct RagAnswer {
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sources: Vec<RagSource>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Serialize)]
struct RagQuery<'a> {
    question: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    limit: Option<u32>,
}

/// Client for the document assistant's ingestion and RAG endpoints.
pub struct AssistantClient {
    client: reqwest::Client,
    base_url: String,
    upload_timeout: Duration,
    status_timeout: Duration,
    rag_timeout: Duration,
    rag_limit: Option<u32>,
}

impl AssistantClient {
    pub fn from_config(config: &BridgeConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .context("Failed to create assistant HTTP client")?;

        Ok(Self {
            client,
            base_url: config.assistant_api_url.trim_end_matches('/').to_string(),
            upload_timeout: config.upload_timeout,
            status_timeout: config.status_timeout,
            rag_timeout: config.rag_timeout,
            rag_limit: config.rag_limit,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/v1/{}", self.base_url, path)
    }

    /// Multipart upload of one document (field `file`).
    pub async fn upload_document(
        &self,
        filename: &str,
        payload: Vec<u8>,
        content_type: &str,
    ) -> Result<UploadedDocument, FileError> {
        let size = payload.len();
        let part = reqwest::multipart::Part::bytes(payload)
            .file_name(filename.to_string())
            .mime_str(content_type)
            .map_err(|e| {
                FileError::Unexpected(format!("Invalid content type {:?}: {}", content_type, e))
            })?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let resp = self
            .client
            .post(self.endpoint("documents"))
            .multipart(form)
            .timeout(self.upload_timeout)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(FileError::Upload {
                status: status.as_u16(),
                body,
            });
        }

        let uploaded: UploadedDocument = resp.json().await?;
        debug!(filename, size, document_id = ?uploaded.id, "document uploaded");
        Ok(uploaded)
    }

    pub async fn document_status(&self, document_id: &str) -> Result<DocumentStatus, FileError> {
        let resp = self
            .client
            .get(self.endpoint(&format!("documents/{}", document_id)))
            .timeout(self.status_timeout)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(FileError::StatusCheck {
                document_id: document_id.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        Ok(resp.json().await?)
    }

    pub async fn query_rag(&self, question: &str) -> Result<RagAnswer, FileError> {
        let body = RagQuery {
            question,
            limit: self.rag_limit,
        };

        let resp = self
            .client
            .post(self.endpoint("rag/query"))
            .json(&body)
            .timeout(self.rag_timeout)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(FileError::RagQuery {
                status: status.as_u16(),
                body,
            });
        }

        Ok(resp.json().await?)
    }
}
