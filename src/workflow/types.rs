use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

use super::error::{ErrorKind, FileError};
use crate::assistant::RagSource;

/// An attachment as handed over by the chat host.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttachedFile {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    /// May embed the id as its last path segment, e.g. `/api/v1/files/{id}`.
    #[serde(default)]
    pub url: Option<String>,
}

impl AttachedFile {
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or("unknown")
    }

    /// `id` if set, otherwise `url`; keeps only the trailing path segment.
    pub fn resolve_id(&self) -> Option<String> {
        let raw = self
            .id
            .as_deref()
            .filter(|v| !v.is_empty())
            .or(self.url.as_deref())?
            .trim();

        let id = raw.rsplit('/').next().unwrap_or(raw);
        (!id.is_empty()).then(|| id.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadStatus {
    NotStarted,
    Uploaded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RagStatus {
    NotStarted,
    Ok,
}

/// Indexing progress as last reported by the assistant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexStatus {
    NotStarted,
    Ready,
    Failed,
    Unknown,
    /// Any non-terminal value the backend reports, e.g. `processing`.
    Pending(String),
}

impl IndexStatus {
    pub fn as_str(&self) -> &str {
        match self {
            IndexStatus::NotStarted => "not_started",
            IndexStatus::Ready => "ready",
            IndexStatus::Failed => "failed",
            IndexStatus::Unknown => "unknown",
            IndexStatus::Pending(s) => s.as_str(),
        }
    }
}

impl From<&str> for IndexStatus {
    fn from(value: &str) -> Self {
        match value {
            "" => IndexStatus::Unknown,
            "ready" => IndexStatus::Ready,
            "failed" => IndexStatus::Failed,
            "unknown" => IndexStatus::Unknown,
            "not_started" => IndexStatus::NotStarted,
            other => IndexStatus::Pending(other.to_string()),
        }
    }
}

impl fmt::Display for IndexStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for IndexStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RagDebug {
    pub question: String,
    pub source_count: usize,
}

/// Outcome of one attachment. Each status field only moves forward.
#[derive(Debug, Clone, Serialize)]
pub struct FileResult {
    pub file_name: String,
    /// Empty when no id could be resolved.
    pub file_id: String,
    pub upload_status: UploadStatus,
    pub index_status: IndexStatus,
    pub rag_status: RagStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<RagSource>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<RagDebug>,
}

impl FileResult {
    pub fn new(file: &AttachedFile) -> Self {
        Self {
            file_name: file.display_name().to_string(),
            file_id: file.resolve_id().unwrap_or_default(),
            upload_status: UploadStatus::NotStarted,
            index_status: IndexStatus::NotStarted,
            rag_status: RagStatus::NotStarted,
            document_id: None,
            error: None,
            error_kind: None,
            answer: None,
            sources: None,
            debug: None,
        }
    }

    pub fn record_error(&mut self, err: &FileError) {
        self.error = Some(err.to_string());
        self.error_kind = Some(err.kind());
    }

    pub fn is_answered(&self) -> bool {
        self.rag_status == RagStatus::Ok
    }
}

/// Everything one tool call produced: the shared question and one result per
/// attachment, in input order.
#[derive(Debug, Clone, Serialize)]
pub struct AggregateResult {
    pub question: String,
    pub results: Vec<FileResult>,
}
