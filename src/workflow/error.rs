use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

/// Failure class recorded next to the error message of a file result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Resolution,
    Transport,
    TerminalState,
    Timeout,
    Unknown,
}

/// Why a single attachment stopped short of a RAG answer.
#[derive(Debug, Error)]
pub enum FileError {
    #[error("Failed to resolve file id from attachment")]
    Resolution,

    #[error("Chat host file download failed: {status} {body}")]
    Download { status: u16, body: String },

    #[error("Assistant upload failed: {status} {body}")]
    Upload { status: u16, body: String },

    #[error("Document status check failed for {document_id}: {status} {body}")]
    StatusCheck {
        document_id: String,
        status: u16,
        body: String,
    },

    #[error("RAG query failed: {status} {body}")]
    RagQuery { status: u16, body: String },

    /// The backend finished indexing without reaching `ready`.
    #[error("{message}")]
    TerminalState { status: String, message: String },

    #[error("Timeout waiting for document {document_id} to reach ready status")]
    Timeout {
        document_id: String,
        waited: Duration,
    },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Unexpected(String),
}

impl FileError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FileError::Resolution => ErrorKind::Resolution,
            FileError::Download { .. }
            | FileError::Upload { .. }
            | FileError::StatusCheck { .. }
            | FileError::RagQuery { .. } => ErrorKind::Transport,
            FileError::TerminalState { .. } => ErrorKind::TerminalState,
            FileError::Timeout { .. } => ErrorKind::Timeout,
            // Undecodable bodies are not a transport problem.
            FileError::Http(e) if e.is_decode() => ErrorKind::Unknown,
            FileError::Http(_) => ErrorKind::Transport,
            FileError::Unexpected(_) => ErrorKind::Unknown,
        }
    }

    /// Upstream HTTP status, when the failure came from a non-2xx response.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            FileError::Download { status, .. }
            | FileError::Upload { status, .. }
            | FileError::StatusCheck { status, .. }
            | FileError::RagQuery { status, .. } => Some(*status),
            FileError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Whole-call failure: nothing was processed.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("No attached files were found")]
    NoFiles,
}
