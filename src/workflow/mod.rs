pub mod error;
pub mod types;

use anyhow::Result;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::assistant::{AssistantClient, DocumentStatus};
use crate::auth::{Credentials, HostContext};
use crate::host::HostClient;
use crate::state::BridgeConfig;

use error::{FileError, RunError};
use types::{
    AggregateResult, AttachedFile, FileResult, IndexStatus, RagDebug, RagStatus, UploadStatus,
};

const GENERIC_PROCESSING_ERROR: &str = "Document processing failed";

/// Per-call inputs shared by every attachment in one run.
struct Batch<'a> {
    question: &'a str,
    host_base_url: &'a str,
    credentials: &'a Credentials,
}

/// Drives attachments through download, upload, indexing and RAG, one at a time.
pub struct Orchestrator {
    host: HostClient,
    assistant: AssistantClient,
    config: BridgeConfig,
}

impl Orchestrator {
    pub fn new(config: BridgeConfig) -> Result<Self> {
        Ok(Self {
            host: HostClient::from_config(&config)?,
            assistant: AssistantClient::from_config(&config)?,
            config,
        })
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Blank questions fall back to the configured default.
    pub fn resolve_question(&self, question: Option<&str>) -> String {
        question
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| self.config.default_question.clone())
    }

    /// Process every attachment and collect one result per file, in order.
    /// A failing file never stops the batch.
    pub async fn run(
        &self,
        question: Option<&str>,
        files: &[AttachedFile],
        context: Option<&HostContext>,
    ) -> Result<AggregateResult, RunError> {
        if files.is_empty() {
            return Err(RunError::NoFiles);
        }

        let question = self.resolve_question(question);
        let host_base_url = context
            .and_then(|c| c.base_url.as_deref())
            .unwrap_or(self.config.host_base_url.as_str())
            .trim_end_matches('/');
        let no_credentials = Credentials::default();
        let credentials = context.map(|c| &c.credentials).unwrap_or(&no_credentials);

        info!(
            file_count = files.len(),
            host = host_base_url,
            forwarded_auth = !credentials.is_empty(),
            "Ingest and query started"
        );

        let batch = Batch {
            question: &question,
            host_base_url,
            credentials,
        };

        let mut results = Vec::with_capacity(files.len());
        for file in files {
            let mut result = FileResult::new(file);
            if let Err(err) = self.process_file(&batch, &mut result).await {
                warn!(
                    file_id = %result.file_id,
                    file_name = %result.file_name,
                    kind = ?err.kind(),
                    error = %err,
                    "File processing failed"
                );
                result.record_error(&err);
            }
            results.push(result);
        }

        info!(
            file_count = results.len(),
            answered = results.iter().filter(|r| r.is_answered()).count(),
            "Ingest and query complete"
        );

        Ok(AggregateResult { question, results })
    }

    async fn process_file(
        &self,
        batch: &Batch<'_>,
        result: &mut FileResult,
    ) -> Result<(), FileError> {
        if result.file_id.is_empty() {
            return Err(FileError::Resolution);
        }

        let file = self
            .host
            .download(batch.host_base_url, &result.file_id, batch.credentials)
            .await?;

        let uploaded = self
            .assistant
            .upload_document(&result.file_name, file.bytes, &file.content_type)
            .await?;
        result.upload_status = UploadStatus::Uploaded;

        let document_id = uploaded
            .id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                FileError::Unexpected("Assistant upload response has no document id".to_string())
            })?;
        result.document_id = Some(document_id.clone());
        info!(file_id = %result.file_id, document_id = %document_id, "Document uploaded");

        let document = self.wait_for_terminal_status(&document_id, result).await?;
        if document.status.as_deref() != Some("ready") {
            let status = document
                .status
                .as_deref()
                .map(IndexStatus::from)
                .unwrap_or(IndexStatus::Unknown);
            result.index_status = status.clone();
            return Err(FileError::TerminalState {
                status: status.to_string(),
                message: document
                    .error
                    .filter(|e| !e.is_empty())
                    .unwrap_or_else(|| GENERIC_PROCESSING_ERROR.to_string()),
            });
        }
        result.index_status = IndexStatus::Ready;

        // One query per ready document, even though the question is shared.
        let answer = self.assistant.query_rag(batch.question).await?;
        result.rag_status = RagStatus::Ok;
        result.debug = Some(RagDebug {
            question: batch.question.to_string(),
            source_count: answer.sources.len(),
        });
        info!(
            document_id = %document_id,
            source_count = answer.sources.len(),
            "RAG answer received"
        );
        result.answer = Some(answer.text);
        result.sources = Some(answer.sources);

        Ok(())
    }

    /// Poll until `ready`/`failed` or until the ingest deadline passes.
    /// A timeout too large to represent as an instant means no deadline.
    /// Status check failures are not retried.
    async fn wait_for_terminal_status(
        &self,
        document_id: &str,
        result: &mut FileResult,
    ) -> Result<DocumentStatus, FileError> {
        let started = Instant::now();
        let deadline = started.checked_add(self.config.ingest_timeout);

        while deadline.map_or(true, |d| Instant::now() < d) {
            let document = self.assistant.document_status(document_id).await?;
            if document.is_terminal() {
                return Ok(document);
            }

            if let Some(status) = document.status.as_deref().filter(|s| !s.is_empty()) {
                result.index_status = IndexStatus::from(status);
            }
            debug!(document_id, status = %result.index_status, "Document not ready yet");

            tokio::time::sleep(self.config.poll_interval).await;
        }

        Err(FileError::Timeout {
            document_id: document_id.to_string(),
            waited: started.elapsed(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn orchestrator() -> Orchestrator {
        let config = BridgeConfig {
            default_question: "Summarize".to_string(),
            ..BridgeConfig::default()
        };
        Orchestrator::new(config).unwrap()
    }

    #[test]
    fn test_resolve_question() {
        let orch = orchestrator();
        assert_eq!(orch.resolve_question(None), "Summarize");
        assert_eq!(orch.resolve_question(Some("  \t\n")), "Summarize");
        assert_eq!(orch.resolve_question(Some("  Who signed? ")), "Who signed?");
    }

    #[tokio::test]
    async fn test_empty_file_list_is_rejected() {
        let orch = orchestrator();
        let err = orch.run(Some("q"), &[], None).await.unwrap_err();
        assert!(matches!(err, RunError::NoFiles));
        assert_eq!(err.to_string(), "No attached files were found");
    }

    #[tokio::test]
    async fn test_unresolvable_file_makes_no_calls() {
        // Unreachable upstreams: any network attempt would turn into a transport error.
        let config = BridgeConfig {
            assistant_api_url: "http://127.0.0.1:9".to_string(),
            host_base_url: "http://127.0.0.1:9".to_string(),
            ..BridgeConfig::default()
        };
        let orch = Orchestrator::new(config).unwrap();
        let files = vec![AttachedFile {
            name: Some("orphan.txt".to_string()),
            ..AttachedFile::default()
        }];

        let out = orch.run(None, &files, None).await.unwrap();
        let result = &out.results[0];
        assert_eq!(result.upload_status, UploadStatus::NotStarted);
        assert_eq!(result.error_kind, Some(error::ErrorKind::Resolution));
        assert_eq!(
            result.error.as_deref(),
            Some("Failed to resolve file id from attachment")
        );
    }
}
