use std::time::Duration;

use anyhow::{Context, Result};
use tracing::debug;

use crate::auth::Credentials;
use crate::state::BridgeConfig;
use crate::workflow::error::FileError;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Attachment content fetched from the chat host.
#[derive(Debug, Clone)]
pub struct HostFile {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Reads attachment content from the chat host's file API.
pub struct HostClient {
    client: reqwest::Client,
    timeout: Duration,
}

impl HostClient {
    pub fn from_config(config: &BridgeConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .context("Failed to create host HTTP client")?;

        Ok(Self {
            client,
            timeout: config.download_timeout,
        })
    }

    fn content_url(base_url: &str, file_id: &str) -> String {
        format!(
            "{}/api/v1/files/{}/content",
            base_url.trim_end_matches('/'),
            file_id
        )
    }

    pub async fn download(
        &self,
        base_url: &str,
        file_id: &str,
        credentials: &Credentials,
    ) -> Result<HostFile, FileError> {
        let req = self
            .client
            .get(Self::content_url(base_url, file_id))
            .timeout(self.timeout);

        let resp = credentials.apply(req).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(FileError::Download {
                status: status.as_u16(),
                body,
            });
        }

        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();

        let bytes = resp.bytes().await?.to_vec();
        debug!(file_id, size = bytes.len(), content_type = %content_type, "attachment downloaded");

        Ok(HostFile {
            bytes,
            content_type,
        })
    }
}
