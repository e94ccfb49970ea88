use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::workflow::Orchestrator;

const DEFAULT_SUMMARY_QUESTION: &str =
    "Сделай краткое summary документа и перечисли ключевые факты.";

/// Bridge parameters, read once at startup.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Document assistant base URL (upload, status and RAG endpoints).
    pub assistant_api_url: String,
    /// Chat host base URL used when the request does not carry one.
    pub host_base_url: String,
    /// Overall deadline for a document to reach a terminal status.
    pub ingest_timeout: Duration,
    /// Fixed wait between two status checks.
    pub poll_interval: Duration,
    pub default_question: String,
    /// Optional `limit` forwarded with every RAG query.
    pub rag_limit: Option<u32>,
    pub bind_addr: SocketAddr,
    pub download_timeout: Duration,
    pub upload_timeout: Duration,
    pub status_timeout: Duration,
    pub rag_timeout: Duration,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            assistant_api_url: "http://api:8080".to_string(),
            host_base_url: "http://openwebui:8080".to_string(),
            ingest_timeout: Duration::from_secs(240),
            poll_interval: Duration::from_secs(2),
            default_question: DEFAULT_SUMMARY_QUESTION.to_string(),
            rag_limit: None,
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8090)),
            download_timeout: Duration::from_secs(60),
            upload_timeout: Duration::from_secs(120),
            status_timeout: Duration::from_secs(30),
            rag_timeout: Duration::from_secs(120),
        }
    }
}

impl BridgeConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| dotenv::var(key).ok())
    }

    /// Build a config from any key lookup. Missing or unparseable values keep
    /// their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let default = Self::default();
        let text = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let secs = |key: &str, fallback: Duration| match text(key) {
            Some(raw) => match raw.parse::<f64>().map(Duration::try_from_secs_f64) {
                Ok(Ok(v)) => v,
                _ => {
                    warn!(key, value = %raw, "Ignoring invalid duration, using default");
                    fallback
                }
            },
            None => fallback,
        };

        let rag_limit = text("ASSISTANT_RAG_LIMIT").and_then(|raw| match raw.parse::<u32>() {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(value = %raw, "Ignoring invalid ASSISTANT_RAG_LIMIT");
                None
            }
        });

        let bind_addr = match text("BRIDGE_BIND_ADDR") {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                warn!(value = %raw, "Ignoring invalid BRIDGE_BIND_ADDR");
                default.bind_addr
            }),
            None => default.bind_addr,
        };

        Self {
            assistant_api_url: text("ASSISTANT_API_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(default.assistant_api_url),
            host_base_url: text("OPENWEBUI_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(default.host_base_url),
            ingest_timeout: secs("ASSISTANT_INGEST_TIMEOUT_SECONDS", default.ingest_timeout),
            poll_interval: secs("ASSISTANT_INGEST_POLL_SECONDS", default.poll_interval),
            default_question: lookup("ASSISTANT_DEFAULT_SUMMARY_QUESTION")
                .filter(|q| !q.trim().is_empty())
                .unwrap_or(default.default_question),
            rag_limit,
            bind_addr,
            download_timeout: secs("BRIDGE_DOWNLOAD_TIMEOUT_SECONDS", default.download_timeout),
            upload_timeout: secs("BRIDGE_UPLOAD_TIMEOUT_SECONDS", default.upload_timeout),
            status_timeout: secs("BRIDGE_STATUS_TIMEOUT_SECONDS", default.status_timeout),
            rag_timeout: secs("BRIDGE_RAG_TIMEOUT_SECONDS", default.rag_timeout),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
}
