use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::HeaderMap;

const TOKEN_COOKIE: &str = "token";

/// Credentials forwarded to the chat host when fetching attachment content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub authorization: Option<String>,
    pub token_cookie: Option<String>,
}

impl Credentials {
    /// Derive credentials from an inbound request. The Authorization header
    /// wins; the `token` cookie is only kept when no Authorization is present.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let authorization = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string);

        if authorization.is_some() {
            return Self {
                authorization,
                token_cookie: None,
            };
        }

        let token_cookie = headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|raw| raw.split(';'))
            .filter_map(|pair| {
                let (name, value) = pair.split_once('=')?;
                (name.trim() == TOKEN_COOKIE).then(|| value.trim().to_string())
            })
            .find(|v| !v.is_empty());

        Self {
            authorization: None,
            token_cookie,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.authorization.is_none() && self.token_cookie.is_none()
    }

    /// Attach the credentials to an outgoing request.
    pub fn apply(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(authorization) = &self.authorization {
            req.header(reqwest::header::AUTHORIZATION, authorization)
        } else if let Some(token) = &self.token_cookie {
            req.header(reqwest::header::COOKIE, format!("{}={}", TOKEN_COOKIE, token))
        } else {
            req
        }
    }
}

/// What the orchestrator needs to know about the inbound chat-host request.
#[derive(Debug, Clone, Default)]
pub struct HostContext {
    /// Host base URL; `None` falls back to `OPENWEBUI_BASE_URL`.
    pub base_url: Option<String>,
    pub credentials: Credentials,
}

impl HostContext {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            base_url: None,
            credentials: Credentials::from_headers(headers),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }
}
