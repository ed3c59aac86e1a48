//! The I/O seam: send one `generateContent` request, get back status + body.
//!
//! The submit loop only needs the HTTP status and the raw body, so that is
//! all a transport returns. Status interpretation (429 vs. other failures)
//! stays in [`crate::pipeline::submit`], which lets tests drive the retry loop
//! with a scripted transport and no network.

use crate::config::RecognitionConfig;
use crate::error::OcrError;
use crate::pipeline::request::GenerateContentRequest;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Status and body of one HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends a request to the model endpoint.
///
/// Implementations return `Ok` for any HTTP status, and `Err` only when no
/// status was received (connection refused, TLS failure, timeout).
#[async_trait]
pub trait GenerateContentTransport: Send + Sync {
    async fn send(&self, request: &GenerateContentRequest) -> Result<TransportResponse, OcrError>;
}

/// `reqwest`-backed transport for the Gemini REST API.
pub struct HttpTransport {
    client: reqwest::Client,
    url: String,
    api_key: String,
}

impl HttpTransport {
    /// Build from config, resolving the API key from config or environment.
    pub fn from_config(config: &RecognitionConfig) -> Result<Self, OcrError> {
        let api_key = config.resolve_api_key()?;
        Self::new(config.endpoint_url(), api_key, config.api_timeout_secs)
    }

    pub fn new(
        url: impl Into<String>,
        api_key: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self, OcrError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| OcrError::Internal(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            url: url.into(),
            api_key: api_key.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl GenerateContentTransport for HttpTransport {
    async fn send(&self, request: &GenerateContentRequest) -> Result<TransportResponse, OcrError> {
        let response = self
            .client
            .post(&self.url)
            .query(&[("key", self.api_key.as_str())])
            .json(request)
            .send()
            .await
            .map_err(|e| OcrError::Network {
                detail: if e.is_timeout() {
                    "request timed out".to_string()
                } else {
                    // Strip the URL, it carries the API key.
                    e.without_url().to_string()
                },
            })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| OcrError::Network {
            detail: format!("failed to read response body: {}", e.without_url()),
        })?;

        debug!("POST {} → {} ({} bytes)", self.url, status, body.len());
        Ok(TransportResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_range() {
        assert!(TransportResponse::new(200, "").is_success());
        assert!(TransportResponse::new(204, "").is_success());
        assert!(!TransportResponse::new(429, "").is_success());
        assert!(!TransportResponse::new(500, "").is_success());
    }

    #[test]
    fn from_config_uses_explicit_key() {
        let config = RecognitionConfig::builder()
            .base_url("http://127.0.0.1:9/v1beta")
            .model("m")
            .api_key("k")
            .build()
            .unwrap();
        let t = HttpTransport::from_config(&config).unwrap();
        assert_eq!(t.url(), "http://127.0.0.1:9/v1beta/models/m:generateContent");
    }
}
