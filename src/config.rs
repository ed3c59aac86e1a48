//! Configuration types for image/document text extraction.
//!
//! All recognition behaviour is controlled through [`RecognitionConfig`], built
//! via its [`RecognitionConfigBuilder`]. The collaborators the pipeline talks to
//! (transport, notifier, progress callback) live here too, so tests can swap
//! any of them without touching pipeline code.

use crate::error::OcrError;
use crate::notify::Notifier;
use crate::pipeline::transport::GenerateContentTransport;
use crate::progress::ProgressCallback;
use std::fmt;
use std::sync::Arc;

/// Hard ceiling on the size of a staged file: 20 MiB.
pub const MAX_FILE_BYTES: u64 = 20 * 1024 * 1024;

/// Default Gemini REST base URL.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default vision model.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-preview-09-2025";

/// Environment variable consulted when no API key is configured.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Configuration for a recognition run.
///
/// Built via [`RecognitionConfig::builder()`] or using
/// [`RecognitionConfig::default()`].
///
/// # Example
/// ```rust
/// use edgequake_ocr::RecognitionConfig;
///
/// let config = RecognitionConfig::builder()
///     .model("gemini-2.0-flash")
///     .max_attempts(3)
///     .build()
///     .unwrap();
/// assert_eq!(config.max_attempts, 3);
/// ```
#[derive(Clone)]
pub struct RecognitionConfig {
    /// REST base URL, without a trailing slash.
    pub base_url: String,

    /// Model identifier inserted into `/models/{model}:generateContent`.
    pub model: String,

    /// API key. If None, read from `GEMINI_API_KEY` when the HTTP transport is built.
    pub api_key: Option<String>,

    /// Total attempts, first call included. Default: 5.
    ///
    /// Only HTTP 429 triggers another attempt; every other failure is final.
    pub max_attempts: u32,

    /// Base delay for exponential backoff in milliseconds. Default: 1000.
    ///
    /// The wait after attempt `n` (0-indexed) is `retry_backoff_ms * 2^n`.
    pub retry_backoff_ms: u64,

    /// Largest accepted file in bytes. Default: 20 MiB.
    pub max_file_bytes: u64,

    /// Per-request HTTP timeout in seconds. Default: 120.
    pub api_timeout_secs: u64,

    /// Custom extraction instruction. If None, uses [`crate::prompts::OCR_INSTRUCTION`].
    pub instruction: Option<String>,

    /// Run the extracted text through [`crate::pipeline::postprocess::clean_text`]. Default: false.
    pub clean_output: bool,

    /// How long a transient notification stays visible, in milliseconds. Default: 5000.
    pub notification_ttl_ms: u64,

    /// Pre-constructed transport. Takes precedence over `base_url`/`api_key`.
    pub transport: Option<Arc<dyn GenerateContentTransport>>,

    /// Receiver for user-facing messages. If None, messages go to `tracing`.
    pub notifier: Option<Arc<dyn Notifier>>,

    /// Optional progress callback for checkpoint and retry events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            max_attempts: 5,
            retry_backoff_ms: 1000,
            max_file_bytes: MAX_FILE_BYTES,
            api_timeout_secs: 120,
            instruction: None,
            clean_output: false,
            notification_ttl_ms: 5000,
            transport: None,
            notifier: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for RecognitionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecognitionConfig")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("max_attempts", &self.max_attempts)
            .field("retry_backoff_ms", &self.retry_backoff_ms)
            .field("max_file_bytes", &self.max_file_bytes)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("instruction", &self.instruction.as_ref().map(|s| s.len()))
            .field("clean_output", &self.clean_output)
            .field("notification_ttl_ms", &self.notification_ttl_ms)
            .field("transport", &self.transport.as_ref().map(|_| "<dyn GenerateContentTransport>"))
            .field("notifier", &self.notifier.as_ref().map(|_| "<dyn Notifier>"))
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn RecognitionProgressCallback>"),
            )
            .finish()
    }
}

impl RecognitionConfig {
    /// Create a new builder for `RecognitionConfig`.
    pub fn builder() -> RecognitionConfigBuilder {
        RecognitionConfigBuilder {
            config: Self::default(),
        }
    }

    /// Full `generateContent` URL for the configured model, without the key.
    pub fn endpoint_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }

    /// Resolve the API key: explicit config first, then `GEMINI_API_KEY`.
    pub fn resolve_api_key(&self) -> Result<String, OcrError> {
        if let Some(ref key) = self.api_key {
            if !key.is_empty() {
                return Ok(key.clone());
            }
        }
        match std::env::var(API_KEY_ENV) {
            Ok(key) if !key.is_empty() => Ok(key),
            _ => Err(OcrError::ProviderNotConfigured {
                hint: format!("Set {API_KEY_ENV} or pass an API key explicitly."),
            }),
        }
    }
}

/// Builder for [`RecognitionConfig`].
#[derive(Debug)]
pub struct RecognitionConfigBuilder {
    config: RecognitionConfig,
}

impl RecognitionConfigBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn max_attempts(mut self, n: u32) -> Self {
        self.config.max_attempts = n;
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_ms = ms;
        self
    }

    pub fn max_file_bytes(mut self, n: u64) -> Self {
        self.config.max_file_bytes = n;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn instruction(mut self, prompt: impl Into<String>) -> Self {
        self.config.instruction = Some(prompt.into());
        self
    }

    pub fn clean_output(mut self, v: bool) -> Self {
        self.config.clean_output = v;
        self
    }

    pub fn notification_ttl_ms(mut self, ms: u64) -> Self {
        self.config.notification_ttl_ms = ms;
        self
    }

    pub fn transport(mut self, transport: Arc<dyn GenerateContentTransport>) -> Self {
        self.config.transport = Some(transport);
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.config.notifier = Some(notifier);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<RecognitionConfig, OcrError> {
        let c = &self.config;
        if c.max_attempts == 0 {
            return Err(OcrError::InvalidConfig(
                "max_attempts must be ≥ 1".into(),
            ));
        }
        if c.max_file_bytes == 0 {
            return Err(OcrError::InvalidConfig(
                "max_file_bytes must be ≥ 1".into(),
            ));
        }
        if c.model.trim().is_empty() {
            return Err(OcrError::InvalidConfig("model must not be empty".into()));
        }
        if c.transport.is_none() && !is_http_url(&c.base_url) {
            return Err(OcrError::InvalidConfig(format!(
                "base_url must be an HTTP/HTTPS URL, got '{}'",
                c.base_url
            )));
        }
        Ok(self.config)
    }
}

fn is_http_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_service_contract() {
        let c = RecognitionConfig::default();
        assert_eq!(c.max_attempts, 5);
        assert_eq!(c.retry_backoff_ms, 1000);
        assert_eq!(c.max_file_bytes, 20_971_520);
        assert_eq!(c.notification_ttl_ms, 5000);
        assert!(!c.clean_output);
    }

    #[test]
    fn endpoint_url_strips_trailing_slash() {
        let c = RecognitionConfig::builder()
            .base_url("http://localhost:8080/v1beta/")
            .model("gemini-2.0-flash")
            .build()
            .unwrap();
        assert_eq!(
            c.endpoint_url(),
            "http://localhost:8080/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }

    #[test]
    fn zero_attempts_rejected() {
        let err = RecognitionConfig::builder().max_attempts(0).build().unwrap_err();
        assert!(matches!(err, OcrError::InvalidConfig(_)));
    }

    #[test]
    fn non_http_base_url_rejected() {
        let err = RecognitionConfig::builder()
            .base_url("ftp://example.com")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("ftp://example.com"));
    }

    #[test]
    fn explicit_api_key_wins() {
        let c = RecognitionConfig::builder().api_key("k-123").build().unwrap();
        assert_eq!(c.resolve_api_key().unwrap(), "k-123");
    }

    #[test]
    fn debug_redacts_api_key() {
        let c = RecognitionConfig::builder().api_key("secret-key").build().unwrap();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("secret-key"));
        assert!(dbg.contains("<redacted>"));
    }
}
