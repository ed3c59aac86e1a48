//! Error types for the edgequake-ocr library.
//!
//! A single enum, [`OcrError`], covers every failure a recognition run can
//! hit. The variants fall into four groups:
//!
//! * **Intake** — the file never made it into the session (too large, wrong
//!   media type, missing). Nothing is mutated and no network call is made.
//! * **Pipeline** — encoding, transport, HTTP status, or response parsing
//!   failed. The staged file is kept so the caller can retry by hand.
//! * **Session** — the caller asked for an operation the single-slot session
//!   cannot perform in its current state.
//! * **Output / config** — writing the result or building the config failed.
//!
//! Only [`OcrError::RateLimited`] is retryable; the submit loop converts a run
//! of them into [`OcrError::RetryExhausted`] once attempts run out.

use std::path::PathBuf;
use thiserror::Error;

/// Message used when a 2xx response carries neither text nor `error.message`.
pub const EMPTY_RESULT_FALLBACK: &str =
    "AI model returned no text or encountered an internal error.";

/// All errors returned by the edgequake-ocr library.
#[derive(Debug, Error)]
pub enum OcrError {
    // ── Intake errors ─────────────────────────────────────────────────────
    /// File exceeds the configured size ceiling.
    #[error("File is {size} bytes, which exceeds the {limit}-byte limit.")]
    InputTooLarge { size: u64, limit: u64 },

    /// File is not one of the accepted image/document types.
    #[error("Unsupported file type for '{name}': {detail}\nSupported: PNG, JPG, WEBP, TIFF, PDF")]
    UnsupportedMediaType { name: String, detail: String },

    /// Input file was not found at the given path.
    #[error("File not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    // ── Pipeline errors ───────────────────────────────────────────────────
    /// File content could not be read for base64 encoding.
    #[error("Failed to read '{name}' for encoding: {detail}")]
    EncodingFailure { name: String, detail: String },

    /// A single attempt was throttled (HTTP 429).
    #[error("AI API rate limit hit (Status: 429).")]
    RateLimited,

    /// Every attempt was throttled.
    #[error("AI API request failed after all {attempts} attempts (rate limited).")]
    RetryExhausted { attempts: u32 },

    /// The endpoint answered with a non-2xx, non-429 status.
    #[error("AI API Request failed (Status: {status}). {detail}")]
    RequestFailure { status: u16, detail: String },

    /// The endpoint answered 2xx but no text could be extracted.
    #[error("{message}")]
    EmptyResult { message: String },

    /// The endpoint answered 2xx with a body that is not the expected JSON.
    #[error("AI API returned a malformed response: {detail}")]
    MalformedResponse { detail: String },

    /// Connection, TLS or timeout failure before a status was received.
    #[error("AI API request could not be sent: {detail}")]
    Network { detail: String },

    /// No API key could be resolved.
    #[error("Gemini provider is not configured.\n{hint}")]
    ProviderNotConfigured { hint: String },

    // ── Session errors ────────────────────────────────────────────────────
    /// `recognize` was called with nothing staged.
    #[error("No file is staged for recognition.")]
    NoPendingFile,

    /// Copy or save was asked for before a recognition succeeded.
    #[error("No recognition result is available yet.")]
    NoResult,

    /// A result is on display; the session must be reset first.
    #[error("A recognition result is active. Reset the session before staging another file.")]
    ResultActive,

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output text file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl OcrError {
    /// Whether the submit loop should try the same request again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, OcrError::RateLimited)
    }

    /// Whether the error was raised before any network activity.
    pub fn is_intake_error(&self) -> bool {
        matches!(
            self,
            OcrError::InputTooLarge { .. }
                | OcrError::UnsupportedMediaType { .. }
                | OcrError::FileNotFound { .. }
                | OcrError::PermissionDenied { .. }
        )
    }
}
