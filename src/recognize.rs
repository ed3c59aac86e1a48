//! Recognition entry points.
//!
//! [`Recognizer`] runs one staged file through encode → submit → parse and
//! reports progress and notifications along the way. The free functions wrap
//! it for callers that just have a path.

use crate::config::RecognitionConfig;
use crate::error::OcrError;
use crate::notify::{NotificationKind, Notifier, TracingNotifier};
use crate::output::{write_result, RecognitionResult, RecognitionStats};
use crate::pipeline::backoff::RetryPolicy;
use crate::pipeline::intake::{check_size, PendingFile};
use crate::pipeline::transport::{GenerateContentTransport, HttpTransport};
use crate::pipeline::{encode, postprocess, request, submit};
use crate::progress::{
    ProgressState, RecognitionProgressCallback, PROGRESS_DONE, PROGRESS_ENCODED,
    PROGRESS_STARTED, PROGRESS_SUBMITTING,
};
use crate::prompts::OCR_INSTRUCTION;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{info, warn};

pub const MSG_ENCODED: &str = "File converted. Sending to AI model...";
pub const MSG_SUCCESS: &str = "OCR completed successfully!";

/// Runs the recognition pipeline with a resolved transport and notifier.
pub struct Recognizer {
    config: RecognitionConfig,
    transport: Arc<dyn GenerateContentTransport>,
    notifier: Arc<dyn Notifier>,
    progress: Mutex<ProgressState>,
}

impl Recognizer {
    /// Resolve collaborators from `config`.
    ///
    /// The transport is, in order: `config.transport`, else an
    /// [`HttpTransport`] built from the endpoint settings and API key.
    pub fn new(config: RecognitionConfig) -> Result<Self, OcrError> {
        let transport = match config.transport {
            Some(ref t) => Arc::clone(t),
            None => Arc::new(HttpTransport::from_config(&config)?) as Arc<dyn GenerateContentTransport>,
        };
        let notifier = config
            .notifier
            .clone()
            .unwrap_or_else(|| Arc::new(TracingNotifier) as Arc<dyn Notifier>);

        Ok(Self {
            config,
            transport,
            notifier,
            progress: Mutex::new(ProgressState::default()),
        })
    }

    pub fn config(&self) -> &RecognitionConfig {
        &self.config
    }

    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }

    /// Current progress checkpoint; 0 when no run is active.
    pub fn progress(&self) -> ProgressState {
        *self.progress.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Extract text from `file`.
    ///
    /// Failures are reported to the notifier and returned; nothing about
    /// `file` is consumed, so the caller can run it again. Progress is back at
    /// 0 when this returns.
    pub async fn recognize(&self, file: &PendingFile) -> Result<RecognitionResult, OcrError> {
        // Checked before touching progress so an oversize file leaves no trace.
        if let Err(e) = check_size(file.size(), self.config.max_file_bytes) {
            self.notifier.show(&e.to_string(), NotificationKind::Error);
            return Err(e);
        }

        info!("Starting recognition: {}", file.name());
        let outcome = self.run(file).await;
        self.reset_progress();

        if let Some(ref cb) = self.config.progress_callback {
            cb.on_finish(outcome.is_ok());
        }
        match outcome {
            Ok(result) => {
                self.notifier.show(MSG_SUCCESS, NotificationKind::Success);
                Ok(result)
            }
            Err(e) => {
                warn!("Recognition of '{}' failed: {}", file.name(), e);
                self.notifier.show(&e.to_string(), NotificationKind::Error);
                Err(e)
            }
        }
    }

    async fn run(&self, file: &PendingFile) -> Result<RecognitionResult, OcrError> {
        let total_start = Instant::now();
        self.set_progress(PROGRESS_STARTED);

        // ── Step 1: Encode ───────────────────────────────────────────────────
        let encoded = encode::encode_file(file, self.config.max_file_bytes).await?;
        let encode_duration_ms = total_start.elapsed().as_millis() as u64;
        self.set_progress(PROGRESS_ENCODED);
        self.notifier.show(MSG_ENCODED, NotificationKind::Success);

        // ── Step 2: Build request ────────────────────────────────────────────
        let instruction = self
            .config
            .instruction
            .as_deref()
            .unwrap_or(OCR_INSTRUCTION);
        let body = request::build_request(instruction, &encoded);
        self.set_progress(PROGRESS_SUBMITTING);

        // ── Step 3: Submit with retry ────────────────────────────────────────
        let request_start = Instant::now();
        let policy = RetryPolicy::new(
            self.config.max_attempts,
            Duration::from_millis(self.config.retry_backoff_ms),
        );
        let progress_cb: Option<&dyn RecognitionProgressCallback> =
            self.config.progress_callback.as_deref();
        let outcome =
            submit::submit_with_retry(self.transport.as_ref(), &body, &policy, progress_cb).await?;

        // ── Step 4: Shape result ─────────────────────────────────────────────
        let text = if self.config.clean_output {
            postprocess::clean_text(&outcome.text)
        } else {
            outcome.text
        };
        self.set_progress(PROGRESS_DONE);

        let stats = RecognitionStats {
            attempts: outcome.attempts,
            encoded_bytes: encoded.data.len(),
            encode_duration_ms,
            request_duration_ms: request_start.elapsed().as_millis() as u64,
            total_duration_ms: total_start.elapsed().as_millis() as u64,
        };
        info!(
            "Recognition complete: '{}' → {} chars, {} attempt(s), {}ms",
            file.name(),
            text.trim().len(),
            stats.attempts,
            stats.total_duration_ms
        );

        Ok(RecognitionResult {
            text: text.trim().to_string(),
            file_name: file.name().to_string(),
            media_type: file.media_type(),
            stats,
        })
    }

    fn reset_progress(&self) {
        let percent = {
            let mut state = self.progress.lock().unwrap_or_else(|p| p.into_inner());
            state.reset();
            state.percent()
        };
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_progress(percent);
        }
    }

    fn set_progress(&self, percent: u8) {
        self.progress
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .set(percent);
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_progress(percent);
        }
    }
}

/// Extract text from a local image or PDF.
///
/// # Errors
/// Intake errors (missing, too large, unsupported type) before any network
/// activity; otherwise any pipeline error.
pub async fn recognize_file(
    path: impl AsRef<Path>,
    config: &RecognitionConfig,
) -> Result<RecognitionResult, OcrError> {
    let file = PendingFile::from_path(path, config.max_file_bytes)?;
    Recognizer::new(config.clone())?.recognize(&file).await
}

/// Extract text from an in-memory buffer with a declared MIME type.
pub async fn recognize_bytes(
    name: impl Into<String>,
    mime_type: &str,
    bytes: Vec<u8>,
    config: &RecognitionConfig,
) -> Result<RecognitionResult, OcrError> {
    let file = PendingFile::from_bytes(name, mime_type, bytes, config.max_file_bytes)?;
    Recognizer::new(config.clone())?.recognize(&file).await
}

/// Extract text and save it as `<stem>.txt` inside `output_dir`.
pub async fn recognize_to_file(
    path: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    config: &RecognitionConfig,
) -> Result<(RecognitionResult, PathBuf), OcrError> {
    let result = recognize_file(path, config).await?;
    let written = write_result(&result, output_dir)?;
    Ok((result, written))
}

/// Synchronous wrapper around [`recognize_file`].
///
/// Creates a temporary tokio runtime internally.
pub fn recognize_sync(
    path: impl AsRef<Path>,
    config: &RecognitionConfig,
) -> Result<RecognitionResult, OcrError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| OcrError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(recognize_file(path, config))
}
