//! Coarse progress reporting for a recognition run.
//!
//! The pipeline does not know how many bytes have reached the server, so
//! progress is a phase indicator rather than a transfer meter. It moves
//! through fixed checkpoints:
//!
//! | Value | Meaning |
//! |-------|---------|
//! | 0     | idle |
//! | 10    | run started |
//! | 30    | file encoded |
//! | 60    | request about to be sent |
//! | 100   | text extracted |
//!
//! and drops back to 0 when the run ends, whatever the outcome.
//!
//! Inject an [`Arc<dyn RecognitionProgressCallback>`] via
//! [`crate::config::RecognitionConfigBuilder::progress_callback`] to receive
//! the checkpoints plus per-attempt retry events.
//!
//! # Example
//!
//! ```rust
//! use edgequake_ocr::{RecognitionProgressCallback, RecognitionConfig};
//! use std::sync::{Arc, atomic::{AtomicU8, Ordering}};
//!
//! struct LastValue(AtomicU8);
//!
//! impl RecognitionProgressCallback for LastValue {
//!     fn on_progress(&self, percent: u8) {
//!         self.0.store(percent, Ordering::SeqCst);
//!     }
//! }
//!
//! let cb = Arc::new(LastValue(AtomicU8::new(0)));
//! let config = RecognitionConfig::builder()
//!     .progress_callback(cb as Arc<dyn RecognitionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;
use std::time::Duration;

/// Progress value after the run has started.
pub const PROGRESS_STARTED: u8 = 10;
/// Progress value once the file is base64-encoded.
pub const PROGRESS_ENCODED: u8 = 30;
/// Progress value just before the first request is sent.
pub const PROGRESS_SUBMITTING: u8 = 60;
/// Progress value when text has been extracted.
pub const PROGRESS_DONE: u8 = 100;

/// Integer progress in `[0, 100]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct ProgressState(u8);

impl ProgressState {
    pub fn new(percent: u8) -> Self {
        Self(percent.min(100))
    }

    pub fn percent(self) -> u8 {
        self.0
    }

    /// Move to `percent`, clamped to 100.
    pub fn set(&mut self, percent: u8) {
        self.0 = percent.min(100);
    }

    pub fn reset(&mut self) {
        self.0 = 0;
    }

    /// Label shown next to a progress bar for this value.
    pub fn phase_label(self) -> &'static str {
        match self.0 {
            0 => "Idle",
            1..=39 => "Converting file to Base64...",
            40..=99 => "Extracting text with AI model...",
            _ => "Done",
        }
    }
}

/// Called by the pipeline as it moves through a recognition run.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait RecognitionProgressCallback: Send + Sync {
    /// Called on every checkpoint, including the final reset to 0.
    fn on_progress(&self, percent: u8) {
        let _ = percent;
    }

    /// Called just before each request is sent.
    ///
    /// # Arguments
    /// * `attempt`      — 1-indexed attempt number
    /// * `max_attempts` — configured attempt ceiling
    fn on_attempt(&self, attempt: u32, max_attempts: u32) {
        let _ = (attempt, max_attempts);
    }

    /// Called after a rate-limited attempt, before sleeping.
    fn on_retry(&self, attempt: u32, delay: Duration) {
        let _ = (attempt, delay);
    }

    /// Called once when the run ends.
    fn on_finish(&self, success: bool) {
        let _ = success;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl RecognitionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::RecognitionConfig`].
pub type ProgressCallback = Arc<dyn RecognitionProgressCallback>;
