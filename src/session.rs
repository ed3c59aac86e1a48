//! Single-slot recognition session: intake → recognize → present → reset.
//!
//! A session holds at most one thing at a time: nothing, a staged file, or a
//! staged file together with its result. [`OcrSession::recognize`] borrows the
//! session mutably for the whole run, so a second run cannot start while one
//! is outstanding.
//!
//! ```text
//!            stage            recognize (ok)
//!   Empty ─────────▶ Staged ──────────────▶ Recognized
//!     ▲    remove     │  ▲  recognize (err)      │
//!     └───────────────┘  └──────────────┘        │
//!     └──────────────────── reset ───────────────┘
//! ```

use crate::config::RecognitionConfig;
use crate::error::OcrError;
use crate::notify::{Notification, NotificationKind, TransientNotifier};
use crate::output::{clipboard_sequence, write_result, RecognitionResult};
use crate::pipeline::intake::{check_size, PendingFile};
use crate::progress::ProgressState;
use crate::recognize::Recognizer;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub const MSG_COPIED: &str = "Text copied to clipboard!";
pub const MSG_SAVED: &str = "Text file downloaded!";

/// What the session currently holds.
#[derive(Debug, Clone, Default)]
pub enum SessionState {
    #[default]
    Empty,
    Staged(PendingFile),
    Recognized {
        file: PendingFile,
        result: RecognitionResult,
    },
}

/// One user's walk through a single file.
pub struct OcrSession {
    recognizer: Recognizer,
    state: SessionState,
    banner: Option<TransientNotifier>,
}

impl OcrSession {
    /// Build a session from `config`.
    ///
    /// Without a configured notifier the session keeps its own
    /// [`TransientNotifier`] that clears after `notification_ttl_ms`; read it
    /// with [`OcrSession::notification`].
    pub fn new(mut config: RecognitionConfig) -> Result<Self, OcrError> {
        let banner = match config.notifier {
            Some(_) => None,
            None => {
                let n = TransientNotifier::new(Duration::from_millis(config.notification_ttl_ms));
                config.notifier = Some(Arc::new(n.clone()));
                Some(n)
            }
        };
        let mut session = Self::with_recognizer(Recognizer::new(config)?);
        session.banner = banner;
        Ok(session)
    }

    pub fn with_recognizer(recognizer: Recognizer) -> Self {
        Self {
            recognizer,
            state: SessionState::Empty,
            banner: None,
        }
    }

    /// Message currently on display when the session owns its notifier.
    pub fn notification(&self) -> Option<Notification> {
        self.banner.as_ref().and_then(TransientNotifier::current)
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn pending(&self) -> Option<&PendingFile> {
        match &self.state {
            SessionState::Empty => None,
            SessionState::Staged(file) | SessionState::Recognized { file, .. } => Some(file),
        }
    }

    pub fn result(&self) -> Option<&RecognitionResult> {
        match &self.state {
            SessionState::Recognized { result, .. } => Some(result),
            _ => None,
        }
    }

    pub fn progress(&self) -> ProgressState {
        self.recognizer.progress()
    }

    pub fn recognizer(&self) -> &Recognizer {
        &self.recognizer
    }

    /// Stage `file`, replacing any file already staged.
    ///
    /// Oversize files are refused and the current state is left untouched.
    pub fn stage(&mut self, file: PendingFile) -> Result<(), OcrError> {
        if matches!(self.state, SessionState::Recognized { .. }) {
            return Err(OcrError::ResultActive);
        }
        self.report(check_size(file.size(), self.recognizer.config().max_file_bytes))?;
        debug!("Staging '{}'", file.name());
        self.state = SessionState::Staged(file);
        Ok(())
    }

    /// Stage a local file by path.
    pub fn stage_path(&mut self, path: impl AsRef<Path>) -> Result<(), OcrError> {
        let file = self.report(PendingFile::from_path(
            path,
            self.recognizer.config().max_file_bytes,
        ))?;
        self.stage(file)
    }

    /// Drop the staged file without recognising it.
    pub fn remove(&mut self) -> Result<(), OcrError> {
        if matches!(self.state, SessionState::Recognized { .. }) {
            return Err(OcrError::ResultActive);
        }
        self.state = SessionState::Empty;
        Ok(())
    }

    /// Run the staged file through the pipeline.
    ///
    /// On failure the file stays staged so the caller can try again.
    pub async fn recognize(&mut self) -> Result<&RecognitionResult, OcrError> {
        let file = match &self.state {
            SessionState::Staged(file) => file.clone(),
            SessionState::Recognized { .. } => return Err(OcrError::ResultActive),
            SessionState::Empty => return Err(OcrError::NoPendingFile),
        };

        let result = self.recognizer.recognize(&file).await?;
        self.state = SessionState::Recognized { file, result };
        self.result()
            .ok_or_else(|| OcrError::Internal("result missing after recognition".into()))
    }

    /// Clear staged file and result, back to the initial state.
    pub fn reset(&mut self) {
        self.state = SessionState::Empty;
    }

    /// OSC 52 sequence for the current result; notifies on success.
    pub fn copy_result(&self) -> Result<String, OcrError> {
        let result = self.result().ok_or(OcrError::NoResult)?;
        let seq = clipboard_sequence(&result.text);
        self.recognizer
            .notifier()
            .show(MSG_COPIED, NotificationKind::Success);
        Ok(seq)
    }

    /// Save the current result as `<stem>.txt` in `dir`; notifies on success.
    pub fn save_result(&self, dir: impl AsRef<Path>) -> Result<PathBuf, OcrError> {
        let result = self.result().ok_or(OcrError::NoResult)?;
        let path = self.report(write_result(result, dir))?;
        self.recognizer
            .notifier()
            .show(MSG_SAVED, NotificationKind::Success);
        Ok(path)
    }

    /// Pass `outcome` through, showing the error if there is one.
    fn report<T>(&self, outcome: Result<T, OcrError>) -> Result<T, OcrError> {
        if let Err(ref e) = outcome {
            if e.is_intake_error() {
                debug!("Input rejected: {}", e);
            } else {
                warn!("Session operation failed: {}", e);
            }
            self.recognizer
                .notifier()
                .show(&e.to_string(), NotificationKind::Error);
        }
        outcome
    }
}
