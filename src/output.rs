//! Recognition result and the two ways to take it away: save or copy.

use crate::error::OcrError;
use crate::pipeline::intake::{base_name, MediaType};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// File name used when the source name has no usable stem.
pub const FALLBACK_STEM: &str = "ocr_result";

/// Text extracted from one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognitionResult {
    /// Extracted text, trimmed.
    pub text: String,
    /// Display name of the file it came from.
    pub file_name: String,
    pub media_type: MediaType,
    pub stats: RecognitionStats,
}

/// Timing and retry figures for a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognitionStats {
    /// Requests sent, the successful one included.
    pub attempts: u32,
    /// Size of the base64 payload.
    pub encoded_bytes: usize,
    pub encode_duration_ms: u64,
    pub request_duration_ms: u64,
    pub total_duration_ms: u64,
}

impl RecognitionResult {
    /// Name of the `.txt` file this result saves to.
    pub fn download_name(&self) -> String {
        result_file_name(&self.file_name)
    }
}

/// `<stem>.txt`, where stem is everything before the first `.` of the last
/// path component of `file_name`.
///
/// Falls back to `ocr_result.txt` when that part is empty (`.hidden`, `""`,
/// `dir/`). Directory parts are dropped, so the name never leaves the
/// directory it is joined onto.
pub fn result_file_name(file_name: &str) -> String {
    let stem = base_name(file_name).split('.').next().unwrap_or_default();
    if stem.is_empty() {
        format!("{FALLBACK_STEM}.txt")
    } else {
        format!("{stem}.txt")
    }
}

/// Write `result.text` to `dir/<download_name>` and return the path.
///
/// Uses atomic write (temp file in the same directory + rename) so a reader
/// never sees a half-written file.
pub fn write_result(result: &RecognitionResult, dir: impl AsRef<Path>) -> Result<PathBuf, OcrError> {
    let dir = dir.as_ref();
    let path = dir.join(result.download_name());
    let fail = |source: std::io::Error| OcrError::OutputWriteFailed {
        path: path.clone(),
        source,
    };

    std::fs::create_dir_all(dir).map_err(fail)?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(fail)?;
    tmp.write_all(result.text.as_bytes()).map_err(fail)?;
    tmp.persist(&path).map_err(|e| fail(e.error))?;

    info!("Saved {} bytes to {}", result.text.len(), path.display());
    Ok(path)
}

/// OSC 52 sequence that puts `text` on the system clipboard.
///
/// Write it to a terminal (stdout or stderr attached to a TTY); terminals that
/// support OSC 52 copy the decoded payload and print nothing.
pub fn clipboard_sequence(text: &str) -> String {
    format!("\x1b]52;c;{}\x07", STANDARD.encode(text.as_bytes()))
}
