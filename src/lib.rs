//! # edgequake-ocr
//!
//! Extract text from images and documents using a hosted Vision Language Model.
//!
//! ## Why this crate?
//!
//! Classic OCR engines need per-language models, deskewing and careful
//! binarisation to cope with photos of receipts or scanned forms. A vision
//! model reads the file the way a person would. This crate does the plumbing
//! around that call: it gates and encodes one file, sends it to Gemini's
//! `generateContent` endpoint, backs off on rate limits, and hands back clean
//! text ready to copy or save.
//!
//! ## Pipeline Overview
//!
//! ```text
//! file
//!  │
//!  ├─ 1. Intake   size ceiling (20 MiB) + media-type sniffing
//!  ├─ 2. Encode   bytes → base64 inlineData
//!  ├─ 3. Submit   POST generateContent, retry on 429 with 1s·2^n backoff
//!  ├─ 4. Parse    candidates[0].content.parts[0].text
//!  └─ 5. Output   trimmed text → copy (OSC 52) or <name>.txt
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_ocr::{recognize_file, RecognitionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // API key read from GEMINI_API_KEY
//!     let config = RecognitionConfig::default();
//!     let result = recognize_file("receipt.jpg", &config).await?;
//!     println!("{}", result.text);
//!     Ok(())
//! }
//! ```
//!
//! For an interactive flow (stage, retry by hand, reset) use [`OcrSession`].
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `ocr2txt` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! edgequake-ocr = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod notify;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod recognize;
pub mod session;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{RecognitionConfig, RecognitionConfigBuilder, MAX_FILE_BYTES};
pub use error::OcrError;
pub use notify::{Notification, NotificationKind, Notifier, TracingNotifier, TransientNotifier};
pub use output::{result_file_name, write_result, RecognitionResult, RecognitionStats};
pub use pipeline::backoff::{backoff_delay, RetryPolicy};
pub use pipeline::intake::{MediaType, PendingFile};
pub use pipeline::transport::{GenerateContentTransport, HttpTransport, TransportResponse};
pub use progress::{NoopProgressCallback, ProgressCallback, ProgressState, RecognitionProgressCallback};
pub use recognize::{recognize_bytes, recognize_file, recognize_sync, recognize_to_file, Recognizer};
pub use session::{OcrSession, SessionState};
