//! Pipeline stages for image/document text extraction.
//!
//! Each submodule implements exactly one step, so each can be tested without
//! the others and the transport can be swapped without touching the retry
//! logic.
//!
//! ## Data Flow
//!
//! ```text
//! intake ──▶ encode ──▶ request ──▶ submit ──▶ postprocess
//! (gate)     (base64)   (JSON)      (HTTP+retry) (optional cleanup)
//! ```
//!
//! 1. [`intake`]    — size gate and media-type detection, builds a `PendingFile`
//! 2. [`encode`]    — read the content and base64-wrap it
//! 3. [`request`]   — `generateContent` wire types and response parsing
//! 4. [`submit`]    — drive the call with retry on 429; uses
//!    [`backoff`] for wait times and [`transport`] for I/O
//! 5. [`postprocess`] — deterministic cleanup of model quirks (opt-in)

pub mod backoff;
pub mod encode;
pub mod intake;
pub mod postprocess;
pub mod request;
pub mod submit;
pub mod transport;
