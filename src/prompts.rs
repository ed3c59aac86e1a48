//! Instruction text sent alongside every file.
//!
//! Callers can override it via [`crate::config::RecognitionConfig::instruction`];
//! the constant here is used only when no override is provided.

/// Default extraction instruction.
///
/// The model is asked for bare text only. Any greeting or description it adds
/// ends up in the user's clipboard, so the prompt is explicit about that.
pub const OCR_INSTRUCTION: &str = "Perform Optical Character Recognition (OCR) on the provided image/document. \
Extract all visible text into a single, clean block of plain text. \
Do not add any introductory phrases, commentary, or descriptions of the image content; \
just output the extracted text.";
