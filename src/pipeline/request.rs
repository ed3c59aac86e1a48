//! Wire types for the Gemini `generateContent` endpoint.
//!
//! Request:
//! ```json
//! {"contents":[{"role":"user","parts":[{"text":"…"},{"inlineData":{"mimeType":"image/png","data":"…"}}]}]}
//! ```
//! Success response: `candidates[0].content.parts[0].text`.
//! Failure response: `error.message`.
//!
//! Response types make every field optional. A missing `candidates` array is
//! an [`OcrError::EmptyResult`], not a parse error.

use crate::error::{OcrError, EMPTY_RESULT_FALLBACK};
use crate::pipeline::encode::EncodedFile;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

/// One part of a message: either text or inline bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
    /// Any part kind this crate does not use (function calls, etc.).
    Other(serde_json::Value),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Option<Vec<Candidate>>,
    #[serde(default)]
    pub error: Option<ApiError>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Build the single-turn request for one encoded file.
pub fn build_request(instruction: &str, file: &EncodedFile) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content {
            role: Some("user".to_string()),
            parts: vec![
                Part::Text {
                    text: instruction.to_string(),
                },
                Part::InlineData {
                    inline_data: InlineData {
                        mime_type: file.mime_type.to_string(),
                        data: file.data.clone(),
                    },
                },
            ],
        }],
    }
}

impl GenerateContentResponse {
    /// `candidates[0].content.parts[0].text`, if present and non-empty.
    pub fn first_text(&self) -> Option<&str> {
        let part = self
            .candidates
            .as_ref()?
            .first()?
            .content
            .as_ref()?
            .parts
            .first()?;
        match part {
            Part::Text { text } if !text.is_empty() => Some(text),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error
            .as_ref()?
            .message
            .as_deref()
            .filter(|m| !m.is_empty())
    }
}

/// Parse a 2xx body into the extracted text (untrimmed).
pub fn extract_text(body: &str) -> Result<String, OcrError> {
    let response: GenerateContentResponse =
        serde_json::from_str(body).map_err(|e| OcrError::MalformedResponse {
            detail: e.to_string(),
        })?;

    match response.first_text() {
        Some(text) => Ok(text.to_string()),
        None => Err(OcrError::EmptyResult {
            message: response
                .error_message()
                .unwrap_or(EMPTY_RESULT_FALLBACK)
                .to_string(),
        }),
    }
}

/// Best-effort `error.message` from a failure body, for error detail.
pub fn failure_detail(body: &str) -> String {
    serde_json::from_str::<GenerateContentResponse>(body)
        .ok()
        .and_then(|r| r.error_message().map(str::to_string))
        .unwrap_or_default()
}
