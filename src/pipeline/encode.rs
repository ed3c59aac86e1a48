//! Payload encoding: staged file → base64 text for `inlineData.data`.
//!
//! The Gemini REST API takes file bytes inline in the JSON body, so the file
//! is read in full and base64-wrapped (standard alphabet, padded). On-disk
//! files are read here rather than at intake, which makes this the step where
//! an unreadable file surfaces.

use crate::error::OcrError;
use crate::pipeline::intake::{check_size, FileContent, PendingFile};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::debug;

/// Base64 content plus the MIME type it was declared with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedFile {
    pub mime_type: &'static str,
    pub data: String,
}

/// Read and encode a staged file.
///
/// A file that grew past `limit` since staging is rejected with
/// [`OcrError::InputTooLarge`]; an empty or unreadable one with
/// [`OcrError::EncodingFailure`].
pub async fn encode_file(file: &PendingFile, limit: u64) -> Result<EncodedFile, OcrError> {
    let data = match file.content() {
        FileContent::Memory(bytes) => encode_bytes(file.name(), bytes, limit)?,
        FileContent::Disk(path) => {
            let bytes = tokio::fs::read(path)
                .await
                .map_err(|e| OcrError::EncodingFailure {
                    name: file.name().to_string(),
                    detail: e.to_string(),
                })?;
            encode_bytes(file.name(), &bytes, limit)?
        }
    };

    debug!("Encoded '{}' → {} bytes base64", file.name(), data.len());

    Ok(EncodedFile {
        mime_type: file.media_type().mime_type(),
        data,
    })
}

fn encode_bytes(name: &str, bytes: &[u8], limit: u64) -> Result<String, OcrError> {
    check_size(bytes.len() as u64, limit)?;
    if bytes.is_empty() {
        return Err(OcrError::EncodingFailure {
            name: name.to_string(),
            detail: "file is empty".into(),
        });
    }
    Ok(STANDARD.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn encode_in_memory() {
        let f = PendingFile::from_bytes("a.png", "image/png", b"Hello".to_vec(), 1024).unwrap();
        let enc = encode_file(&f, 1024).await.expect("encode should succeed");
        assert_eq!(enc.mime_type, "image/png");
        assert_eq!(enc.data, "SGVsbG8=");
        let decoded = STANDARD.decode(&enc.data).expect("valid base64");
        assert_eq!(decoded, b"Hello");
    }

    #[tokio::test]
    async fn empty_content_is_encoding_failure() {
        let f = PendingFile::from_bytes("a.png", "image/png", Vec::new(), 1024).unwrap();
        let err = encode_file(&f, 1024).await.unwrap_err();
        assert!(matches!(err, OcrError::EncodingFailure { .. }));
    }

    #[tokio::test]
    async fn vanished_file_is_encoding_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.pdf");
        std::fs::write(&path, b"%PDF-1.4\n").unwrap();
        let f = PendingFile::from_path(&path, 1024).unwrap();
        std::fs::remove_file(&path).unwrap();

        let err = encode_file(&f, 1024).await.unwrap_err();
        match err {
            OcrError::EncodingFailure { name, .. } => assert_eq!(name, "scan.pdf"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn grown_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.pdf");
        std::fs::write(&path, b"%PDF").unwrap();
        let f = PendingFile::from_path(&path, 8).unwrap();
        std::fs::write(&path, b"%PDF-1.4 and then some").unwrap();

        let err = encode_file(&f, 8).await.unwrap_err();
        assert!(matches!(err, OcrError::InputTooLarge { .. }));
    }
}
