//! File intake: turn a user-supplied path or buffer into a [`PendingFile`].
//!
//! Intake is the only gate before the network. It refuses anything larger
//! than the configured ceiling *before reading the content*, and anything
//! that is not one of the five accepted media types. Media type is sniffed
//! from magic bytes first (an `.jpg` that is really a PNG is sent as PNG) and
//! falls back to the file extension when the header is not recognised.

use crate::error::OcrError;
use image::ImageFormat;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Number of header bytes read for magic-byte sniffing. WebP needs 12.
const SNIFF_LEN: usize = 16;

/// Accepted input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaType {
    Png,
    Jpeg,
    Webp,
    Tiff,
    Pdf,
}

impl MediaType {
    pub const ALL: [MediaType; 5] = [
        MediaType::Png,
        MediaType::Jpeg,
        MediaType::Webp,
        MediaType::Tiff,
        MediaType::Pdf,
    ];

    /// MIME string sent as `inlineData.mimeType`.
    pub fn mime_type(self) -> &'static str {
        match self {
            MediaType::Png => "image/png",
            MediaType::Jpeg => "image/jpeg",
            MediaType::Webp => "image/webp",
            MediaType::Tiff => "image/tiff",
            MediaType::Pdf => "application/pdf",
        }
    }

    /// Parse a MIME string. `image/jpg` is accepted as an alias.
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/png" => Some(MediaType::Png),
            "image/jpeg" | "image/jpg" => Some(MediaType::Jpeg),
            "image/webp" => Some(MediaType::Webp),
            "image/tiff" => Some(MediaType::Tiff),
            "application/pdf" => Some(MediaType::Pdf),
            _ => None,
        }
    }

    /// Detect the type from the first bytes of the content.
    pub fn sniff(header: &[u8]) -> Option<Self> {
        if header.starts_with(b"%PDF") {
            return Some(MediaType::Pdf);
        }
        image::guess_format(header).ok().and_then(Self::from_image_format)
    }

    /// Detect the type from a path's extension.
    pub fn from_path_extension(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        if ext.eq_ignore_ascii_case("pdf") {
            return Some(MediaType::Pdf);
        }
        ImageFormat::from_extension(ext).and_then(Self::from_image_format)
    }

    fn from_image_format(format: ImageFormat) -> Option<Self> {
        match format {
            ImageFormat::Png => Some(MediaType::Png),
            ImageFormat::Jpeg => Some(MediaType::Jpeg),
            ImageFormat::WebP => Some(MediaType::Webp),
            ImageFormat::Tiff => Some(MediaType::Tiff),
            _ => None,
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime_type())
    }
}

/// Where the staged bytes live.
#[derive(Debug, Clone)]
pub enum FileContent {
    /// Bytes supplied by the caller.
    Memory(Vec<u8>),
    /// A local file, read at encode time.
    Disk(PathBuf),
}

/// The single file staged for recognition.
#[derive(Debug, Clone)]
pub struct PendingFile {
    name: String,
    media_type: MediaType,
    size: u64,
    content: FileContent,
}

impl PendingFile {
    /// Stage a local file.
    ///
    /// Checks, in order: existence and read permission, size against `limit`
    /// (from metadata only), then media type.
    pub fn from_path(path: impl AsRef<Path>, limit: u64) -> Result<Self, OcrError> {
        let path = path.as_ref().to_path_buf();

        let meta = std::fs::metadata(&path).map_err(|e| io_to_intake(e, &path))?;
        if !meta.is_file() {
            return Err(OcrError::FileNotFound { path });
        }
        check_size(meta.len(), limit)?;

        let mut header = Vec::with_capacity(SNIFF_LEN);
        std::fs::File::open(&path)
            .and_then(|f| f.take(SNIFF_LEN as u64).read_to_end(&mut header))
            .map_err(|e| io_to_intake(e, &path))?;

        let name = display_name(&path);
        let media_type = MediaType::sniff(&header)
            .or_else(|| MediaType::from_path_extension(&path))
            .ok_or_else(|| OcrError::UnsupportedMediaType {
                name: name.clone(),
                detail: "unrecognised file header and extension".into(),
            })?;

        debug!(
            "Staged '{}' ({}, {})",
            name,
            media_type,
            format_file_size(meta.len())
        );

        Ok(Self {
            name,
            media_type,
            size: meta.len(),
            content: FileContent::Disk(path),
        })
    }

    /// Stage an in-memory buffer with a declared MIME type.
    ///
    /// Only the last path component of `name` is kept.
    pub fn from_bytes(
        name: impl Into<String>,
        mime_type: &str,
        bytes: Vec<u8>,
        limit: u64,
    ) -> Result<Self, OcrError> {
        let name = base_name(&name.into()).to_string();
        check_size(bytes.len() as u64, limit)?;
        let media_type =
            MediaType::from_mime(mime_type).ok_or_else(|| OcrError::UnsupportedMediaType {
                name: name.clone(),
                detail: format!("'{mime_type}' is not accepted"),
            })?;

        Ok(Self {
            name,
            media_type,
            size: bytes.len() as u64,
            content: FileContent::Memory(bytes),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn media_type(&self) -> MediaType {
        self.media_type
    }

    /// Byte length recorded at staging time.
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn content(&self) -> &FileContent {
        &self.content
    }
}

/// Last component of a display name, splitting on both `/` and `\\`.
pub fn base_name(name: &str) -> &str {
    name.rsplit(['/', '\\']).next().unwrap_or(name)
}

/// Reject `size` above `limit`.
pub fn check_size(size: u64, limit: u64) -> Result<(), OcrError> {
    if size > limit {
        return Err(OcrError::InputTooLarge { size, limit });
    }
    Ok(())
}

/// Human-readable byte size: `0 Bytes`, `512 Bytes`, `1.5 KB`, `20 MB`.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let i = ((bytes as f64).ln() / 1024f64.ln()).floor() as usize;
    let i = i.min(UNITS.len() - 1);
    let value = bytes as f64 / 1024f64.powi(i as i32);
    let mut s = format!("{value:.2}");
    if s.contains('.') {
        s = s.trim_end_matches('0').trim_end_matches('.').to_string();
    }
    format!("{} {}", s, UNITS[i])
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn io_to_intake(e: std::io::Error, path: &Path) -> OcrError {
    match e.kind() {
        std::io::ErrorKind::PermissionDenied => OcrError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => OcrError::FileNotFound {
            path: path.to_path_buf(),
        },
    }
}
