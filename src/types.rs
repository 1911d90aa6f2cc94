//! Core data types flowing through the upload pipeline

use crate::error::{BgRemovalError, Result};
use crate::payload::ImagePayload;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use uuid::Uuid;

/// One file submitted for background removal
///
/// Consumed by the pipeline; dropped once its remote call settles.
#[derive(Debug, Clone)]
pub struct ProcessingRequest {
    file_name: String,
    bytes: Vec<u8>,
}

impl ProcessingRequest {
    #[must_use]
    pub fn new<S: Into<String>>(file_name: S, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    /// Read a request from disk, keeping the file name as the display name
    pub async fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            BgRemovalError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read '{}': {}", path.display(), e),
            ))
        })?;
        let file_name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        Ok(Self::new(file_name, bytes))
    }

    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// MIME type guessed from the file extension
    #[must_use]
    pub fn mime_type(&self) -> &'static str {
        let extension = Path::new(&self.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("png") => "image/png",
            Some("jpg" | "jpeg") => "image/jpeg",
            Some("webp") => "image/webp",
            Some("bmp") => "image/bmp",
            Some("tif" | "tiff") => "image/tiff",
            Some("gif") => "image/gif",
            _ => "application/octet-stream",
        }
    }

    pub(crate) fn into_parts(self) -> (String, Vec<u8>) {
        (self.file_name, self.bytes)
    }
}

/// Render/de-duplication key for a result, independent of its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResultId(Uuid);

impl ResultId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ResultId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ResultId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A completed background removal output; immutable once created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedResult {
    id: ResultId,
    payload: ImagePayload,
    completed_at: DateTime<Utc>,
    file_name: String,
}

impl ProcessedResult {
    /// New result stamped with a fresh id and the current time
    #[must_use]
    pub fn new<S: Into<String>>(file_name: S, payload: ImagePayload) -> Self {
        Self::with_timestamp(file_name, payload, Utc::now())
    }

    /// New result with an explicit completion time
    #[must_use]
    pub fn with_timestamp<S: Into<String>>(
        file_name: S,
        payload: ImagePayload,
        completed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ResultId::new(),
            payload,
            completed_at,
            file_name: file_name.into(),
        }
    }

    #[must_use]
    pub fn id(&self) -> ResultId {
        self.id
    }

    #[must_use]
    pub fn payload(&self) -> &ImagePayload {
        &self.payload
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Renderable image reference for display
    #[must_use]
    pub fn data_uri(&self) -> String {
        self.payload.to_data_uri()
    }
}
