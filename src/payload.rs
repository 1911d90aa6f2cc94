//! Binary-in-text image payloads
//!
//! The remote service returns images as base64 text. `ImagePayload` keeps
//! that text together with its MIME type and synthesises the renderable
//! `data:` reference the gallery displays.

use crate::error::{BgRemovalError, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};

/// MIME type of images returned by the removal service
pub const PNG_MIME: &str = "image/png";

const DATA_URI_PREFIX: &str = "data:";
const BASE64_MARKER: &str = ";base64,";

/// Base64-encoded image data with its MIME type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePayload {
    mime: String,
    encoded: String,
}

impl ImagePayload {
    /// Wrap already-encoded base64 text, validating that it decodes
    pub fn from_base64<M: Into<String>, S: Into<String>>(mime: M, encoded: S) -> Result<Self> {
        let encoded = encoded.into();
        BASE64.decode(encoded.as_bytes())?;
        Ok(Self {
            mime: mime.into(),
            encoded,
        })
    }

    /// Encode raw image bytes
    #[must_use]
    pub fn from_bytes<M: Into<String>>(mime: M, bytes: &[u8]) -> Self {
        Self {
            mime: mime.into(),
            encoded: BASE64.encode(bytes),
        }
    }

    /// Encode raw PNG bytes
    #[must_use]
    pub fn png(bytes: &[u8]) -> Self {
        Self::from_bytes(PNG_MIME, bytes)
    }

    /// Parse a `data:<mime>;base64,<text>` reference
    pub fn from_data_uri(uri: &str) -> Result<Self> {
        let rest = uri
            .strip_prefix(DATA_URI_PREFIX)
            .ok_or_else(|| BgRemovalError::decode("data URI must start with 'data:'"))?;
        let (mime, encoded) = rest
            .split_once(BASE64_MARKER)
            .ok_or_else(|| BgRemovalError::decode("data URI is not base64 encoded"))?;
        if mime.is_empty() {
            return Err(BgRemovalError::decode("data URI has no MIME type"));
        }
        Self::from_base64(mime, encoded)
    }

    /// Renderable reference: MIME declaration, base64 marker, then the text
    #[must_use]
    pub fn to_data_uri(&self) -> String {
        format!(
            "{}{}{}{}",
            DATA_URI_PREFIX, self.mime, BASE64_MARKER, self.encoded
        )
    }

    /// Decode back to the original bytes
    pub fn decode(&self) -> Result<Vec<u8>> {
        Ok(BASE64.decode(self.encoded.as_bytes())?)
    }

    #[must_use]
    pub fn mime(&self) -> &str {
        &self.mime
    }

    #[must_use]
    pub fn as_base64(&self) -> &str {
        &self.encoded
    }

    /// Size of the decoded bytes, computed from the base64 length
    #[must_use]
    pub fn decoded_len(&self) -> usize {
        let padding = self.encoded.bytes().rev().take_while(|b| *b == b'=').count();
        (self.encoded.len() / 4 * 3).saturating_sub(padding)
    }
}
