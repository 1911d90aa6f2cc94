//! Result compositor
//!
//! Flattens a processed result over a background colour. Every call owns a
//! fresh RGBA surface, so concurrent compositions never share state.

use crate::color::BackgroundColor;
use crate::error::{BgRemovalError, Result};
use crate::payload::{ImagePayload, PNG_MIME};
use crate::tracing_config::spans;
use crate::types::ProcessedResult;
use image::{imageops, DynamicImage, ImageFormat, RgbaImage};
use instant::Instant;
use std::io::Cursor;

/// A flattened image ready for download or the clipboard
#[derive(Debug, Clone)]
pub struct CompositeArtifact {
    image: RgbaImage,
    png: Vec<u8>,
}

impl CompositeArtifact {
    #[must_use]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Raw RGBA pixels, row-major
    #[must_use]
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Encoded PNG bytes
    #[must_use]
    pub fn png_bytes(&self) -> &[u8] {
        &self.png
    }

    #[must_use]
    pub fn payload(&self) -> ImagePayload {
        ImagePayload::png(&self.png)
    }

    #[must_use]
    pub fn data_uri(&self) -> String {
        self.payload().to_data_uri()
    }
}

/// Flatten `result` over `background`
///
/// The output has exactly the source dimensions. A `Transparent` background
/// skips the fill, leaving the source pixels untouched.
///
/// # Errors
/// - `BgRemovalError::Decode` when the payload is not base64 or not a
///   decodable raster image
/// - `BgRemovalError::Internal` when PNG encoding fails
pub fn compose(result: &ProcessedResult, background: BackgroundColor) -> Result<CompositeArtifact> {
    let _span = spans::compose(result.file_name(), &background.to_hex()).entered();
    let start = Instant::now();
    let artifact = compose_payload(result.payload(), background)?;
    tracing::debug!(
        file = %result.file_name(),
        id = %result.id(),
        background = %background,
        width = artifact.width(),
        height = artifact.height(),
        duration_ms = start.elapsed().as_millis() as u64,
        "Composited result"
    );
    Ok(artifact)
}

/// Flatten an arbitrary image payload over `background`
///
/// # Errors
/// Same as [`compose`].
pub fn compose_payload(
    payload: &ImagePayload,
    background: BackgroundColor,
) -> Result<CompositeArtifact> {
    let source = decode_image(payload)?.to_rgba8();

    let image = match background {
        BackgroundColor::Transparent => source,
        BackgroundColor::Solid(color) => {
            let mut surface = RgbaImage::from_pixel(source.width(), source.height(), color);
            imageops::overlay(&mut surface, &source, 0, 0);
            surface
        },
    };

    let png = encode_png(&image)?;
    Ok(CompositeArtifact { image, png })
}

/// Width and height of the image carried by `payload`
///
/// # Errors
/// - `BgRemovalError::Decode` when the payload is not a decodable image
pub fn decode_dimensions(payload: &ImagePayload) -> Result<(u32, u32)> {
    let image = decode_image(payload)?;
    Ok((image.width(), image.height()))
}

fn decode_image(payload: &ImagePayload) -> Result<DynamicImage> {
    let bytes = payload.decode()?;
    image::load_from_memory(&bytes).map_err(|e| {
        BgRemovalError::decode(format!(
            "Failed to decode {} payload ({} bytes): {}",
            payload.mime(),
            bytes.len(),
            e
        ))
    })
}

fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, ImageFormat::Png)
        .map_err(|e| BgRemovalError::internal(format!("Failed to encode {}: {}", PNG_MIME, e)))?;
    Ok(buffer.into_inner())
}
