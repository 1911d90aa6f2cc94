//! Export actions for a composited result
//!
//! Downloads are written to a directory under a generated name, clipboard
//! copies prefer typed image data and fall back to the textual data URI.

use crate::compositor::CompositeArtifact;
use crate::error::{BgRemovalError, Result};
use crate::types::ProcessedResult;
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

const KIB: f64 = 1024.0;
const MIB: f64 = 1024.0 * 1024.0;

/// File name offered for a downloaded result: `processed_image_<millis>.png`
#[must_use]
pub fn download_file_name(result: &ProcessedResult) -> String {
    format!("{}.png", download_stem(result))
}

fn download_stem(result: &ProcessedResult) -> String {
    format!("processed_image_{}", result.completed_at().timestamp_millis())
}

/// Write `artifact` into `dir` under the result's download name
///
/// Existing files are never overwritten: when the name is taken, `_1`, `_2`,
/// ... is appended to the stem until a free name is found.
///
/// # Errors
/// - `BgRemovalError::Download` when the directory or file cannot be written
pub fn save_artifact(
    artifact: &CompositeArtifact,
    result: &ProcessedResult,
    dir: &Path,
) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .map_err(|e| BgRemovalError::download_error_with_path(dir, &e))?;

    let stem = download_stem(result);
    let mut attempt = 0_u32;
    let (path, mut file) = loop {
        let path = if attempt == 0 {
            dir.join(format!("{}.png", stem))
        } else {
            dir.join(format!("{}_{}.png", stem, attempt))
        };
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => break (path, file),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => attempt += 1,
            Err(e) => return Err(BgRemovalError::download_error_with_path(&path, &e)),
        }
    };
    file.write_all(artifact.png_bytes())
        .map_err(|e| BgRemovalError::download_error_with_path(&path, &e))?;

    tracing::info!(
        path = %path.display(),
        size = %format_file_size(artifact.png_bytes().len() as u64),
        "💾 Saved result"
    );
    Ok(path)
}

/// A destination that can hold an image or text
pub trait ClipboardTarget {
    /// Write raw RGBA pixels
    ///
    /// # Errors
    /// - `BgRemovalError::Clipboard` when image data is not accepted
    fn write_image(&mut self, width: u32, height: u32, rgba: &[u8]) -> Result<()>;

    /// Write plain text
    ///
    /// # Errors
    /// - `BgRemovalError::Clipboard` when text is not accepted
    fn write_text(&mut self, text: &str) -> Result<()>;
}

/// What ended up on the clipboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    /// Typed image data
    Image,
    /// The data URI as text, because the image write was rejected
    TextFallback,
}

/// Copy `artifact` to `target`, degrading to its data URI as text
///
/// # Errors
/// - `BgRemovalError::Clipboard` when both the image and the text write fail
pub fn copy_artifact<C: ClipboardTarget + ?Sized>(
    target: &mut C,
    artifact: &CompositeArtifact,
) -> Result<CopyOutcome> {
    let image = artifact.image();
    match target.write_image(image.width(), image.height(), image.as_raw()) {
        Ok(()) => Ok(CopyOutcome::Image),
        Err(e) => {
            tracing::warn!(error = %e, "Image clipboard write rejected, copying data URI instead");
            target.write_text(&artifact.data_uri()).map_err(|text_err| {
                BgRemovalError::clipboard(format!(
                    "image write failed ({}); text fallback failed ({})",
                    e, text_err
                ))
            })?;
            Ok(CopyOutcome::TextFallback)
        },
    }
}

/// The system clipboard
#[cfg(feature = "clipboard")]
pub struct SystemClipboard {
    clipboard: arboard::Clipboard,
}

#[cfg(feature = "clipboard")]
impl SystemClipboard {
    /// Open the system clipboard
    ///
    /// # Errors
    /// - `BgRemovalError::Clipboard` when no clipboard is available
    pub fn new() -> Result<Self> {
        let clipboard = arboard::Clipboard::new()
            .map_err(|e| BgRemovalError::clipboard(format!("Clipboard unavailable: {}", e)))?;
        Ok(Self { clipboard })
    }
}

#[cfg(feature = "clipboard")]
impl ClipboardTarget for SystemClipboard {
    fn write_image(&mut self, width: u32, height: u32, rgba: &[u8]) -> Result<()> {
        let data = arboard::ImageData {
            width: width as usize,
            height: height as usize,
            bytes: std::borrow::Cow::Borrowed(rgba),
        };
        self.clipboard
            .set_image(data)
            .map_err(|e| BgRemovalError::clipboard(format!("Failed to copy image: {}", e)))
    }

    fn write_text(&mut self, text: &str) -> Result<()> {
        self.clipboard
            .set_text(text)
            .map_err(|e| BgRemovalError::clipboard(format!("Failed to copy text: {}", e)))
    }
}

/// Human-readable size, `KB` below one MiB and `MB` above, two decimals
#[must_use]
pub fn format_file_size(bytes: u64) -> String {
    let bytes = bytes as f64;
    if bytes < MIB {
        format!("{:.2} KB", bytes / KIB)
    } else {
        format!("{:.2} MB", bytes / MIB)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::BackgroundColor;
    use crate::compositor::compose_payload;
    use crate::payload::ImagePayload;
    use chrono::{TimeZone, Utc};
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    #[derive(Default)]
    struct FakeClipboard {
        reject_image: bool,
        reject_text: bool,
        image: Option<(u32, u32, usize)>,
        text: Option<String>,
    }

    impl ClipboardTarget for FakeClipboard {
        fn write_image(&mut self, width: u32, height: u32, rgba: &[u8]) -> Result<()> {
            if self.reject_image {
                return Err(BgRemovalError::clipboard("images not supported"));
            }
            self.image = Some((width, height, rgba.len()));
            Ok(())
        }

        fn write_text(&mut self, text: &str) -> Result<()> {
            if self.reject_text {
                return Err(BgRemovalError::clipboard("permission denied"));
            }
            self.text = Some(text.to_string());
            Ok(())
        }
    }

    fn artifact() -> CompositeArtifact {
        let mut png = Cursor::new(Vec::new());
        RgbaImage::from_pixel(3, 2, Rgba([1, 2, 3, 255]))
            .write_to(&mut png, ImageFormat::Png)
            .unwrap();
        compose_payload(
            &ImagePayload::png(&png.into_inner()),
            BackgroundColor::Transparent,
        )
        .unwrap()
    }

    #[test]
    fn test_download_file_name_uses_completion_millis() {
        let at = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        let result = ProcessedResult::with_timestamp("a.png", ImagePayload::png(b"x"), at);
        assert_eq!(
            download_file_name(&result),
            "processed_image_1700000000123.png"
        );
    }

    #[test]
    fn test_save_artifact_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let result = ProcessedResult::new("a.png", ImagePayload::png(b"x"));
        let artifact = artifact();

        let path = save_artifact(&artifact, &result, &dir.path().join("out")).unwrap();
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            download_file_name(&result)
        );
        assert_eq!(std::fs::read(&path).unwrap(), artifact.png_bytes());
    }

    #[test]
    fn test_save_artifact_keeps_same_millisecond_downloads() {
        let dir = tempfile::tempdir().unwrap();
        let at = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        let first = ProcessedResult::with_timestamp("a.png", ImagePayload::png(b"a"), at);
        let second = ProcessedResult::with_timestamp("b.png", ImagePayload::png(b"b"), at);
        let third = ProcessedResult::with_timestamp("c.png", ImagePayload::png(b"c"), at);
        let artifact = artifact();

        let paths: Vec<PathBuf> = [&first, &second, &third]
            .into_iter()
            .map(|result| save_artifact(&artifact, result, dir.path()).unwrap())
            .collect();

        let names: Vec<&str> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(
            names,
            vec![
                "processed_image_1700000000000.png",
                "processed_image_1700000000000_1.png",
                "processed_image_1700000000000_2.png",
            ]
        );
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 3);
        for path in &paths {
            assert_eq!(std::fs::read(path).unwrap(), artifact.png_bytes());
        }
    }

    #[test]
    fn test_save_artifact_reports_download_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"not a dir").unwrap();

        let result = ProcessedResult::new("a.png", ImagePayload::png(b"x"));
        let err = save_artifact(&artifact(), &result, &blocker).unwrap_err();
        assert!(matches!(err, BgRemovalError::Download(_)));
    }

    #[test]
    fn test_copy_prefers_image() {
        let mut clipboard = FakeClipboard::default();
        let outcome = copy_artifact(&mut clipboard, &artifact()).unwrap();
        assert_eq!(outcome, CopyOutcome::Image);
        assert_eq!(clipboard.image, Some((3, 2, 3 * 2 * 4)));
        assert!(clipboard.text.is_none());
    }

    #[test]
    fn test_copy_falls_back_to_data_uri() {
        let mut clipboard = FakeClipboard {
            reject_image: true,
            ..FakeClipboard::default()
        };
        let artifact = artifact();
        let outcome = copy_artifact(&mut clipboard, &artifact).unwrap();
        assert_eq!(outcome, CopyOutcome::TextFallback);
        assert_eq!(clipboard.text, Some(artifact.data_uri()));
    }

    #[test]
    fn test_copy_fails_when_both_writes_fail() {
        let mut clipboard = FakeClipboard {
            reject_image: true,
            reject_text: true,
            ..FakeClipboard::default()
        };
        let err = copy_artifact(&mut clipboard, &artifact()).unwrap_err();
        assert!(matches!(err, BgRemovalError::Clipboard(_)));
    }

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0), "0.00 KB");
        assert_eq!(format_file_size(1536), "1.50 KB");
        assert_eq!(format_file_size(1024 * 1024), "1.00 MB");
        assert_eq!(format_file_size(5 * 1024 * 1024 + 512 * 1024), "5.50 MB");
    }
}
