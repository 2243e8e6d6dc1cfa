//! Text acquisition: turning a permit image into recognized text.
//!
//! Recognition itself is delegated to a [`TextRecognizer`]; this crate ships a Cloud Vision
//! adapter and a PDF-aware wrapper behind the `native` feature.

#[cfg(feature = "native")]
mod cloud_vision;
#[cfg(feature = "native")]
mod pdf;

#[cfg(feature = "native")]
pub use cloud_vision::CloudVisionRecognizer;
#[cfg(feature = "native")]
pub use pdf::PdfAwareRecognizer;

use std::path::Path;

use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::AcquisitionError;

/// Text returned by a recognizer, as an ordered list of fragments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognizedText {
    fragments: Vec<String>,
}

impl RecognizedText {
    pub fn new(fragments: Vec<String>) -> Self {
        Self { fragments }
    }

    /// One fragment per line of `text`.
    pub fn from_text(text: &str) -> Self {
        Self::new(text.lines().map(str::to_string).collect())
    }

    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    /// Fragments joined with newlines.
    pub fn full_text(&self) -> String {
        self.fragments.join("\n")
    }

    /// True when no fragment contains visible text.
    pub fn is_blank(&self) -> bool {
        self.fragments.iter().all(|f| f.trim().is_empty())
    }

    /// Append another recognizer's fragments.
    pub fn extend(&mut self, other: RecognizedText) {
        self.fragments.extend(other.fragments);
    }
}

/// An image (or PDF) of a business permit.
#[derive(Debug, Clone)]
pub struct PermitImage {
    bytes: Vec<u8>,
    extension: String,
}

impl PermitImage {
    /// Wrap raw bytes. The extension is sniffed from the content and falls back to
    /// `hint`, then `jpg`.
    pub fn from_bytes(bytes: Vec<u8>, hint: Option<&str>) -> Self {
        let extension = sniff_extension(&bytes)
            .map(str::to_string)
            .or_else(|| {
                hint.map(|h| h.trim_start_matches('.').to_lowercase())
                    .filter(|h| !h.is_empty())
            })
            .unwrap_or_else(|| "jpg".to_string());

        Self { bytes, extension }
    }

    /// Read an image from disk.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let hint = path.extension().and_then(|e| e.to_str());
        Ok(Self::from_bytes(bytes, hint))
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// File extension without the dot, e.g. `png`.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn is_pdf(&self) -> bool {
        self.bytes.starts_with(b"%PDF-")
    }

    /// Standard base64 encoding of the bytes.
    pub fn base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.bytes)
    }
}

fn sniff_extension(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(b"%PDF-") {
        return Some("pdf");
    }
    image::guess_format(bytes)
        .ok()
        .and_then(|format| format.extensions_str().first().copied())
}

/// Contract for text recognizers.
///
/// Implementations must tolerate empty results; an image with no legible text is
/// reported as [`AcquisitionError::NoText`] or an empty [`RecognizedText`].
#[async_trait]
pub trait TextRecognizer: Send + Sync {
    /// Recognize the text in an image.
    async fn recognize(&self, image: &PermitImage) -> Result<RecognizedText, AcquisitionError>;
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Recognizer returning canned text, or an error when constructed with `failing`.
    pub struct StaticRecognizer {
        text: Option<String>,
    }

    impl StaticRecognizer {
        pub fn new(text: &str) -> Self {
            Self {
                text: Some(text.to_string()),
            }
        }

        pub fn failing() -> Self {
            Self { text: None }
        }
    }

    #[async_trait]
    impl TextRecognizer for StaticRecognizer {
        async fn recognize(&self, _image: &PermitImage) -> Result<RecognizedText, AcquisitionError> {
            match &self.text {
                Some(text) => Ok(RecognizedText::from_text(text)),
                None => Err(AcquisitionError::Recognition("service unavailable".to_string())),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0];

    #[test]
    fn test_full_text_joins_fragments() {
        let text = RecognizedText::new(vec!["BUSINESS PERMIT".into(), "NOTES".into()]);
        assert_eq!(text.full_text(), "BUSINESS PERMIT\nNOTES");
        assert!(!text.is_blank());
    }

    #[test]
    fn test_blank_text() {
        assert!(RecognizedText::default().is_blank());
        assert!(RecognizedText::new(vec![" ".into(), "\t".into()]).is_blank());
    }

    #[test]
    fn test_extension_sniffing() {
        assert_eq!(PermitImage::from_bytes(PNG_MAGIC.to_vec(), Some("jpg")).extension(), "png");
        assert_eq!(PermitImage::from_bytes(b"%PDF-1.7".to_vec(), None).extension(), "pdf");
        assert_eq!(PermitImage::from_bytes(b"????".to_vec(), Some(".WEBP")).extension(), "webp");
        assert_eq!(PermitImage::from_bytes(b"????".to_vec(), None).extension(), "jpg");
    }

    #[test]
    fn test_base64() {
        let image = PermitImage::from_bytes(b"abc".to_vec(), None);
        assert_eq!(image.base64(), "YWJj");
        assert!(!image.is_pdf());
    }

    #[test]
    fn test_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("permit.jpeg");
        std::fs::write(&path, b"not really an image").unwrap();

        let image = PermitImage::from_path(&path).unwrap();
        assert_eq!(image.extension(), "jpeg");
        assert_eq!(image.bytes(), b"not really an image");
    }
}
