//! Recognizer that understands PDF permits.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::{PermitImage, RecognizedText, TextRecognizer};
use crate::error::AcquisitionError;
use crate::models::config::PdfConfig;
use crate::pdf::{PdfKind, PermitPdf};

/// Reads the text layer of born-digital PDFs and sends scanned pages to an image recognizer.
///
/// Non-PDF input goes straight to the inner recognizer.
pub struct PdfAwareRecognizer {
    inner: Option<Arc<dyn TextRecognizer>>,
    config: PdfConfig,
}

impl PdfAwareRecognizer {
    /// Text-layer only; scanned PDFs and images are rejected.
    pub fn new(config: PdfConfig) -> Self {
        Self { inner: None, config }
    }

    /// Use `inner` for images and scanned pages.
    pub fn with_inner(mut self, inner: Arc<dyn TextRecognizer>) -> Self {
        self.inner = Some(inner);
        self
    }

    fn inner(&self, what: &str) -> Result<&Arc<dyn TextRecognizer>, AcquisitionError> {
        self.inner.as_ref().ok_or_else(|| {
            AcquisitionError::UnsupportedInput(format!("{} requires an image recognizer", what))
        })
    }

    async fn recognize_pdf(&self, image: &PermitImage) -> Result<RecognizedText, AcquisitionError> {
        let pdf = PermitPdf::load(image.bytes())?;

        let embedded = match pdf.text() {
            Ok(text) => RecognizedText::from_text(&text),
            Err(e) => {
                warn!("Could not read PDF text layer: {}", e);
                RecognizedText::default()
            }
        };
        let embedded_len = embedded.full_text().trim().len();

        if self.config.prefer_embedded_text && embedded_len >= self.config.min_text_length.max(1) {
            debug!("Using embedded PDF text ({} chars)", embedded_len);
            return Ok(embedded);
        }

        let pages = pdf.page_images(self.config.max_pages);
        debug!(
            "{:?} PDF: {} chars embedded text, {} page images",
            PdfKind::from_content(embedded_len > 0, !pages.is_empty()),
            embedded_len,
            pages.len()
        );

        let mut recognized = RecognizedText::default();
        if !pages.is_empty() {
            let inner = self.inner("scanned PDF")?;
            for (i, page) in pages.iter().enumerate() {
                match inner.recognize(page).await {
                    Ok(text) => recognized.extend(text),
                    Err(e) => warn!("Recognition failed for PDF image {}: {}", i + 1, e),
                }
            }
        }

        if !recognized.is_blank() {
            Ok(recognized)
        } else if !embedded.is_blank() {
            Ok(embedded)
        } else {
            Err(AcquisitionError::NoText)
        }
    }
}

#[async_trait]
impl TextRecognizer for PdfAwareRecognizer {
    async fn recognize(&self, image: &PermitImage) -> Result<RecognizedText, AcquisitionError> {
        if image.is_pdf() {
            self.recognize_pdf(image).await
        } else {
            self.inner(image.extension())?.recognize(image).await
        }
    }
}
