//! PDF processing module.
//!
//! Permits arrive either as born-digital PDFs with a text layer or as scans wrapped in a
//! PDF. The first are read directly; the second have their page images pulled out for
//! recognition.

mod extractor;

pub use extractor::PermitPdf;

/// Type of PDF content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PdfKind {
    /// Contains extractable text.
    Text,
    /// Contains only images (scanned document).
    Image,
    /// Contains both text and images.
    Hybrid,
    /// Empty or unreadable.
    Empty,
}

impl PdfKind {
    pub fn from_content(has_text: bool, has_images: bool) -> Self {
        match (has_text, has_images) {
            (true, false) => PdfKind::Text,
            (false, true) => PdfKind::Image,
            (true, true) => PdfKind::Hybrid,
            (false, false) => PdfKind::Empty,
        }
    }
}
