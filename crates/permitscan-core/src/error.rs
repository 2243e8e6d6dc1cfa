//! Error types for the permitscan-core library.

use thiserror::Error;

/// Main error type for the permitscan library.
#[derive(Error, Debug)]
pub enum PermitScanError {
    /// Text acquisition error.
    #[error("acquisition error: {0}")]
    Acquisition(#[from] AcquisitionError),

    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Saving permit data failed.
    #[error("persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    /// Image decoding/encoding error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised while turning an image into recognized text.
#[derive(Error, Debug)]
pub enum AcquisitionError {
    /// The recognizer ran but produced no usable text.
    #[error("no text recognized")]
    NoText,

    /// No API key was configured for a cloud recognizer.
    #[error("no API key configured for text recognition")]
    MissingApiKey,

    /// Recognition failed for a recognizer-specific reason.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// The recognition service returned an error status.
    #[error("recognition service error {code}: {message}")]
    Api { code: i32, message: String },

    /// HTTP transport error.
    #[cfg(feature = "native")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Input cannot be handled by this recognizer.
    #[error("unsupported input: {0}")]
    UnsupportedInput(String),

    /// PDF input could not be read.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// Failed to extract images from PDF.
    #[error("failed to extract images: {0}")]
    ImageExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),
}

/// Errors raised by the save-permit collaborator.
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// Signup IDs start at 1.
    #[error("invalid signup id: {0}")]
    InvalidSignupId(u64),

    /// No endpoint configured.
    #[error("persistence endpoint is not configured")]
    NotConfigured,

    /// HTTP transport error.
    #[cfg(feature = "native")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with something that is not the expected JSON.
    #[error("server returned invalid JSON: {0}")]
    InvalidResponse(String),
}

/// Result type for the permitscan library.
pub type Result<T> = std::result::Result<T, PermitScanError>;
