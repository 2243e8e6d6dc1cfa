//! Core library for business permit OCR processing.
//!
//! This crate provides:
//! - The text acquisition contract plus Cloud Vision and PDF adapters
//! - Rule-based permit field extraction (IDs, TIN, permit number, dates, names, address)
//! - Human-readable extraction reports and their on-disk archive
//! - A client for the "save permit" endpoint and the scan pipeline tying it together

pub mod acquisition;
pub mod archive;
pub mod error;
pub mod extract;
pub mod models;
pub mod persistence;
pub mod pipeline;
pub mod report;

#[cfg(feature = "native")]
pub mod pdf;

pub use acquisition::{PermitImage, RecognizedText, TextRecognizer};
#[cfg(feature = "native")]
pub use acquisition::{CloudVisionRecognizer, PdfAwareRecognizer};
pub use archive::ReportArchive;
pub use error::{AcquisitionError, PdfError, PermitScanError, PersistenceError, Result};
pub use extract::{ExtractionResult, PermitExtractor, RuleBasedExtractor};
pub use models::config::PermitScanConfig;
pub use models::permit::{
    ExtractedPermitInfo, ExtractionWarning, FieldProvenance, MatchStrategy, PermitField,
};
pub use persistence::{PermitStore, SavePermitRequest, SaveResponse};
#[cfg(feature = "native")]
pub use persistence::HttpPermitStore;
pub use pipeline::{submit, PermitScanner, RecognitionOutcome, ScanOutcome, Submission};
pub use report::ExtractionReport;
