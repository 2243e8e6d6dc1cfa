//! Permit field extraction module.

mod parser;
pub mod rules;

pub use parser::{ExtractionResult, RuleBasedExtractor, RECOGNIZED_TEXT_CONFIDENCE};

use crate::acquisition::RecognizedText;

/// Trait for permit field extractors.
///
/// Extraction never fails: fields that cannot be found are left empty.
pub trait PermitExtractor: Send + Sync {
    /// Extract permit data from recognized text.
    fn extract(&self, text: &RecognizedText) -> ExtractionResult;

    /// Extract permit data from plain text.
    fn extract_from_text(&self, text: &str) -> ExtractionResult;
}
