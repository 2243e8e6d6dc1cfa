//! Human-readable extraction reports.
//!
//! A report is written once per extraction attempt so a reviewer can correct failed
//! extractions by hand. It always ends with the verbatim recognized text.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::extract::ExtractionResult;
use crate::models::permit::ExtractedPermitInfo;

/// Default report file name prefix.
pub const DEFAULT_FILE_PREFIX: &str = "ocr_results";

/// Archival report for one extraction attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionReport {
    pub file_name: String,
    pub processed_at: DateTime<Utc>,
    pub success: bool,
    pub confidence: f32,
    pub info: ExtractedPermitInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub raw_text: String,
}

impl ExtractionReport {
    pub fn new(result: &ExtractionResult, processed_at: DateTime<Utc>) -> Self {
        Self {
            file_name: report_file_name(DEFAULT_FILE_PREFIX, processed_at),
            processed_at,
            success: result.success,
            confidence: result.confidence,
            info: result.info.clone(),
            error: None,
            raw_text: result.raw_text.clone(),
        }
    }

    /// Record why acquisition failed.
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Use a different file name prefix.
    pub fn with_file_prefix(mut self, prefix: &str) -> Self {
        self.file_name = report_file_name(prefix, self.processed_at);
        self
    }
}

/// `<prefix>_2025-03-20T08-15-30-123Z.txt`
pub fn report_file_name(prefix: &str, at: DateTime<Utc>) -> String {
    format!("{}_{}.txt", prefix, at.format("%Y-%m-%dT%H-%M-%S-%3fZ"))
}

fn underline(f: &mut fmt::Formatter<'_>, title: &str, ch: char) -> fmt::Result {
    writeln!(f, "{}", title)?;
    writeln!(f, "{}", ch.to_string().repeat(title.chars().count()))
}

impl fmt::Display for ExtractionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        underline(f, "OCR RESULTS", '=')?;
        writeln!(f, "File: {}", self.file_name)?;
        writeln!(f, "Processed on: {}", self.processed_at.format("%Y-%m-%d %H:%M:%S UTC"))?;
        writeln!(f, "Success: {}", self.success)?;
        if self.success {
            writeln!(f, "Confidence: {:.2}", self.confidence)?;
        } else {
            writeln!(f, "Confidence: N/A")?;
        }
        writeln!(f)?;

        underline(f, "EXTRACTED BUSINESS INFORMATION:", '-')?;
        if self.info.is_empty() {
            writeln!(f, "(no fields extracted)")?;
        }
        for (field, value) in self.info.present() {
            writeln!(f, "{}: {}", field.label(), value)?;
        }
        writeln!(f)?;

        if let Some(error) = &self.error {
            underline(f, "ERROR:", '-')?;
            writeln!(f, "{}", error)?;
            writeln!(f)?;
        }

        underline(f, "RAW OCR TEXT:", '=')?;
        if self.raw_text.trim().is_empty() {
            writeln!(f, "No text detected")
        } else {
            writeln!(f, "{}", self.raw_text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::RuleBasedExtractor;
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 20, 8, 15, 30).unwrap()
            + chrono::Duration::milliseconds(123)
    }

    #[test]
    fn test_file_name() {
        assert_eq!(
            report_file_name("ocr_results", at()),
            "ocr_results_2025-03-20T08-15-30-123Z.txt"
        );
    }

    #[test]
    fn test_report_lists_only_found_fields() {
        let raw = "Business ID No.: S041008-00061\nOWNER'S NAME: JUAN DELA CRUZ";
        let result = RuleBasedExtractor::new().parse(raw);
        let report = ExtractionReport::new(&result, at()).to_string();

        assert!(report.starts_with(&format!("OCR RESULTS\n{}\n", "=".repeat(11))));
        assert!(report.contains("File: ocr_results_2025-03-20T08-15-30-123Z.txt\n"));
        assert!(report.contains("Success: true\n"));
        assert!(report.contains("Confidence: 0.85\n"));
        assert!(report.contains("Owner Name: JUAN DELA CRUZ\n"));
        assert!(report.contains("Business Id No: S041008-00061\n"));
        assert!(!report.contains("Business Tin"));
        assert!(!report.contains("ERROR:"));
        assert!(report.ends_with(&format!("RAW OCR TEXT:\n{}\n{}\n", "=".repeat(13), raw)));
    }

    #[test]
    fn test_failed_report() {
        let result = RuleBasedExtractor::new().parse("");
        let report = ExtractionReport::new(&result, at())
            .with_error("no text recognized")
            .with_file_prefix("scan")
            .to_string();

        assert!(report.contains("File: scan_2025-03-20T08-15-30-123Z.txt\n"));
        assert!(report.contains("Success: false\nConfidence: N/A\n"));
        assert!(report.contains("(no fields extracted)\n"));
        assert!(report.contains("ERROR:\n------\nno text recognized\n"));
        assert!(report.ends_with("No text detected\n"));

        let error_at = report.find("ERROR:").unwrap();
        let raw_at = report.find("RAW OCR TEXT:").unwrap();
        assert!(error_at < raw_at);
    }
}
