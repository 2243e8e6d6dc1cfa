//! Scan pipeline: recognize, extract, report, archive, and optionally save.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use crate::acquisition::{PermitImage, RecognizedText, TextRecognizer};
use crate::archive::ReportArchive;
use crate::error::AcquisitionError;
use crate::extract::{ExtractionResult, PermitExtractor, RuleBasedExtractor};
use crate::persistence::{PermitStore, SavePermitRequest, SaveResponse};
use crate::report::{ExtractionReport, DEFAULT_FILE_PREFIX};

/// Outcome of the recognition step.
#[derive(Debug, Clone, Serialize)]
pub struct RecognitionOutcome {
    pub success: bool,
    /// Recognized text; empty when recognition failed.
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Everything produced by one scan.
#[derive(Debug, Clone, Serialize)]
pub struct ScanOutcome {
    pub recognition: RecognitionOutcome,
    pub extraction: ExtractionResult,
    pub report: ExtractionReport,
    /// Where the report was archived, if it was.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_path: Option<PathBuf>,
}

/// Runs a permit image through recognition and extraction.
pub struct PermitScanner {
    recognizer: Arc<dyn TextRecognizer>,
    extractor: Box<dyn PermitExtractor>,
    archive: Option<ReportArchive>,
    file_prefix: String,
}

impl PermitScanner {
    pub fn new(recognizer: Arc<dyn TextRecognizer>) -> Self {
        Self {
            recognizer,
            extractor: Box::new(RuleBasedExtractor::new()),
            archive: None,
            file_prefix: DEFAULT_FILE_PREFIX.to_string(),
        }
    }

    pub fn with_extractor(mut self, extractor: impl PermitExtractor + 'static) -> Self {
        self.extractor = Box::new(extractor);
        self
    }

    /// Archive a report for every scan.
    pub fn with_archive(mut self, archive: ReportArchive) -> Self {
        self.archive = Some(archive);
        self
    }

    pub fn with_file_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.file_prefix = prefix.into();
        self
    }

    /// Scan one permit. Never fails: recognition errors end up in the outcome and the
    /// extractor runs on empty text.
    pub async fn scan(&self, image: &PermitImage) -> ScanOutcome {
        let recognition = match self.recognizer.recognize(image).await {
            Ok(text) if !text.is_blank() => Ok(text),
            Ok(_) => Err(AcquisitionError::NoText),
            Err(e) => Err(e),
        };

        let (recognized, recognition) = match recognition {
            Ok(text) => {
                let full = text.full_text();
                info!("Recognized {} fragments ({} chars)", text.fragments().len(), full.len());
                (
                    text,
                    RecognitionOutcome {
                        success: true,
                        text: full,
                        error: None,
                    },
                )
            }
            Err(e) => {
                warn!("Text recognition failed: {}", e);
                (
                    RecognizedText::default(),
                    RecognitionOutcome {
                        success: false,
                        text: String::new(),
                        error: Some(e.to_string()),
                    },
                )
            }
        };

        let extraction = self.extractor.extract(&recognized);

        let mut report =
            ExtractionReport::new(&extraction, Utc::now()).with_file_prefix(&self.file_prefix);
        if let Some(error) = &recognition.error {
            report = report.with_error(error.clone());
        }

        let report_path = self.archive.as_ref().and_then(|archive| match archive.write(&report) {
            Ok(path) => Some(path),
            Err(e) => {
                warn!("Could not archive report in {}: {}", archive.directory().display(), e);
                None
            }
        });

        ScanOutcome {
            recognition,
            extraction,
            report,
            report_path,
        }
    }
}

/// What to send along with the extracted fields.
#[derive(Debug, Clone)]
pub struct Submission<'a> {
    pub signup_id: u64,
    pub image: Option<&'a PermitImage>,
    pub business_line: Option<String>,
}

/// Save a scan best-effort. Failures become an unsuccessful [`SaveResponse`].
pub async fn submit(
    store: &dyn PermitStore,
    outcome: &ScanOutcome,
    submission: Submission<'_>,
) -> SaveResponse {
    if !outcome.recognition.success {
        return SaveResponse::failure("Nothing was recognized; permit not saved");
    }

    let mut request = SavePermitRequest::new(submission.signup_id, &outcome.extraction.info)
        .with_raw_text(outcome.recognition.text.clone());
    if let Some(image) = submission.image {
        request = request.with_image(image);
    }
    if let Some(line) = submission.business_line {
        request = request.with_business_line(line);
    }

    match store.save(&request).await {
        Ok(response) => {
            if response.success {
                info!("Saved permit for signup {}: {}", submission.signup_id, response.message);
            } else {
                warn!("Server rejected permit for signup {}: {}", submission.signup_id, response.message);
            }
            response
        }
        Err(e) => {
            warn!("Saving permit failed: {}", e);
            SaveResponse::failure(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquisition::testing::StaticRecognizer;
    use crate::error::PersistenceError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    const PERMIT: &str = "Business ID No.: S041008-00061\nOWNER'S NAME: JUAN DELA CRUZ";

    fn image() -> PermitImage {
        PermitImage::from_bytes(b"jpeg".to_vec(), Some("jpg"))
    }

    #[derive(Default)]
    struct RecordingStore {
        requests: Mutex<Vec<SavePermitRequest>>,
        fail: bool,
    }

    #[async_trait]
    impl PermitStore for RecordingStore {
        async fn save(&self, request: &SavePermitRequest) -> Result<SaveResponse, PersistenceError> {
            self.requests.lock().unwrap().push(request.clone());
            if self.fail {
                Err(PersistenceError::InvalidResponse("boom".to_string()))
            } else {
                Ok(SaveResponse {
                    success: true,
                    message: "Permit data saved".to_string(),
                    ..Default::default()
                })
            }
        }
    }

    #[tokio::test]
    async fn test_scan_extracts_and_archives() {
        let dir = tempfile::tempdir().unwrap();
        let scanner = PermitScanner::new(Arc::new(StaticRecognizer::new(PERMIT)))
            .with_archive(ReportArchive::new(dir.path()));

        let outcome = scanner.scan(&image()).await;

        assert!(outcome.recognition.success);
        assert_eq!(outcome.extraction.info.business_id_no.as_deref(), Some("S041008-00061"));
        let path = outcome.report_path.unwrap();
        assert!(std::fs::read_to_string(path).unwrap().ends_with(&format!("{}\n", PERMIT)));
    }

    #[tokio::test]
    async fn test_rapid_scans_keep_every_report() {
        let dir = tempfile::tempdir().unwrap();
        let scanner = PermitScanner::new(Arc::new(StaticRecognizer::new(PERMIT)))
            .with_archive(ReportArchive::new(dir.path()));

        let mut paths = Vec::new();
        for _ in 0..20 {
            paths.push(scanner.scan(&image()).await.report_path.unwrap());
        }
        paths.sort();
        paths.dedup();

        assert_eq!(paths.len(), 20);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 20);
    }

    #[tokio::test]
    async fn test_failed_recognition_still_reports() {
        let scanner = PermitScanner::new(Arc::new(StaticRecognizer::failing()));
        let outcome = scanner.scan(&image()).await;

        assert!(!outcome.recognition.success);
        assert!(outcome.recognition.error.is_some());
        assert!(!outcome.extraction.success);
        assert!(outcome.extraction.info.is_empty());
        assert!(outcome.report.to_string().contains("ERROR:"));
        assert!(outcome.report_path.is_none());
    }

    #[tokio::test]
    async fn test_blank_recognition_is_no_text() {
        let scanner = PermitScanner::new(Arc::new(StaticRecognizer::new("  \n ")));
        let outcome = scanner.scan(&image()).await;

        assert!(!outcome.recognition.success);
        assert_eq!(outcome.recognition.error.as_deref(), Some("no text recognized"));
    }

    #[tokio::test]
    async fn test_submit_sends_fields_and_image() {
        let scanner = PermitScanner::new(Arc::new(StaticRecognizer::new(PERMIT)));
        let outcome = scanner.scan(&image()).await;
        let store = RecordingStore::default();
        let img = image();

        let response = submit(
            &store,
            &outcome,
            Submission {
                signup_id: 7,
                image: Some(&img),
                business_line: Some("Retail".to_string()),
            },
        )
        .await;

        assert!(response.success);
        let requests = store.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].signup_id, 7);
        assert_eq!(requests[0].owner_name.as_deref(), Some("JUAN DELA CRUZ"));
        assert_eq!(requests[0].ocr_text.as_deref(), Some(PERMIT));
        assert_eq!(requests[0].permit_image_ext.as_deref(), Some("jpg"));
    }

    #[tokio::test]
    async fn test_submit_is_best_effort() {
        let scanner = PermitScanner::new(Arc::new(StaticRecognizer::new(PERMIT)));
        let outcome = scanner.scan(&image()).await;
        let store = RecordingStore {
            fail: true,
            ..Default::default()
        };

        let submission = Submission {
            signup_id: 7,
            image: None,
            business_line: None,
        };
        let response = submit(&store, &outcome, submission).await;
        assert!(!response.success);
        assert!(response.message.contains("boom"));
    }

    #[tokio::test]
    async fn test_submit_skipped_without_text() {
        let scanner = PermitScanner::new(Arc::new(StaticRecognizer::failing()));
        let outcome = scanner.scan(&image()).await;
        let store = RecordingStore::default();

        let submission = Submission {
            signup_id: 7,
            image: None,
            business_line: None,
        };
        let response = submit(&store, &outcome, submission).await;
        assert!(!response.success);
        assert!(store.requests.lock().unwrap().is_empty());
    }
}
