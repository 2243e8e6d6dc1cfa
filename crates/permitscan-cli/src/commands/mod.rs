//! CLI subcommands and the helpers they share.

pub mod batch;
pub mod config;
pub mod extract;
pub mod scan;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

use permitscan_core::{
    AcquisitionError, CloudVisionRecognizer, PdfAwareRecognizer, PermitScanConfig, ReportArchive,
    TextRecognizer,
};

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("permitscan")
        .join("config.json")
}

fn default_report_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("permitscan")
        .join("reports")
}

/// Load the config from `path`, else the user config file, else defaults.
pub fn load_config(path: Option<&str>) -> anyhow::Result<PermitScanConfig> {
    if let Some(path) = path {
        return Ok(PermitScanConfig::from_file(Path::new(path))?);
    }

    let default_path = default_config_path();
    if default_path.exists() {
        debug!("Loading config from {}", default_path.display());
        Ok(PermitScanConfig::from_file(&default_path)?)
    } else {
        Ok(PermitScanConfig::default())
    }
}

/// Report archive for `config`, or `None` when archiving is disabled.
pub fn report_archive(config: &PermitScanConfig) -> Option<ReportArchive> {
    config.archive.enabled.then(|| {
        ReportArchive::new(
            config
                .archive
                .directory
                .clone()
                .unwrap_or_else(default_report_dir),
        )
    })
}

/// PDF-aware recognizer, backed by Cloud Vision when an API key is available.
pub fn build_recognizer(config: &PermitScanConfig) -> anyhow::Result<Arc<dyn TextRecognizer>> {
    let recognizer = PdfAwareRecognizer::new(config.pdf.clone());

    match CloudVisionRecognizer::new(&config.acquisition) {
        Ok(vision) => Ok(Arc::new(recognizer.with_inner(Arc::new(vision)))),
        Err(AcquisitionError::MissingApiKey) => {
            warn!(
                "No API key (set {} or pass --api-key); only PDF text layers can be read",
                config.acquisition.api_key_env
            );
            Ok(Arc::new(recognizer))
        }
        Err(e) => Err(e.into()),
    }
}
