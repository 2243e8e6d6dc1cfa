//! Configuration structures for the permit scanning pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::permit::PermitField;

/// Main configuration for the permitscan pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PermitScanConfig {
    /// Text acquisition configuration.
    pub acquisition: AcquisitionConfig,

    /// PDF processing configuration.
    pub pdf: PdfConfig,

    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// Report archive configuration.
    pub archive: ArchiveConfig,

    /// Save-permit endpoint configuration.
    pub persistence: PersistenceConfig,
}

/// Cloud text recognition configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AcquisitionConfig {
    /// Vision `images:annotate` endpoint.
    pub endpoint: String,

    /// API key. Takes precedence over `api_key_env`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Environment variable holding the API key.
    pub api_key_env: String,

    /// Feature type requested from the service.
    pub feature_type: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://vision.googleapis.com/v1/images:annotate".to_string(),
            api_key: None,
            api_key_env: "GOOGLE_CLOUD_API_KEY".to_string(),
            feature_type: "TEXT_DETECTION".to_string(),
            timeout_secs: 30,
        }
    }
}

impl AcquisitionConfig {
    /// Resolve the API key from the config or the environment.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(&self.api_key_env).ok())
            .filter(|k| !k.trim().is_empty())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// PDF processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Use embedded text instead of recognizing page images when available.
    pub prefer_embedded_text: bool,

    /// Minimum embedded text length to treat a PDF as text-based.
    pub min_text_length: usize,

    /// Maximum pages to scan for images (0 = unlimited).
    pub max_pages: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            prefer_embedded_text: true,
            min_text_length: 50,
            max_pages: 10,
        }
    }
}

/// A recognized value that is known to be garbage for a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DenylistEntry {
    pub field: PermitField,
    pub value: String,
}

impl DenylistEntry {
    pub fn new(field: PermitField, value: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
        }
    }
}

/// Field extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Values discarded after matching (compared case-insensitively).
    pub denylist: Vec<DenylistEntry>,

    /// Also accept "March 20, 2025" style dates.
    pub recognize_long_dates: bool,

    /// Enable the uppercase-words / title-case fallbacks.
    pub use_heuristics: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            // Mis-segmented permits put the "NOTES" caption where the address belongs.
            denylist: vec![DenylistEntry::new(PermitField::Address, "NOTES")],
            recognize_long_dates: true,
            use_heuristics: true,
        }
    }
}

/// Report archive configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    /// Write a report for each extraction attempt.
    pub enabled: bool,

    /// Target directory. The CLI falls back to a per-user data directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,

    /// Report file name prefix.
    pub file_prefix: String,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            directory: None,
            file_prefix: "ocr_results".to_string(),
        }
    }
}

/// Save-permit endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceConfig {
    /// Backend base URL, e.g. `http://192.168.1.10/NasugView`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Endpoint path relative to the base URL.
    pub endpoint: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            endpoint: "save_permit.php".to_string(),
            timeout_secs: 30,
        }
    }
}

impl PersistenceConfig {
    /// Full endpoint URL, if a base URL is configured.
    pub fn url(&self) -> Option<String> {
        self.base_url.as_ref().map(|base| {
            format!(
                "{}/{}",
                base.trim_end_matches('/'),
                self.endpoint.trim_start_matches('/')
            )
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl PermitScanConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}
