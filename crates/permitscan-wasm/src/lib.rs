//! WASM bindings for business permit field extraction.
//!
//! Text recognition happens in the host (browser or Node.js); this crate turns the
//! recognized text into permit fields and archival reports.

use chrono::{DateTime, Utc};
use wasm_bindgen::prelude::*;

use permitscan_core::acquisition::RecognizedText;
use permitscan_core::extract::rules::{is_calendar_date, DateExtractor, FieldExtractor};
use permitscan_core::models::config::{DenylistEntry, ExtractionConfig};
use permitscan_core::models::permit::PermitField;
use permitscan_core::{ExtractionReport, ExtractionResult, RuleBasedExtractor};

fn to_js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Extract permit fields from recognized text.
///
/// Returns an object with `ownerName`, `businessName`, `address`, `businessIdNo`,
/// `businessTin`, `businessPermitNo`, `dateIssued` and `validUntil`; missing fields are
/// left undefined.
#[wasm_bindgen]
pub fn extract_permit_info(text: &str) -> Result<JsValue, JsValue> {
    let result = RuleBasedExtractor::new().parse(text);
    serde_wasm_bindgen::to_value(&result.info).map_err(to_js_error)
}

/// Render the archival report for `text`.
///
/// `timestamp_ms` is the processing time in milliseconds since the Unix epoch, usually
/// `Date.now()`.
#[wasm_bindgen]
pub fn format_report(text: &str, timestamp_ms: f64) -> Result<String, JsValue> {
    report_text(text, timestamp_ms)
        .ok_or_else(|| JsValue::from_str("timestamp out of range"))
}

fn report_text(text: &str, timestamp_ms: f64) -> Option<String> {
    let at = timestamp(timestamp_ms)?;
    let result = RuleBasedExtractor::new().parse(text);
    Some(ExtractionReport::new(&result, at).to_string())
}

fn timestamp(ms: f64) -> Option<DateTime<Utc>> {
    if !ms.is_finite() {
        return None;
    }
    DateTime::from_timestamp_millis(ms as i64)
}

/// Permit extractor class for browser use.
#[wasm_bindgen]
pub struct PermitExtractor {
    config: ExtractionConfig,
    extractor: RuleBasedExtractor,
}

#[wasm_bindgen]
impl PermitExtractor {
    /// Create a new permit extractor.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        let config = ExtractionConfig::default();
        Self {
            extractor: RuleBasedExtractor::from_config(&config),
            config,
        }
    }

    /// Accept "March 20, 2025" style dates.
    #[wasm_bindgen]
    pub fn set_recognize_long_dates(&mut self, enabled: bool) {
        self.config.recognize_long_dates = enabled;
        self.rebuild();
    }

    /// Enable the layout-based name fallbacks.
    #[wasm_bindgen]
    pub fn set_use_heuristics(&mut self, enabled: bool) {
        self.config.use_heuristics = enabled;
        self.rebuild();
    }

    /// Discard `value` whenever it is matched for the field with key `field`.
    #[wasm_bindgen]
    pub fn add_denylist_entry(&mut self, field: &str, value: &str) -> Result<(), JsValue> {
        let field = PermitField::from_key(field)
            .ok_or_else(|| JsValue::from_str(&format!("unknown field: {}", field)))?;
        self.config.denylist.push(DenylistEntry::new(field, value));
        self.rebuild();
        Ok(())
    }

    /// Extract permit fields from text.
    #[wasm_bindgen]
    pub fn extract(&self, text: &str) -> Result<JsValue, JsValue> {
        let result = self.extractor.parse(text);
        serde_wasm_bindgen::to_value(&result.info).map_err(to_js_error)
    }

    /// Get the full extraction result: fields, provenance, confidence and warnings.
    #[wasm_bindgen]
    pub fn extract_with_metadata(&self, text: &str) -> Result<JsValue, JsValue> {
        let result = self.extractor.parse(text);
        serde_wasm_bindgen::to_value(&result).map_err(to_js_error)
    }

    /// Full extraction result as a JSON string.
    #[wasm_bindgen]
    pub fn extract_json(&self, text: &str) -> Result<String, JsValue> {
        self.result_json(text).map_err(to_js_error)
    }

    fn result_json(&self, text: &str) -> serde_json::Result<String> {
        serde_json::to_string(&self.parse(text))
    }

    fn parse(&self, text: &str) -> ExtractionResult {
        self.extractor.parse(text)
    }

    fn rebuild(&mut self) {
        self.extractor = RuleBasedExtractor::from_config(&self.config);
    }
}

impl Default for PermitExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Text recognized by the host, one fragment per detected block.
#[wasm_bindgen]
pub struct RecognizedTextJs {
    fragments: Vec<String>,
}

#[wasm_bindgen]
impl RecognizedTextJs {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            fragments: Vec::new(),
        }
    }

    /// Add a recognized fragment.
    #[wasm_bindgen]
    pub fn add_fragment(&mut self, text: &str) {
        self.fragments.push(text.to_string());
    }

    #[wasm_bindgen]
    pub fn fragment_count(&self) -> usize {
        self.fragments.len()
    }

    /// Get the full text.
    #[wasm_bindgen]
    pub fn get_text(&self) -> String {
        self.recognized().full_text()
    }

    /// Extract permit fields from this text.
    #[wasm_bindgen]
    pub fn extract(&self) -> Result<JsValue, JsValue> {
        extract_permit_info(&self.get_text())
    }

    fn recognized(&self) -> RecognizedText {
        RecognizedText::new(self.fragments.clone())
    }
}

impl Default for RecognizedTextJs {
    fn default() -> Self {
        Self::new()
    }
}

/// Helpers for working with permit fields.
#[wasm_bindgen]
pub struct PermitUtils;

#[wasm_bindgen]
impl PermitUtils {
    /// Field keys in report order.
    #[wasm_bindgen]
    pub fn field_keys() -> js_sys::Array {
        PermitField::ALL
            .iter()
            .map(|f| JsValue::from_str(f.key()))
            .collect()
    }

    /// Human-friendly label for a field key, e.g. "Business Id No".
    #[wasm_bindgen]
    pub fn field_label(key: &str) -> Option<String> {
        PermitField::from_key(key).map(|f| f.label())
    }

    /// First valid date in `text`, as `YYYY-MM-DD`.
    #[wasm_bindgen]
    pub fn parse_date(text: &str) -> Option<String> {
        DateExtractor::new()
            .with_long_form(true)
            .extract_all(text)
            .into_iter()
            .map(|m| m.value)
            .find(|value| is_calendar_date(value))
    }
}
