//! Rule table driver producing an [`ExtractedPermitInfo`] from recognized text.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::acquisition::RecognizedText;
use crate::models::config::ExtractionConfig;
use crate::models::permit::{ExtractedPermitInfo, ExtractionWarning, FieldProvenance, PermitField};

use super::rules::{
    address_rule, business_id_rule, business_name_rule, business_permit_rule, business_tin_rule,
    dates::extract_date_range,
    normalize_text, owner_name_rule, ArtifactDenylist, ExtractionMatch, FieldRule,
};
use super::PermitExtractor;

/// Confidence reported for any non-blank input.
pub const RECOGNIZED_TEXT_CONFIDENCE: f32 = 0.85;

/// Result of permit field extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Extracted fields.
    pub info: ExtractedPermitInfo,
    /// How each populated field was found, in canonical field order.
    pub provenance: Vec<FieldProvenance>,
    /// Input text, verbatim.
    pub raw_text: String,
    /// True when the input contained any non-whitespace text.
    pub success: bool,
    /// Overall confidence (0.0 - 1.0).
    pub confidence: f32,
    /// Extraction warnings.
    pub warnings: Vec<ExtractionWarning>,
}

impl ExtractionResult {
    /// Provenance of a single field.
    pub fn provenance_of(&self, field: PermitField) -> Option<&FieldProvenance> {
        self.provenance.iter().find(|p| p.field == field)
    }
}

/// Rule-based permit extractor.
///
/// Rules run in table order; when two rules target the same field, the earlier one wins
/// and later ones act as fallbacks.
pub struct RuleBasedExtractor {
    rules: Vec<FieldRule>,
    long_dates: bool,
    denylist: ArtifactDenylist,
}

impl RuleBasedExtractor {
    /// Create an extractor with the default rule table.
    pub fn new() -> Self {
        Self::from_config(&ExtractionConfig::default())
    }

    /// Create an extractor from configuration.
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self {
            rules: vec![
                business_id_rule(),
                business_tin_rule(),
                business_permit_rule(),
                owner_name_rule(config.use_heuristics),
                business_name_rule(config.use_heuristics),
                address_rule(),
            ],
            long_dates: config.recognize_long_dates,
            denylist: ArtifactDenylist::new(config.denylist.clone()),
        }
    }

    /// Append a rule. It only runs if its field is still empty.
    pub fn with_rule(mut self, rule: FieldRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Discard `value` whenever it is matched for `field`.
    pub fn with_denylist_entry(mut self, field: PermitField, value: impl Into<String>) -> Self {
        self.denylist = self.denylist.with_entry(field, value);
        self
    }

    /// Set whether long-form dates are recognized.
    pub fn with_long_dates(mut self, enabled: bool) -> Self {
        self.long_dates = enabled;
        self
    }

    /// Parse permit fields from text. Never fails; missing fields are reported as warnings.
    pub fn parse(&self, text: &str) -> ExtractionResult {
        info!("Parsing permit from {} characters of text", text.len());

        let normalized = normalize_text(text);
        let mut info = ExtractedPermitInfo::default();
        let mut provenance = Vec::new();
        let mut warnings = Vec::new();

        for rule in &self.rules {
            let field = rule.field();
            if info.get(field).is_some() {
                continue;
            }

            let outcome = rule.apply(&normalized, &self.denylist);

            for value in outcome.discarded {
                debug!("Discarded {} candidate {:?}", field, value);
                push_unique(&mut warnings, ExtractionWarning::ArtifactDiscarded { field, value });
            }

            if let Some(found) = outcome.found {
                debug!("{} = {:?} ({:?})", field, found.value, found.strategy);
                provenance.push(provenance_for(field, &found));
                info.set(field, Some(found.value));
            }
        }

        let dates = extract_date_range(&normalized, self.long_dates);
        for value in &dates.invalid {
            debug!("Date token {:?} is not a calendar date", value);
            warnings.push(ExtractionWarning::InvalidDate { value: value.clone() });
        }
        match (dates.date_issued, dates.valid_until) {
            (Some(issued), Some(until)) => {
                for (field, m) in [(PermitField::DateIssued, issued), (PermitField::ValidUntil, until)] {
                    provenance.push(provenance_for(field, &m));
                    info.set(field, Some(m.value));
                }
            }
            _ => {
                debug!("Found {} date(s), leaving issue/expiry empty", dates.found);
                warnings.push(ExtractionWarning::InsufficientDates { found: dates.found });
            }
        }

        for field in info.missing() {
            warnings.push(ExtractionWarning::FieldNotFound { field });
        }

        provenance.sort_by_key(|p| p.field);

        let success = !text.trim().is_empty();
        let confidence = if success { RECOGNIZED_TEXT_CONFIDENCE } else { 0.0 };

        debug!(
            "Extracted {} of {} fields with confidence {:.2}",
            info.populated_count(),
            PermitField::ALL.len(),
            confidence
        );

        ExtractionResult {
            info,
            provenance,
            raw_text: text.to_string(),
            success,
            confidence,
            warnings,
        }
    }
}

impl Default for RuleBasedExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PermitExtractor for RuleBasedExtractor {
    fn extract(&self, text: &RecognizedText) -> ExtractionResult {
        self.parse(&text.full_text())
    }

    fn extract_from_text(&self, text: &str) -> ExtractionResult {
        self.parse(text)
    }
}

fn provenance_for<T>(field: PermitField, m: &ExtractionMatch<T>) -> FieldProvenance {
    FieldProvenance {
        field,
        strategy: m.strategy,
        confidence: m.confidence,
        position: m.position,
    }
}

fn push_unique(warnings: &mut Vec<ExtractionWarning>, warning: ExtractionWarning) {
    if !warnings.contains(&warning) {
        warnings.push(warning);
    }
}
