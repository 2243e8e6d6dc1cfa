//! Business permit data models.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A field that can be extracted from a business permit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PermitField {
    OwnerName,
    BusinessName,
    Address,
    BusinessIdNo,
    BusinessTin,
    BusinessPermitNo,
    DateIssued,
    ValidUntil,
}

impl PermitField {
    /// All fields in canonical (report) order.
    pub const ALL: [PermitField; 8] = [
        PermitField::OwnerName,
        PermitField::BusinessName,
        PermitField::Address,
        PermitField::BusinessIdNo,
        PermitField::BusinessTin,
        PermitField::BusinessPermitNo,
        PermitField::DateIssued,
        PermitField::ValidUntil,
    ];

    /// The camelCase key used in JSON payloads.
    pub fn key(&self) -> &'static str {
        match self {
            PermitField::OwnerName => "ownerName",
            PermitField::BusinessName => "businessName",
            PermitField::Address => "address",
            PermitField::BusinessIdNo => "businessIdNo",
            PermitField::BusinessTin => "businessTin",
            PermitField::BusinessPermitNo => "businessPermitNo",
            PermitField::DateIssued => "dateIssued",
            PermitField::ValidUntil => "validUntil",
        }
    }

    /// Human-friendly label, e.g. `businessIdNo` -> "Business Id No".
    pub fn label(&self) -> String {
        humanize_key(self.key())
    }

    /// Look a field up by its camelCase key.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.key() == key)
    }
}

impl fmt::Display for PermitField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Split a camelCase key into capitalized words.
pub fn humanize_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for (i, c) in key.chars().enumerate() {
        if i == 0 {
            out.extend(c.to_uppercase());
        } else if c.is_uppercase() {
            out.push(' ');
            out.push(c);
        } else {
            out.push(c);
        }
    }
    out
}

/// Structured business-identity fields read from a permit.
///
/// Every field is either `None` or a non-empty, trimmed value with label text removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedPermitInfo {
    pub owner_name: Option<String>,
    pub business_name: Option<String>,
    pub address: Option<String>,
    pub business_id_no: Option<String>,
    pub business_tin: Option<String>,
    pub business_permit_no: Option<String>,
    pub date_issued: Option<String>,
    pub valid_until: Option<String>,
}

impl ExtractedPermitInfo {
    /// Get a field value by enum.
    pub fn get(&self, field: PermitField) -> Option<&str> {
        self.slot(field).as_deref()
    }

    pub(crate) fn set(&mut self, field: PermitField, value: Option<String>) {
        *self.slot_mut(field) = value;
    }

    /// Iterate populated fields in canonical order.
    pub fn present(&self) -> impl Iterator<Item = (PermitField, &str)> + '_ {
        PermitField::ALL
            .into_iter()
            .filter_map(move |f| self.get(f).map(|v| (f, v)))
    }

    /// Number of populated fields.
    pub fn populated_count(&self) -> usize {
        self.present().count()
    }

    /// True when no field was found.
    pub fn is_empty(&self) -> bool {
        self.populated_count() == 0
    }

    /// Fields that were not found.
    pub fn missing(&self) -> Vec<PermitField> {
        PermitField::ALL
            .into_iter()
            .filter(|f| self.get(*f).is_none())
            .collect()
    }

    fn slot(&self, field: PermitField) -> &Option<String> {
        match field {
            PermitField::OwnerName => &self.owner_name,
            PermitField::BusinessName => &self.business_name,
            PermitField::Address => &self.address,
            PermitField::BusinessIdNo => &self.business_id_no,
            PermitField::BusinessTin => &self.business_tin,
            PermitField::BusinessPermitNo => &self.business_permit_no,
            PermitField::DateIssued => &self.date_issued,
            PermitField::ValidUntil => &self.valid_until,
        }
    }

    fn slot_mut(&mut self, field: PermitField) -> &mut Option<String> {
        match field {
            PermitField::OwnerName => &mut self.owner_name,
            PermitField::BusinessName => &mut self.business_name,
            PermitField::Address => &mut self.address,
            PermitField::BusinessIdNo => &mut self.business_id_no,
            PermitField::BusinessTin => &mut self.business_tin,
            PermitField::BusinessPermitNo => &mut self.business_permit_no,
            PermitField::DateIssued => &mut self.date_issued,
            PermitField::ValidUntil => &mut self.valid_until,
        }
    }
}

/// How a field value was located.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    /// Fixed identifier shape (ID, TIN, permit number).
    Pattern,
    /// Value following a printed caption such as "Owner's Name:".
    Labeled,
    /// Earliest/latest of the dates found in the text.
    DateRange,
    /// Phrase containing a known business-type keyword.
    Keyword,
    /// Layout guess (uppercase-words line, title-case line).
    Heuristic,
}

impl MatchStrategy {
    /// Confidence assigned to values found with this strategy.
    pub fn confidence(&self) -> f32 {
        match self {
            MatchStrategy::Pattern => 0.95,
            MatchStrategy::Labeled => 0.9,
            MatchStrategy::DateRange => 0.9,
            MatchStrategy::Keyword => 0.6,
            MatchStrategy::Heuristic => 0.4,
        }
    }
}

/// Where a populated field came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldProvenance {
    pub field: PermitField,
    pub strategy: MatchStrategy,
    pub confidence: f32,
    /// Byte span in the normalized text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<(usize, usize)>,
}

/// Non-fatal observations made during extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExtractionWarning {
    /// No rule produced a value for the field.
    FieldNotFound { field: PermitField },
    /// Fewer than two dates were found, so neither endpoint was assigned.
    InsufficientDates { found: usize },
    /// A date-shaped token is not a real calendar day. It still takes part in the range.
    InvalidDate { value: String },
    /// A candidate matched a known garbage value and was dropped.
    ArtifactDiscarded { field: PermitField, value: String },
}

impl fmt::Display for ExtractionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionWarning::FieldNotFound { field } => {
                write!(f, "Could not extract {}", field.label().to_lowercase())
            }
            ExtractionWarning::InsufficientDates { found } => {
                write!(f, "Found {} date(s), need at least 2 to assign issue/expiry", found)
            }
            ExtractionWarning::InvalidDate { value } => {
                write!(f, "Date {:?} is not a valid calendar date", value)
            }
            ExtractionWarning::ArtifactDiscarded { field, value } => {
                write!(f, "Discarded {} value {:?} (known artifact)", field.key(), value)
            }
        }
    }
}
