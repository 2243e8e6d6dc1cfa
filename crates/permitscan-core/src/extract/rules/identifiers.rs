//! Business ID, TIN and permit number extraction.
//!
//! These identifiers have fixed shapes on the permit, so a bare shape match is enough.

use super::cleanup::ArtifactDenylist;
use super::patterns::{BUSINESS_ID_NO, BUSINESS_PERMIT_NO, BUSINESS_TIN};
use super::{FieldRule, PatternMatcher};
use crate::models::permit::{MatchStrategy, PermitField};

/// `S041008-00061`: one uppercase letter, six digits, dash, five digits.
pub fn business_id_rule() -> FieldRule {
    FieldRule::new(PermitField::BusinessIdNo)
        .with(PatternMatcher::new(&BUSINESS_ID_NO, MatchStrategy::Pattern))
}

/// `420-560-891-00000`
pub fn business_tin_rule() -> FieldRule {
    FieldRule::new(PermitField::BusinessTin)
        .with(PatternMatcher::new(&BUSINESS_TIN, MatchStrategy::Pattern))
}

/// `2025-0401008000-1206`
pub fn business_permit_rule() -> FieldRule {
    FieldRule::new(PermitField::BusinessPermitNo)
        .with(PatternMatcher::new(&BUSINESS_PERMIT_NO, MatchStrategy::Pattern))
}

pub fn extract_business_id_no(text: &str) -> Option<String> {
    first_value(business_id_rule(), text)
}

pub fn extract_business_tin(text: &str) -> Option<String> {
    first_value(business_tin_rule(), text)
}

pub fn extract_business_permit_no(text: &str) -> Option<String> {
    first_value(business_permit_rule(), text)
}

fn first_value(rule: FieldRule, text: &str) -> Option<String> {
    rule.apply(text, &ArtifactDenylist::default())
        .found
        .map(|m| m.value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_business_id_no() {
        assert_eq!(
            extract_business_id_no("Business ID No.: S041008-00061"),
            Some("S041008-00061".to_string())
        );
        // The letter prefix is case-sensitive.
        assert_eq!(extract_business_id_no("s041008-00061"), None);
        assert_eq!(extract_business_id_no("XS041008-00061"), None);
    }

    #[test]
    fn test_extract_business_tin() {
        assert_eq!(
            extract_business_tin("TIN:420-560-891-00000 "),
            Some("420-560-891-00000".to_string())
        );
        assert_eq!(extract_business_tin("420-560-891-0000"), None);
    }

    #[test]
    fn test_extract_business_permit_no() {
        assert_eq!(
            extract_business_permit_no("Business Permit No.: 2025-0401008000-1206"),
            Some("2025-0401008000-1206".to_string())
        );
        assert_eq!(extract_business_permit_no("2025-040100800-1206"), None);
    }

    #[test]
    fn test_first_occurrence_wins() {
        assert_eq!(
            extract_business_id_no("A000001-00001 B000002-00002"),
            Some("A000001-00001".to_string())
        );
    }
}
