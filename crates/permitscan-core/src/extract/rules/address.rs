//! Business address extraction.

use super::cleanup::ArtifactDenylist;
use super::labels::LabeledMatcher;
use super::patterns::{ADDRESS_LABEL, ADDRESS_QUALIFIER, BARANGAY_ADDRESS, BUSINESS_ADDRESS_LABEL};
use super::{FieldRule, PatternMatcher};
use crate::models::permit::{MatchStrategy, PermitField};

/// "Business Address", then bare "Address", then a `BARANGAY <n>, <LOCALITY>, ...` run.
///
/// A bare "Address" caption qualified as someone's e-mail or home address is ignored.
pub fn address_rule() -> FieldRule {
    FieldRule::new(PermitField::Address)
        .with(LabeledMatcher::new(&BUSINESS_ADDRESS_LABEL))
        .with(LabeledMatcher::new(&ADDRESS_LABEL).unless_qualified_by(&ADDRESS_QUALIFIER))
        .with(PatternMatcher::new(&BARANGAY_ADDRESS, MatchStrategy::Pattern))
}

/// Extract the address, discarding values on `denylist`.
pub fn extract_address(text: &str, denylist: &ArtifactDenylist) -> Option<String> {
    address_rule().apply(text, denylist).found.map(|m| m.value)
}
