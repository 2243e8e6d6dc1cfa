//! Rule-based field extractors for business permits.

pub mod address;
pub mod cleanup;
pub mod dates;
pub mod identifiers;
pub mod labels;
pub mod names;
pub mod patterns;

pub use address::{address_rule, extract_address};
pub use cleanup::{clean_value, normalize_text, ArtifactDenylist};
pub use dates::{extract_date_range, is_calendar_date, DateExtractor, DateRange};
pub use identifiers::{
    business_id_rule, business_permit_rule, business_tin_rule, extract_business_id_no,
    extract_business_permit_no, extract_business_tin,
};
pub use labels::LabeledMatcher;
pub use names::{business_name_rule, extract_business_name, extract_owner_name, owner_name_rule};

use regex::Regex;

use crate::models::permit::{MatchStrategy, PermitField};

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// Extraction context with confidence scores.
#[derive(Debug, Clone)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Confidence score (0.0 - 1.0).
    pub confidence: f32,
    /// Position in source text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
    /// Strategy that located the value.
    pub strategy: MatchStrategy,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, strategy: MatchStrategy, source: impl Into<String>) -> Self {
        Self {
            value,
            confidence: strategy.confidence(),
            position: None,
            source: source.into(),
            strategy,
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }
}

/// A string matcher usable inside a [`FieldRule`].
pub type BoxedMatcher = Box<dyn FieldExtractor<Output = ExtractionMatch<String>> + Send + Sync>;

/// Regex matcher. Uses capture group 1 when the pattern has one, the whole match otherwise.
pub struct PatternMatcher {
    pattern: &'static Regex,
    strategy: MatchStrategy,
    reject: Option<fn(&str) -> bool>,
}

impl PatternMatcher {
    pub fn new(pattern: &'static Regex, strategy: MatchStrategy) -> Self {
        Self {
            pattern,
            strategy,
            reject: None,
        }
    }

    /// Drop candidates for which `reject` returns true.
    pub fn rejecting(mut self, reject: fn(&str) -> bool) -> Self {
        self.reject = Some(reject);
        self
    }
}

impl FieldExtractor for PatternMatcher {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results = Vec::new();

        for caps in self.pattern.captures_iter(text) {
            let Some(m) = caps.get(1).or_else(|| caps.get(0)) else {
                continue;
            };
            let Some(value) = clean_value(m.as_str()) else {
                continue;
            };
            if self.reject.is_some_and(|reject| reject(&value)) {
                continue;
            }

            results.push(
                ExtractionMatch::new(value, self.strategy, m.as_str())
                    .with_position(m.start(), m.end()),
            );
        }

        results
    }
}

/// Ordered matchers for one field: the primary matcher first, then fallbacks.
pub struct FieldRule {
    field: PermitField,
    matchers: Vec<BoxedMatcher>,
}

/// What a [`FieldRule`] produced for one text.
#[derive(Debug, Clone, Default)]
pub struct RuleOutcome {
    /// First candidate that passed the denylist.
    pub found: Option<ExtractionMatch<String>>,
    /// Denied candidate values, in the order they were seen.
    pub discarded: Vec<String>,
}

impl FieldRule {
    pub fn new(field: PermitField) -> Self {
        Self {
            field,
            matchers: Vec::new(),
        }
    }

    /// Append a matcher; it is tried after the ones already present.
    pub fn with<M>(mut self, matcher: M) -> Self
    where
        M: FieldExtractor<Output = ExtractionMatch<String>> + Send + Sync + 'static,
    {
        self.matchers.push(Box::new(matcher));
        self
    }

    pub fn field(&self) -> PermitField {
        self.field
    }

    /// Run the matchers in order and return the first candidate not on the denylist.
    pub fn apply(&self, text: &str, denylist: &ArtifactDenylist) -> RuleOutcome {
        let mut outcome = RuleOutcome::default();

        for matcher in &self.matchers {
            for candidate in matcher.extract_all(text) {
                if denylist.is_denied(self.field, &candidate.value) {
                    if !outcome.discarded.contains(&candidate.value) {
                        outcome.discarded.push(candidate.value);
                    }
                    continue;
                }
                outcome.found = Some(candidate);
                return outcome;
            }
        }

        outcome
    }
}
