//! Label-anchored value capture ("Owner's Name: JUAN DELA CRUZ").

use regex::Regex;

use super::cleanup::{clean_value, leading_separator_len};
use super::patterns::FIELD_LABEL;
use super::{ExtractionMatch, FieldExtractor};
use crate::models::permit::MatchStrategy;

/// Captures the text printed after a caption.
///
/// Separators and repeated copies of the caption are skipped, newlines included, so a
/// value on the line below its caption is still found. The value runs to the end of its
/// line or to the next field caption, whichever comes first.
pub struct LabeledMatcher {
    label: &'static Regex,
    qualifier: Option<&'static Regex>,
}

impl LabeledMatcher {
    pub fn new(label: &'static Regex) -> Self {
        Self {
            label,
            qualifier: None,
        }
    }

    /// Ignore captions whose line text before the caption matches `qualifier`
    /// ("E-mail" in "E-mail Address").
    pub fn unless_qualified_by(mut self, qualifier: &'static Regex) -> Self {
        self.qualifier = Some(qualifier);
        self
    }

    fn is_qualified(&self, text: &str, label_start: usize) -> bool {
        let Some(qualifier) = self.qualifier else {
            return false;
        };
        let line_start = text[..label_start].rfind('\n').map_or(0, |i| i + 1);
        qualifier.is_match(&text[line_start..label_start])
    }

    fn skip_label_run(&self, text: &str, mut pos: usize) -> usize {
        loop {
            pos += leading_separator_len(&text[pos..]);
            match self.label.find_at(text, pos) {
                Some(m) if m.start() == pos && m.end() > pos => pos = m.end(),
                _ => return pos,
            }
        }
    }
}

impl FieldExtractor for LabeledMatcher {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results = Vec::new();

        for label in self.label.find_iter(text) {
            if self.is_qualified(text, label.start()) {
                continue;
            }
            let start = self.skip_label_run(text, label.end());
            let line_end = text[start..].find('\n').map_or(text.len(), |i| start + i);
            let end = FIELD_LABEL
                .find(&text[start..line_end])
                .map_or(line_end, |next| start + next.start());

            if let Some(value) = clean_value(&text[start..end]) {
                results.push(
                    ExtractionMatch::new(value, MatchStrategy::Labeled, &text[label.start()..end])
                        .with_position(start, end),
                );
            }
        }

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::rules::patterns::{BUSINESS_NAME_LABEL, OWNER_NAME_LABEL};

    fn owner(text: &str) -> Option<String> {
        LabeledMatcher::new(&OWNER_NAME_LABEL)
            .extract(text)
            .map(|m| m.value)
    }

    #[test]
    fn test_strips_label_and_separators() {
        assert_eq!(
            owner("OWNER'S NAME: SEVIRINO CAUNTAY SALAZAR"),
            Some("SEVIRINO CAUNTAY SALAZAR".to_string())
        );
        assert_eq!(
            owner("Owners Name - Juan  Dela Cruz  "),
            Some("Juan Dela Cruz".to_string())
        );
    }

    #[test]
    fn test_value_on_next_line() {
        assert_eq!(
            owner("OWNER'S NAME:\nJUAN DELA CRUZ\nBUSINESS NAME: X"),
            Some("JUAN DELA CRUZ".to_string())
        );
    }

    #[test]
    fn test_repeated_label_is_skipped() {
        assert_eq!(
            owner("OWNER'S NAME OWNER'S NAME: MARIA SANTOS"),
            Some("MARIA SANTOS".to_string())
        );
    }

    #[test]
    fn test_stops_at_next_label() {
        assert_eq!(
            owner("OWNER'S NAME: MARIA SANTOS BUSINESS NAME: SANTOS STORE"),
            Some("MARIA SANTOS".to_string())
        );
    }

    #[test]
    fn test_empty_value_is_none() {
        assert_eq!(owner("OWNER'S NAME:\nBUSINESS NAME: SANTOS STORE"), None);
        assert_eq!(owner("OWNER'S NAME: :--"), None);
    }

    #[test]
    fn test_tries_every_occurrence() {
        let matcher = LabeledMatcher::new(&BUSINESS_NAME_LABEL);
        let all = matcher.extract_all("BUSINESS NAME:\nDATE ISSUED\nTRADE NAME: ACME HARDWARE");
        let values: Vec<_> = all.into_iter().map(|m| m.value).collect();
        assert_eq!(values, vec!["ACME HARDWARE".to_string()]);
    }
}
