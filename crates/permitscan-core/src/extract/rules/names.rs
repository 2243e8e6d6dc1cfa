//! Owner and business name extraction.

use super::cleanup::ArtifactDenylist;
use super::labels::LabeledMatcher;
use super::patterns::{
    BUSINESS_KEYWORD_PHRASE, BUSINESS_NAME_LABEL, OWNER_NAME_LABEL, TITLE_CASE_LINE,
    UPPERCASE_WORD, WORD_TOKEN,
};
use super::{ExtractionMatch, FieldExtractor, FieldRule, PatternMatcher};
use crate::models::permit::{MatchStrategy, PermitField};

/// Words that only appear in the permit's printed form, never in a business name.
const FORM_WORDS: &[&str] = &[
    "REPUBLIC", "PHILIPPINES", "PROVINCE", "MUNICIPALITY", "MUNICIPAL", "CITY", "OFFICE",
    "MAYOR", "MAYOR'S", "PERMIT", "LICENSING", "GOVERNMENT", "BUREAU", "DEPARTMENT",
    "TREASURER", "CERTIFICATE",
];

/// Captions that introduce the owner; the name follows them on the same line.
const OWNER_CAPTIONS: &[&str] = &[
    "OWNER", "OWNER'S", "NAME", "PROPRIETOR", "PROPRIETRESS", "OPERATOR", "TAXPAYER",
    "APPLICANT",
];

/// Captions of the other fields; a line containing one does not hold the owner.
const FIELD_CAPTIONS: &[&str] = &[
    "BUSINESS", "ADDRESS", "NOTES", "VALID", "UNTIL", "DATE", "ISSUED", "BARANGAY", "BRGY",
    "TIN", "NO",
];

/// Connectives that show up in headers ("REPUBLIC OF THE ...") but not in personal names.
const CONNECTIVES: &[&str] = &["OF", "THE", "AND"];

fn words_upper(value: &str) -> impl Iterator<Item = String> + '_ {
    value.split_whitespace().map(|w| {
        w.trim_matches(|c: char| !c.is_alphanumeric() && c != '\'')
            .to_uppercase()
    })
}

fn has_word_from(value: &str, list: &[&str]) -> bool {
    words_upper(value).any(|w| list.contains(&w.as_str()))
}

fn has_form_word(value: &str) -> bool {
    has_word_from(value, FORM_WORDS)
}

fn has_caption_word(value: &str) -> bool {
    has_word_from(value, OWNER_CAPTIONS) || has_word_from(value, FIELD_CAPTIONS)
}

fn reject_owner_run(value: &str) -> bool {
    has_form_word(value)
        || has_caption_word(value)
        || has_word_from(value, CONNECTIVES)
        || BUSINESS_KEYWORD_PHRASE.is_match(value)
}

/// Finds runs of three or four all-uppercase words anywhere on a line.
///
/// Form words, connectives and owner captions ("PROPRIETOR", "OWNER'S NAME") break a
/// run, as does trailing punctuation. Lines carrying another field's caption are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct UppercaseRunMatcher;

impl UppercaseRunMatcher {
    const MIN_WORDS: usize = 3;
    const MAX_WORDS: usize = 4;

    fn scan_line(line: &str, offset: usize, out: &mut Vec<ExtractionMatch<String>>) {
        if has_word_from(line, FIELD_CAPTIONS) {
            return;
        }

        let mut run: Vec<(usize, usize)> = Vec::new();
        for token in WORD_TOKEN.find_iter(line) {
            let word = token
                .as_str()
                .trim_end_matches(|c: char| matches!(c, ':' | ',' | ';'));
            let is_name_word = UPPERCASE_WORD.is_match(word)
                && !has_form_word(word)
                && !has_word_from(word, CONNECTIVES)
                && !has_word_from(word, OWNER_CAPTIONS);

            if is_name_word {
                run.push((token.start(), token.start() + word.len()));
            }
            if !is_name_word || word.len() < token.as_str().len() {
                Self::flush(line, offset, &mut run, out);
            }
        }
        Self::flush(line, offset, &mut run, out);
    }

    fn flush(
        line: &str,
        offset: usize,
        run: &mut Vec<(usize, usize)>,
        out: &mut Vec<ExtractionMatch<String>>,
    ) {
        if (Self::MIN_WORDS..=Self::MAX_WORDS).contains(&run.len()) {
            let (start, end) = (run[0].0, run[run.len() - 1].1);
            let source = &line[start..end];
            if !reject_owner_run(source) {
                let value = source.split_whitespace().collect::<Vec<_>>().join(" ");
                out.push(
                    ExtractionMatch::new(value, MatchStrategy::Heuristic, source)
                        .with_position(offset + start, offset + end),
                );
            }
        }
        run.clear();
    }
}

impl FieldExtractor for UppercaseRunMatcher {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results = Vec::new();
        let mut offset = 0;
        for line in text.split_inclusive('\n') {
            Self::scan_line(line, offset, &mut results);
            offset += line.len();
        }
        results
    }
}

fn reject_keyword_phrase(value: &str) -> bool {
    !value.starts_with(|c: char| c.is_uppercase())
        || value.split_whitespace().count() < 2
        || has_form_word(value)
}

fn reject_title_line(value: &str) -> bool {
    has_form_word(value) || has_caption_word(value)
}

/// Owner name: the "Owner's Name" caption, then (optionally) a run of uppercase words.
pub fn owner_name_rule(use_heuristics: bool) -> FieldRule {
    let rule = FieldRule::new(PermitField::OwnerName).with(LabeledMatcher::new(&OWNER_NAME_LABEL));

    if use_heuristics {
        rule.with(UppercaseRunMatcher)
    } else {
        rule
    }
}

/// Business name: the "Business Name"/"Trade Name" caption, then a phrase with a
/// business-type keyword, then (optionally) a title-case line.
pub fn business_name_rule(use_heuristics: bool) -> FieldRule {
    let rule = FieldRule::new(PermitField::BusinessName)
        .with(LabeledMatcher::new(&BUSINESS_NAME_LABEL))
        .with(
            PatternMatcher::new(&BUSINESS_KEYWORD_PHRASE, MatchStrategy::Keyword)
                .rejecting(reject_keyword_phrase),
        );

    if use_heuristics {
        rule.with(
            PatternMatcher::new(&TITLE_CASE_LINE, MatchStrategy::Heuristic)
                .rejecting(reject_title_line),
        )
    } else {
        rule
    }
}

pub fn extract_owner_name(text: &str) -> Option<String> {
    owner_name_rule(true)
        .apply(text, &ArtifactDenylist::default())
        .found
        .map(|m| m.value)
}

pub fn extract_business_name(text: &str) -> Option<String> {
    business_name_rule(true)
        .apply(text, &ArtifactDenylist::default())
        .found
        .map(|m| m.value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_name_labeled() {
        assert_eq!(
            extract_owner_name("OWNER'S NAME: SEVIRINO CAUNTAY SALAZAR\nBUSINESS NAME: X"),
            Some("SEVIRINO CAUNTAY SALAZAR".to_string())
        );
    }

    #[test]
    fn test_owner_name_uppercase_line_fallback() {
        let text = "REPUBLIC OF THE PHILIPPINES\nMUNICIPALITY OF CALATAGAN\nJUAN DELA CRUZ\n";
        let found = owner_name_rule(true)
            .apply(text, &ArtifactDenylist::default())
            .found
            .unwrap();

        assert_eq!(found.value, "JUAN DELA CRUZ");
        assert_eq!(found.strategy, MatchStrategy::Heuristic);
    }

    #[test]
    fn test_owner_line_rejects_business_names() {
        assert_eq!(extract_owner_name("SANTOS GENERAL STORE"), None);
        assert_eq!(extract_owner_name("BUSINESS PERMIT OFFICE"), None);
    }

    #[test]
    fn test_owner_run_after_mixed_case_caption() {
        let text = "Owner: SEVIRINO CAUNTAY SALAZAR\n";
        let found = owner_name_rule(true)
            .apply(text, &ArtifactDenylist::default())
            .found
            .unwrap();

        assert_eq!(found.value, "SEVIRINO CAUNTAY SALAZAR");
        assert_eq!(found.strategy, MatchStrategy::Heuristic);
        assert_eq!(found.position, Some((7, 31)));
    }

    #[test]
    fn test_owner_run_after_uppercase_caption() {
        assert_eq!(
            extract_owner_name("MUNICIPALITY OF LIAN\nPROPRIETOR SEVIRINO CAUNTAY SALAZAR\n"),
            Some("SEVIRINO CAUNTAY SALAZAR".to_string())
        );
        assert_eq!(
            extract_owner_name("PROPRIETOR: MARIA DELA CRUZ, LIAN"),
            Some("MARIA DELA CRUZ".to_string())
        );
    }

    #[test]
    fn test_owner_run_skips_other_field_lines() {
        assert_eq!(extract_owner_name("BUSINESS NAME: DELA CRUZ RICE MILL"), None);
        assert_eq!(extract_owner_name("Owner: JUAN CRUZ"), None);
        assert_eq!(extract_owner_name("ONE TWO THREE FOUR FIVE"), None);
    }

    #[test]
    fn test_owner_heuristic_can_be_disabled() {
        let outcome = owner_name_rule(false).apply("JUAN DELA CRUZ", &ArtifactDenylist::default());
        assert!(outcome.found.is_none());
    }

    #[test]
    fn test_business_name_labeled() {
        assert_eq!(
            extract_business_name("BUSINESS NAME: SIBUNG'S FLOATING COTTAGE RENTAL"),
            Some("SIBUNG'S FLOATING COTTAGE RENTAL".to_string())
        );
        assert_eq!(
            extract_business_name("Trade Name: Aling Nena's Eatery"),
            Some("Aling Nena's Eatery".to_string())
        );
    }

    #[test]
    fn test_business_name_keyword_fallback() {
        let found = business_name_rule(true)
            .apply("MUNICIPALITY OF CALATAGAN\nSibung's Floating Cottage Rental\n", &ArtifactDenylist::default())
            .found
            .unwrap();

        assert_eq!(found.value, "Sibung's Floating Cottage Rental");
        assert_eq!(found.strategy, MatchStrategy::Keyword);
    }

    #[test]
    fn test_business_name_title_case_fallback() {
        let found = business_name_rule(true)
            .apply("MUNICIPALITY OF CALATAGAN\nCasa de Lumbera\n", &ArtifactDenylist::default())
            .found
            .unwrap();

        assert_eq!(found.value, "Casa de Lumbera");
        assert_eq!(found.strategy, MatchStrategy::Heuristic);

        let outcome = business_name_rule(false)
            .apply("Casa de Lumbera\n", &ArtifactDenylist::default());
        assert!(outcome.found.is_none());
    }

    #[test]
    fn test_keyword_phrase_needs_capitalized_start() {
        assert_eq!(extract_business_name("rental"), None);
        assert_eq!(extract_business_name("the store is closed"), None);
    }
}
