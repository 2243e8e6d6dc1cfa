//! Text normalization, value cleanup and the artifact denylist.

use crate::models::config::DenylistEntry;
use crate::models::permit::PermitField;

/// Normalize recognizer output before matching.
///
/// Line endings become `\n`, dash and apostrophe look-alikes become ASCII, and
/// non-breaking spaces become plain spaces.
pub fn normalize_text(text: &str) -> String {
    text.replace("\r\n", "\n")
        .chars()
        .map(|c| match c {
            '\r' => '\n',
            '\u{2010}'..='\u{2015}' | '\u{2212}' => '-',
            '\u{2018}' | '\u{2019}' | '\u{02BC}' | '`' => '\'',
            '\u{00A0}' => ' ',
            other => other,
        })
        .collect()
}

/// Trim a matched value: outer whitespace, colons and dashes go, inner whitespace collapses.
///
/// Returns `None` if nothing is left.
pub fn clean_value(raw: &str) -> Option<String> {
    let trimmed = raw.trim_matches(|c: char| c.is_whitespace() || c == ':' || c == '-');
    let collapsed = trimmed.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed)
    }
}

/// Length of the separator run (whitespace, `:`, `-`, `.`, `#`) at the start of `s`.
pub fn leading_separator_len(s: &str) -> usize {
    s.len()
        - s.trim_start_matches(|c: char| c.is_whitespace() || matches!(c, ':' | '-' | '.' | '#'))
            .len()
}

/// Values that are known recognizer artifacts for a given field.
#[derive(Debug, Clone, Default)]
pub struct ArtifactDenylist {
    entries: Vec<DenylistEntry>,
}

impl ArtifactDenylist {
    pub fn new(entries: Vec<DenylistEntry>) -> Self {
        Self { entries }
    }

    /// Add another artifact.
    pub fn with_entry(mut self, field: PermitField, value: impl Into<String>) -> Self {
        self.entries.push(DenylistEntry::new(field, value));
        self
    }

    /// Case-insensitive match against the denylist.
    pub fn is_denied(&self, field: PermitField, value: &str) -> bool {
        let value = value.trim();
        self.entries
            .iter()
            .any(|e| e.field == field && e.value.trim().eq_ignore_ascii_case(value))
    }

    pub fn entries(&self) -> &[DenylistEntry] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_text() {
        assert_eq!(
            normalize_text("OWNER\u{2019}S NAME\r\n420\u{2013}560"),
            "OWNER'S NAME\n420-560"
        );
    }

    #[test]
    fn test_clean_value() {
        assert_eq!(clean_value(" : - Juan   Dela Cruz -"), Some("Juan Dela Cruz".to_string()));
        assert_eq!(clean_value(" :: -- "), None);
        assert_eq!(clean_value(""), None);
    }

    #[test]
    fn test_leading_separator_len() {
        assert_eq!(leading_separator_len(".: S041008"), 3);
        assert_eq!(leading_separator_len("S041008"), 0);
        assert_eq!(leading_separator_len(":\n\n JUAN"), 4);
    }

    #[test]
    fn test_denylist_is_case_insensitive_and_field_scoped() {
        let denylist = ArtifactDenylist::default().with_entry(PermitField::Address, "NOTES");

        assert!(denylist.is_denied(PermitField::Address, "Notes"));
        assert!(denylist.is_denied(PermitField::Address, " NOTES "));
        assert!(!denylist.is_denied(PermitField::BusinessName, "NOTES"));
        assert!(!denylist.is_denied(PermitField::Address, "NOTES ST."));
    }
}
