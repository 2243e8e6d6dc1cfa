//! Issue and expiry date extraction.
//!
//! Permits print both dates without reliable captions, so the earliest date token in the
//! text is taken as the issue date and the latest as the expiry. Every `YYYY-MM-DD`
//! shaped token counts, repeated and calendar-invalid ones included; ISO text sorts in
//! date order, so tokens are compared as strings.

use chrono::NaiveDate;

use super::patterns::{DATE_ISO, DATE_LONG};
use super::{ExtractionMatch, FieldExtractor};
use crate::models::permit::MatchStrategy;

/// Output format for both date fields.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Date token extractor. Values are `YYYY-MM-DD` text in order of appearance.
pub struct DateExtractor {
    long_form: bool,
}

impl DateExtractor {
    pub fn new() -> Self {
        Self { long_form: true }
    }

    /// Set whether "Mar 20, 2025" style dates are accepted.
    pub fn with_long_form(mut self, long_form: bool) -> Self {
        self.long_form = long_form;
        self
    }
}

impl Default for DateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for DateExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results: Vec<Self::Output> = Vec::new();

        // YYYY-MM-DD
        for caps in DATE_ISO.captures_iter(text) {
            let Some(full_match) = caps.get(0) else { continue };
            results.push(
                ExtractionMatch::new(
                    full_match.as_str().to_string(),
                    MatchStrategy::DateRange,
                    full_match.as_str(),
                )
                .with_position(full_match.start(), full_match.end()),
            );
        }

        if self.long_form {
            // "March 20, 2025", "Mar. 20 2025"
            for caps in DATE_LONG.captures_iter(text) {
                let Some(full_match) = caps.get(0) else { continue };
                let month = month_number(&caps[1]);
                let day: u32 = caps[2].parse().unwrap_or(0);
                let year: u32 = caps[3].parse().unwrap_or(0);

                results.push(
                    ExtractionMatch::new(
                        format!("{:04}-{:02}-{:02}", year, month, day),
                        MatchStrategy::DateRange,
                        full_match.as_str(),
                    )
                    .with_position(full_match.start(), full_match.end()),
                );
            }
        }

        results.sort_by_key(|m| m.position);
        results
    }
}

/// True when `iso` names a real calendar day.
pub fn is_calendar_date(iso: &str) -> bool {
    NaiveDate::parse_from_str(iso, DATE_FORMAT).is_ok()
}

/// Issue/expiry pair derived from the dates in a text.
#[derive(Debug, Clone, Default)]
pub struct DateRange {
    /// Earliest date.
    pub date_issued: Option<ExtractionMatch<String>>,
    /// Latest date.
    pub valid_until: Option<ExtractionMatch<String>>,
    /// Number of date tokens found.
    pub found: usize,
    /// Tokens that are date-shaped but not real calendar days.
    pub invalid: Vec<String>,
}

impl DateRange {
    /// Both endpoints are set only when at least two date tokens were found.
    pub fn is_complete(&self) -> bool {
        self.date_issued.is_some() && self.valid_until.is_some()
    }
}

/// Pick the earliest and latest date tokens in `text`.
pub fn extract_date_range(text: &str, long_form: bool) -> DateRange {
    let mut dates = DateExtractor::new().with_long_form(long_form).extract_all(text);
    let found = dates.len();

    let mut invalid: Vec<String> = Vec::new();
    for date in &dates {
        if !is_calendar_date(&date.value) && !invalid.contains(&date.value) {
            invalid.push(date.value.clone());
        }
    }

    if found < 2 {
        return DateRange {
            found,
            invalid,
            ..Default::default()
        };
    }

    dates.sort_by(|a, b| a.value.cmp(&b.value));
    let valid_until = dates.pop();
    let date_issued = dates.into_iter().next();

    DateRange {
        date_issued,
        valid_until,
        found,
        invalid,
    }
}

fn month_number(month: &str) -> u32 {
    match month.to_lowercase().get(..3) {
        Some("jan") => 1,
        Some("feb") => 2,
        Some("mar") => 3,
        Some("apr") => 4,
        Some("may") => 5,
        Some("jun") => 6,
        Some("jul") => 7,
        Some("aug") => 8,
        Some("sep") => 9,
        Some("oct") => 10,
        Some("nov") => 11,
        Some("dec") => 12,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn values(text: &str) -> Vec<String> {
        DateExtractor::new().extract_all(text).into_iter().map(|d| d.value).collect()
    }

    #[test]
    fn test_extract_iso_date() {
        let result = DateExtractor::new().extract("Date Issued: 2025-03-20").unwrap();
        assert_eq!(result.value, "2025-03-20");
        assert_eq!(result.position, Some((13, 23)));
    }

    #[test]
    fn test_invalid_calendar_dates_are_kept_as_text() {
        assert_eq!(values("2025-02-30 2024-02-29"), vec!["2025-02-30", "2024-02-29"]);
        assert!(!is_calendar_date("2025-02-30"));
        assert!(!is_calendar_date("2025-13-01"));
        assert!(is_calendar_date("2024-02-29"));
    }

    #[test]
    fn test_extract_long_form() {
        assert_eq!(
            values("Issued March 20, 2025 valid until Dec. 31 2025"),
            vec!["2025-03-20", "2025-12-31"]
        );

        let iso_only = DateExtractor::new().with_long_form(false).extract_all("March 20, 2025");
        assert!(iso_only.is_empty());
    }

    #[test]
    fn test_tokens_in_text_order() {
        assert_eq!(
            values("Valid until Dec 31, 2025 issued 2025-03-20"),
            vec!["2025-12-31", "2025-03-20"]
        );
    }

    #[test]
    fn test_range_uses_earliest_and_latest() {
        let range = extract_date_range("2025-12-31 then 2025-03-20 and 2025-06-01", true);

        assert_eq!(range.found, 3);
        assert_eq!(range.date_issued.unwrap().value, "2025-03-20");
        assert_eq!(range.valid_until.unwrap().value, "2025-12-31");
        assert!(range.invalid.is_empty());
    }

    #[test]
    fn test_single_date_yields_no_range() {
        let range = extract_date_range("Date Issued: 2025-03-20", true);
        assert_eq!(range.found, 1);
        assert!(!range.is_complete());
        assert!(range.date_issued.is_none());
        assert!(range.valid_until.is_none());
    }

    #[test]
    fn test_repeated_date_fills_both_ends() {
        let range = extract_date_range("Date Issued: 2025-03-20\nValid Until: 2025-03-20", true);
        assert_eq!(range.found, 2);
        assert_eq!(range.date_issued.unwrap().value, "2025-03-20");
        assert_eq!(range.valid_until.unwrap().value, "2025-03-20");
    }

    #[test]
    fn test_invalid_date_still_counts() {
        let range = extract_date_range("Date Issued: 2025-02-30\nValid Until: 2025-12-31", true);
        assert_eq!(range.found, 2);
        assert_eq!(range.date_issued.unwrap().value, "2025-02-30");
        assert_eq!(range.valid_until.unwrap().value, "2025-12-31");
        assert_eq!(range.invalid, vec!["2025-02-30".to_string()]);
    }

    #[test]
    fn test_permit_number_is_not_a_date() {
        let range = extract_date_range("2025-0401008000-1206", true);
        assert_eq!(range.found, 0);
    }
}
