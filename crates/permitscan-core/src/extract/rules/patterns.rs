//! Common regex patterns for business permit extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Identifiers. The business ID letter is case-sensitive; the others are digits only.
    pub static ref BUSINESS_ID_NO: Regex = Regex::new(
        r"\b[A-Z]\d{6}-\d{5}\b"
    ).unwrap();

    pub static ref BUSINESS_TIN: Regex = Regex::new(
        r"\b\d{3}-\d{3}-\d{3}-\d{5}\b"
    ).unwrap();

    pub static ref BUSINESS_PERMIT_NO: Regex = Regex::new(
        r"\b\d{4}-\d{10}-\d{4}\b"
    ).unwrap();

    // Dates
    pub static ref DATE_ISO: Regex = Regex::new(
        r"\b(\d{4})-(\d{2})-(\d{2})\b"
    ).unwrap();

    pub static ref DATE_LONG: Regex = Regex::new(
        r"(?i)\b(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s+(\d{1,2}),?\s+(\d{4})\b"
    ).unwrap();

    // Captions printed on the permit form
    pub static ref OWNER_NAME_LABEL: Regex = Regex::new(
        r"(?i)\bOWNER(?:'?S)?\s*NAME\b"
    ).unwrap();

    pub static ref BUSINESS_NAME_LABEL: Regex = Regex::new(
        r"(?i)\b(?:BUSINESS|TRADE)\s*NAME\b"
    ).unwrap();

    pub static ref BUSINESS_ADDRESS_LABEL: Regex = Regex::new(
        r"(?i)\bBUSINESS\s*ADDRESS\b"
    ).unwrap();

    pub static ref ADDRESS_LABEL: Regex = Regex::new(
        r"(?i)\bADDRESS\b"
    ).unwrap();

    /// Words that make "Address" caption something other than the business address.
    pub static ref ADDRESS_QUALIFIER: Regex = Regex::new(
        r"(?i)\b(?:E-?\s?MAIL|OWNER(?:'?S)?|HOME|RESIDENCE|RESIDENTIAL|PERMANENT|MAILING|WEB(?:SITE)?)[ \t]*$"
    ).unwrap();

    /// Any caption that ends a label-anchored value.
    pub static ref FIELD_LABEL: Regex = Regex::new(
        r"(?i)\b(?:OWNER(?:'?S)?\s*NAME|(?:BUSINESS|TRADE)\s*NAME|(?:BUSINESS\s*)?ADDRESS|BUSINESS\s*ID\s*NO|(?:BUSINESS\s*)?TIN|BUSINESS\s*PERMIT\s*NO|DATE\s*ISSUED|VALID\s*(?:UNTIL|THRU)|LINE\s*OF\s*BUSINESS|BUSINESS\s*LINE)\b"
    ).unwrap();

    // Fallbacks
    pub static ref WORD_TOKEN: Regex = Regex::new(r"\S+").unwrap();

    pub static ref UPPERCASE_WORD: Regex = Regex::new(
        r"^[A-Z][A-Z'.\-]+$"
    ).unwrap();

    pub static ref BUSINESS_KEYWORD_PHRASE: Regex = Regex::new(
        r"\b((?:[A-Z][\w'&.\-]*[ \t]+){0,5}(?i:cottages?|rentals?|shops?|stores?|services?|cent(?:er|re)s?|resorts?|restaurants?|eatery|bakery|bakeshop|pharmacy|drugstore|hardware|salon|parlou?r|trading|enterprises?|mart|grocery|canteen|carinderia|farms?|lodge|inn|cafe|boutique|clinic|repair|suppl(?:y|ies)|marketing)\b(?:[ \t]+[A-Z][\w'&.\-]*){0,3})"
    ).unwrap();

    pub static ref TITLE_CASE_LINE: Regex = Regex::new(
        r"(?m)^[ \t]*([A-Z][a-z][\w'&.\-]*(?:[ \t]+(?:[A-Z][\w'&.\-]*|&|of|de|del|and)){1,5})[ \t]*$"
    ).unwrap();

    pub static ref BARANGAY_ADDRESS: Regex = Regex::new(
        r"\b((?:BARANGAY|BRGY\.?)[ \t]+\d+[ \t]*,[ \t]*[A-Z][A-Z \-]*[A-Z](?:[ \t]*,[ \t]*[A-Z][A-Z \-]*[A-Z])*)"
    ).unwrap();
}
