//! Common regex patterns for identity document extraction.

use lazy_static::lazy_static;
use regex::Regex;

/// Words that disqualify an all-caps line from being read as a name.
pub const NAME_EXCLUSIONS: [&str; 5] = ["DOB", "MALE", "FEMALE", "GOVERNMENT", "AUTHORITY"];

lazy_static! {
    // Identifier number: 12 digits in groups of four, or a masked form
    // ending in the last four digits
    pub static ref IDENTIFIER_NUMBER: Regex = Regex::new(
        r"(?i)(?:\d{4}\s\d{4}\s\d{4}|x{4,}\s*x{4,}\s*\d{4})"
    ).unwrap();

    // Date of birth with optional (OCR-confusable) label
    pub static ref DATE_OF_BIRTH: Regex = Regex::new(
        r"(?i)\b(?:DOB|D0B)?[:\s-]*(\d{2}[/\-]\d{2}[/\-]\d{4}|\d{4}[-/]\d{2}[-/]\d{2})\b"
    ).unwrap();

    // Day-first date anywhere in a line
    pub static ref DATE_DMY: Regex = Regex::new(
        r"\d{2}[/\-]\d{2}[/\-]\d{4}"
    ).unwrap();

    // Name patterns
    pub static ref PROPER_CASE_NAME: Regex = Regex::new(
        r"^[A-Z][a-z]+(?: [A-Z][a-z]+)+$"
    ).unwrap();

    pub static ref UPPERCASE_LABEL: Regex = Regex::new(
        r"^[A-Z ]{6,}$"
    ).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_alternatives() {
        assert!(IDENTIFIER_NUMBER.is_match("1234 5678 9012"));
        assert!(IDENTIFIER_NUMBER.is_match("XXXX XXXX 9012"));
        assert!(IDENTIFIER_NUMBER.is_match("xxxxxxxx9012"));
        assert!(!IDENTIFIER_NUMBER.is_match("1234-5678-9012"));
        assert!(!IDENTIFIER_NUMBER.is_match("xxx xxxx 9012"));
    }

    #[test]
    fn test_date_of_birth_captures_date_only() {
        let caps = DATE_OF_BIRTH.captures("D0B: 1990-02-01").unwrap();
        assert_eq!(&caps[1], "1990-02-01");
    }

    #[test]
    fn test_name_shapes() {
        assert!(PROPER_CASE_NAME.is_match("John Smith"));
        assert!(!PROPER_CASE_NAME.is_match("John"));
        assert!(!PROPER_CASE_NAME.is_match("JOHN SMITH"));
        assert!(!PROPER_CASE_NAME.is_match("John  Smith"));
        assert!(!PROPER_CASE_NAME.is_match("John\tSmith"));
        assert!(UPPERCASE_LABEL.is_match("JOHN SMITH"));
        assert!(!UPPERCASE_LABEL.is_match("JOHN"));
        assert!(!UPPERCASE_LABEL.is_match("JOHN SMITH:"));
    }
}
