//! Date of birth extraction.

use super::patterns::DATE_OF_BIRTH;
use super::{ExtractionMatch, FieldExtractor};

/// Date of birth extractor.
///
/// Dates are returned verbatim. There is no calendar validation, so a
/// syntactically valid `99/99/9999` is accepted.
pub struct DobExtractor;

impl DobExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DobExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for DobExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results = Vec::new();

        for caps in DATE_OF_BIRTH.captures_iter(text) {
            // Group 1 always participates in a match
            if let (Some(full), Some(date)) = (caps.get(0), caps.get(1)) {
                results.push(
                    ExtractionMatch::new(date.as_str().to_string(), full.as_str())
                        .with_position(date.start(), date.end()),
                );
            }
        }

        results
    }
}

/// Extract the first date of birth from text.
pub fn extract_dob(text: &str) -> Option<String> {
    DobExtractor::new().extract(text).map(|m| m.value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labeled_day_first() {
        assert_eq!(extract_dob("DOB: 01/02/1990"), Some("01/02/1990".to_string()));
        assert_eq!(extract_dob("dob - 01-02-1990"), Some("01-02-1990".to_string()));
    }

    #[test]
    fn test_ocr_confusable_label() {
        assert_eq!(extract_dob("D0B 1990/02/01"), Some("1990/02/01".to_string()));
    }

    #[test]
    fn test_unlabeled_year_first() {
        assert_eq!(
            extract_dob("Issued 2015-07-30 Male"),
            Some("2015-07-30".to_string())
        );
    }

    #[test]
    fn test_no_calendar_validation() {
        assert_eq!(extract_dob("DOB 99/99/9999"), Some("99/99/9999".to_string()));
    }

    #[test]
    fn test_first_match_wins() {
        let extractor = DobExtractor::new();
        let all = extractor.extract_all("DOB 01/02/1990 printed 2020-01-01");
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].value, "01/02/1990");
        assert_eq!(all[0].source, "DOB 01/02/1990");
        assert_eq!(all[0].position, Some((4, 14)));
    }

    #[test]
    fn test_requires_word_boundary() {
        assert_eq!(extract_dob("ref A01/02/19901"), None);
        assert_eq!(extract_dob("no date here"), None);
    }
}
