//! Identity parser combining the field rules.

use std::time::Instant;

use tracing::{debug, info};

use crate::models::record::ExtractedRecord;
use crate::ocr::OcrResult;

use super::lines::OcrLines;
use super::rules::{
    DobExtractor, FieldExtractor, IdentifierExtractor, NameCascade, NamePass, NameRuleKind,
};
use super::IdentityExtractor;

/// Result of identity extraction.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// Extracted fields.
    pub record: ExtractedRecord,
    /// Raw text the fields were extracted from.
    pub raw_text: String,
    /// Number of non-empty lines in the raw text.
    pub line_count: usize,
    /// Name rule that produced the name, if any.
    pub name_rule: Option<NameRuleKind>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Rule-based identity parser.
///
/// Parsing never fails: undetected fields are left as `None`.
pub struct IdentityParser {
    identifier: IdentifierExtractor,
    dob: DobExtractor,
    names: NameCascade,
}

impl IdentityParser {
    /// Create a parser with the default name cascade.
    pub fn new() -> Self {
        Self {
            identifier: IdentifierExtractor::new(),
            dob: DobExtractor::new(),
            names: NameCascade::default(),
        }
    }

    /// Replace the name rule passes (highest priority first).
    pub fn with_name_passes(mut self, passes: Vec<NamePass>) -> Self {
        self.names = NameCascade::new(passes);
        self
    }

    /// Parse identity fields from raw OCR text.
    pub fn parse(&self, text: &str) -> ExtractionResult {
        let start = Instant::now();
        let lines = OcrLines::from_text(text);

        debug!("Parsing identity fields from {} lines", lines.len());

        let identifier_number = self.identifier.extract(lines.flat()).map(|m| m.value);
        let dob = self.dob.extract(lines.flat()).map(|m| m.value);
        let name = self.names.detect(lines.lines());

        if let Some(ref found) = name {
            debug!(
                "Name taken from line {} by {} rule",
                found.line_index, found.rule
            );
        }

        let name_rule = name.as_ref().map(|n| n.rule);
        let record = ExtractedRecord {
            name: name.map(|n| n.value),
            dob,
            identifier_number,
        };

        let missing = record.missing_fields();
        if missing.is_empty() {
            info!("Extracted all identity fields");
        } else {
            info!("Extracted identity fields, missing: {}", missing.join(", "));
        }

        ExtractionResult {
            record,
            raw_text: text.to_string(),
            line_count: lines.len(),
            name_rule,
            processing_time_ms: start.elapsed().as_millis() as u64,
        }
    }
}

impl Default for IdentityParser {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityExtractor for IdentityParser {
    fn extract(&self, ocr_result: &OcrResult) -> ExtractedRecord {
        self.parse(&ocr_result.text).record
    }

    fn extract_from_text(&self, text: &str) -> ExtractedRecord {
        self.parse(text).record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::rules::{ProperCaseName, UppercaseLabel};
    use crate::models::record::NOT_FOUND;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_typical_card() {
        let text = r#"
            GOVERNMENT OF INDIA
            Ravi Kumar
            DOB: 12/08/1985
            MALE
            1234 5678 9012
            VID : 9101 2345 6789 0123
        "#;

        let result = IdentityParser::new().parse(text);

        assert_eq!(
            result.record,
            ExtractedRecord {
                name: Some("Ravi Kumar".to_string()),
                dob: Some("12/08/1985".to_string()),
                identifier_number: Some("123456789012".to_string()),
            }
        );
        assert_eq!(result.name_rule, Some(NameRuleKind::ProperCase));
        assert_eq!(result.line_count, 6);
    }

    #[test]
    fn test_labeled_name_line_falls_back_to_line_above_dob() {
        // "Name: JOHN SMITH" has a lowercase label, so neither shape rule
        // accepts it and the line above the DOB line is used
        let text = "Name: JOHN SMITH\n1234 5678 9012\nDOB 01/02/1990";
        let result = IdentityParser::new().parse(text);

        assert_eq!(result.record.identifier_number.as_deref(), Some("123456789012"));
        assert_eq!(result.record.dob.as_deref(), Some("01/02/1990"));
        assert_eq!(result.record.name.as_deref(), Some("1234 5678 9012"));
        assert_eq!(result.name_rule, Some(NameRuleKind::PrecedesDateOfBirth));
    }

    #[test]
    fn test_uppercase_name_line() {
        let text = "JOHN SMITH\n1234 5678 9012\nDOB 01/02/1990";
        let record = IdentityParser::new().extract_from_text(text);
        assert_eq!(record.name.as_deref(), Some("JOHN SMITH"));
    }

    #[test]
    fn test_uppercase_name_above_proper_case_line() {
        let result = IdentityParser::new().parse("RAVI KUMAR\nRavi Kumar\nDOB 01/02/1990");
        assert_eq!(result.record.name.as_deref(), Some("RAVI KUMAR"));
        assert_eq!(result.name_rule, Some(NameRuleKind::UppercaseLabel));
    }

    #[test]
    fn test_double_spaced_name_is_not_proper_case() {
        let result = IdentityParser::new().parse("Ravi  Kumar\nXYZ\nDOB 01/02/1990");
        assert_eq!(result.record.name.as_deref(), Some("XYZ"));
        assert_eq!(result.name_rule, Some(NameRuleKind::PrecedesDateOfBirth));
    }

    #[test]
    fn test_masked_identifier_across_lines() {
        let record = IdentityParser::new().extract_from_text("Priya Nair\nxxxx xxxx\n9012");
        assert_eq!(record.identifier_number.as_deref(), Some("xxxxxxxx9012"));
        assert_eq!(record.dob, None);
    }

    #[test]
    fn test_fields_are_independent() {
        let record = IdentityParser::new().extract_from_text("D0B 1990-02-01");
        assert_eq!(record.dob.as_deref(), Some("1990-02-01"));
        assert_eq!(record.name, None);
        assert_eq!(record.identifier_number, None);
    }

    #[test]
    fn test_noise_yields_placeholders() {
        let record = IdentityParser::new().extract_from_text("~~ ## ..\n\n 12 ab");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["name"], NOT_FOUND);
        assert_eq!(json["dob"], NOT_FOUND);
        assert_eq!(json["aadhaarNumber"], NOT_FOUND);
    }

    #[test]
    fn test_deterministic() {
        let text = "ANJALI MEHTA\nDOB 03/04/1999\nXXXX XXXX 1111";
        let parser = IdentityParser::new();
        assert_eq!(parser.extract_from_text(text), parser.extract_from_text(text));
    }

    #[test]
    fn test_custom_name_passes() {
        let parser = IdentityParser::new().with_name_passes(vec![
            vec![Box::new(UppercaseLabel)],
            vec![Box::new(ProperCaseName)],
        ]);
        let record = parser.extract_from_text("Ravi Kumar\nRAVI KUMAR");
        assert_eq!(record.name.as_deref(), Some("RAVI KUMAR"));
    }

    #[test]
    fn test_extract_from_ocr_result() {
        let ocr = OcrResult::from_text("Meera Iyer\nDOB: 05/06/1970", (100, 50));
        let record = IdentityParser::new().extract(&ocr);
        assert_eq!(record.name.as_deref(), Some("Meera Iyer"));
        assert_eq!(record.dob.as_deref(), Some("05/06/1970"));
    }
}
