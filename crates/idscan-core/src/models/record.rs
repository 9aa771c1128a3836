//! Extracted identity record.

use serde::{Serialize, Serializer};

/// Placeholder emitted for fields that could not be detected.
pub const NOT_FOUND: &str = "Not found";

/// Identity fields extracted from a document.
///
/// Absence is tracked as `None`; the [`NOT_FOUND`] placeholder only appears
/// once the record is serialized, so a document that literally reads
/// "Not found" is still distinguishable from a miss.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractedRecord {
    /// Holder name.
    #[serde(serialize_with = "or_not_found")]
    pub name: Option<String>,

    /// Date of birth, exactly as printed.
    #[serde(serialize_with = "or_not_found")]
    pub dob: Option<String>,

    /// Identifier number with whitespace removed (may be masked).
    #[serde(rename = "aadhaarNumber", serialize_with = "or_not_found")]
    pub identifier_number: Option<String>,
}

impl ExtractedRecord {
    /// Name, or the placeholder.
    pub fn name_or_placeholder(&self) -> &str {
        self.name.as_deref().unwrap_or(NOT_FOUND)
    }

    /// Date of birth, or the placeholder.
    pub fn dob_or_placeholder(&self) -> &str {
        self.dob.as_deref().unwrap_or(NOT_FOUND)
    }

    /// Identifier number, or the placeholder.
    pub fn identifier_or_placeholder(&self) -> &str {
        self.identifier_number.as_deref().unwrap_or(NOT_FOUND)
    }

    /// Names of the fields that were not detected.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.name.is_none() {
            missing.push("name");
        }
        if self.dob.is_none() {
            missing.push("dob");
        }
        if self.identifier_number.is_none() {
            missing.push("aadhaarNumber");
        }
        missing
    }
}

fn or_not_found<S: Serializer>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error> {
    match value.as_deref() {
        Some(v) if !v.is_empty() => serializer.serialize_str(v),
        _ => serializer.serialize_str(NOT_FOUND),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_serialize_full_record() {
        let record = ExtractedRecord {
            name: Some("John Smith".to_string()),
            dob: Some("01/02/1990".to_string()),
            identifier_number: Some("123456789012".to_string()),
        };

        assert_eq!(
            serde_json::to_string(&record).unwrap(),
            r#"{"name":"John Smith","dob":"01/02/1990","aadhaarNumber":"123456789012"}"#
        );
    }

    #[test]
    fn test_serialize_missing_fields_as_placeholder() {
        let record = ExtractedRecord::default();
        let json: serde_json::Value = serde_json::to_value(&record).unwrap();

        assert_eq!(json["name"], NOT_FOUND);
        assert_eq!(json["dob"], NOT_FOUND);
        assert_eq!(json["aadhaarNumber"], NOT_FOUND);
        assert_eq!(record.missing_fields(), vec!["name", "dob", "aadhaarNumber"]);
    }

    #[test]
    fn test_empty_value_is_placeholder() {
        let record = ExtractedRecord {
            name: Some(String::new()),
            ..Default::default()
        };
        let json: serde_json::Value = serde_json::to_value(&record).unwrap();
        assert_eq!(json["name"], NOT_FOUND);
    }

    #[test]
    fn test_literal_not_found_text_is_a_value() {
        let record = ExtractedRecord {
            name: Some(NOT_FOUND.to_string()),
            ..Default::default()
        };
        assert!(record.missing_fields().contains(&"dob"));
        assert!(!record.missing_fields().contains(&"name"));
        assert_eq!(record.name_or_placeholder(), NOT_FOUND);
    }
}
