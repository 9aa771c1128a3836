//! Identifier number extraction (full or masked 12-digit numbers).

use super::patterns::IDENTIFIER_NUMBER;
use super::{ExtractionMatch, FieldExtractor};

/// Identifier number extractor.
///
/// Matches either three groups of four digits or a masked number
/// (`XXXX XXXX 1234`) and returns the match with all whitespace removed.
pub struct IdentifierExtractor;

impl IdentifierExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for IdentifierExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for IdentifierExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        IDENTIFIER_NUMBER
            .find_iter(text)
            .map(|m| {
                ExtractionMatch::new(strip_whitespace(m.as_str()), m.as_str())
                    .with_position(m.start(), m.end())
            })
            .collect()
    }
}

/// Extract the first identifier number from text.
pub fn extract_identifier(text: &str) -> Option<String> {
    IdentifierExtractor::new().extract(text).map(|m| m.value)
}

/// Whether an extracted identifier hides its leading digits.
pub fn is_masked(identifier: &str) -> bool {
    identifier.chars().any(|c| c.eq_ignore_ascii_case(&'x'))
}

fn strip_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}
