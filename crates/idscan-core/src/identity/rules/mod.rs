//! Rule-based field extractors for identity documents.

pub mod dob;
pub mod identifier;
pub mod name;
pub mod patterns;

pub use dob::{extract_dob, DobExtractor};
pub use identifier::{extract_identifier, IdentifierExtractor};
pub use name::{
    DateOfBirthNeighbor, NameCascade, NameMatch, NamePass, NameRule, NameRuleKind,
    ProperCaseName, UppercaseLabel,
};
pub use patterns::*;

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// A matched field value together with where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Byte range in the source text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, source: impl Into<String>) -> Self {
        Self {
            value,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }
}
