//! Identity field extraction module.

mod lines;
mod parser;
pub mod rules;

pub use lines::OcrLines;
pub use parser::{ExtractionResult, IdentityParser};

use crate::models::record::ExtractedRecord;
use crate::ocr::OcrResult;

/// Trait for identity field extractors.
pub trait IdentityExtractor {
    /// Extract identity fields from an OCR result.
    fn extract(&self, ocr_result: &OcrResult) -> ExtractedRecord;

    /// Extract identity fields from plain text.
    fn extract_from_text(&self, text: &str) -> ExtractedRecord;
}

/// Extract name, date of birth and identifier number from raw OCR text.
pub fn extract_fields(raw_text: &str) -> ExtractedRecord {
    IdentityParser::new().extract_from_text(raw_text)
}
