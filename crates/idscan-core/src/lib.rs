//! Core library for identity document scanning.
//!
//! This crate provides:
//! - Identity field extraction from raw OCR text (name, date of birth, identifier number)
//! - OCR pipeline behind a pluggable recognizer trait (PaddleOCR ONNX or Tesseract)
//! - Face detection with OpenCV Haar cascades and face cropping to JPEG

pub mod error;
pub mod models;
pub mod ocr;
pub mod identity;
pub mod face;

pub use error::{IdScanError, Result};
pub use models::config::IdScanConfig;
pub use models::record::{ExtractedRecord, NOT_FOUND};
pub use models::region::FaceRegion;
pub use ocr::{create_recognizer, OcrResult, TextBox, TextRecognizer};
pub use identity::{extract_fields, ExtractionResult, IdentityExtractor, IdentityParser};
pub use face::{DetectionParams, FaceDetector, FaceLocator, HaarCascade};
