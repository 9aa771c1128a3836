//! Error types for the idscan-core library.

use thiserror::Error;

/// Main error type for the idscan library.
#[derive(Error, Debug)]
pub enum IdScanError {
    /// OCR processing error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Face location error.
    #[error(transparent)]
    Face(#[from] FaceError),

    /// Image processing error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to OCR processing.
#[derive(Error, Debug)]
pub enum OcrError {
    /// Failed to load OCR models or initialize the engine.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// Text recognition failed.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// Invalid image format or dimensions.
    #[error("invalid image: {0}")]
    InvalidImage(String),

    /// The configured backend was not compiled in.
    #[error("OCR backend '{0}' is not available in this build")]
    BackendUnavailable(String),
}

/// Errors related to face location.
///
/// The first two variants are the in-band outcomes reported to callers
/// verbatim, so their messages are part of the output contract.
#[derive(Error, Debug)]
pub enum FaceError {
    /// The source image could not be opened or decoded.
    #[error("Could not read image")]
    UnreadableImage,

    /// The detector returned no regions.
    #[error("No face detected")]
    NoFaceDetected,

    /// The cascade file could not be parsed or is unsupported.
    #[error("invalid face cascade: {0}")]
    Cascade(String),

    /// Detection parameters would not terminate or cannot match anything.
    #[error("invalid detection parameters: {0}")]
    InvalidParams(String),

    /// The detected region does not fit inside the image.
    #[error("face region {0} is outside the image bounds")]
    RegionOutOfBounds(String),

    /// Writing the cropped face failed.
    #[error("failed to save cropped face: {0}")]
    Save(#[from] image::ImageError),

    /// I/O error (output directory, cascade file).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for the idscan library.
pub type Result<T> = std::result::Result<T, IdScanError>;
