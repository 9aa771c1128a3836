//! Single-object JSON results on stdout.

use std::fmt::Display;

use serde::Serialize;

use idscan_core::ExtractedRecord;

/// Reported when a command is invoked without an image.
pub const NO_IMAGE_PATH: &str = "No image path provided";

/// Success message of the combined scan.
pub const SCAN_SUCCESS: &str = "Face and Aadhaar data extracted successfully";

#[derive(Serialize)]
struct ErrorOutput {
    error: String,
}

#[derive(Serialize)]
pub struct FaceOutput {
    pub path: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanOutput<'a> {
    pub message: &'static str,
    pub photo_path: String,
    #[serde(flatten)]
    pub record: &'a ExtractedRecord,
}

/// Print a value as one line of JSON.
pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}

/// Print `{"error": message}`.
pub fn print_error(message: impl Display) -> anyhow::Result<()> {
    print_json(&ErrorOutput {
        error: message.to_string(),
    })
}
