//! Extract command - read identity fields from a card image.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use idscan_core::models::config::DebugConfig;
use idscan_core::{create_recognizer, ExtractedRecord, IdScanConfig, IdentityParser};

use super::load_config;
use super::output::{print_error, print_json, NO_IMAGE_PATH};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Card image (PNG, JPEG, ...)
    image: Option<PathBuf>,
}

pub async fn run(args: ExtractArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let Some(image_path) = args.image else {
        return print_error(NO_IMAGE_PATH);
    };

    let result = load_config(config_path).and_then(|config| extract_record(&image_path, &config));
    match result {
        Ok(record) => print_json(&record),
        Err(e) => print_error(format!("{:#}", e)),
    }
}

/// Run OCR on an image and parse the identity fields from its text.
pub fn extract_record(image_path: &Path, config: &IdScanConfig) -> anyhow::Result<ExtractedRecord> {
    let image = image::open(image_path)
        .with_context(|| format!("failed to open image {}", image_path.display()))?;

    let recognizer = create_recognizer(&config.ocr)?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(format!("Running {} OCR...", recognizer.name()));
    pb.enable_steady_tick(Duration::from_millis(100));

    let ocr = recognizer.recognize(&image);
    pb.finish_and_clear();
    let ocr = ocr?;

    info!(
        "OCR produced {} text boxes in {}ms",
        ocr.boxes.len(),
        ocr.processing_time_ms
    );
    dump_raw_text(&config.debug, &ocr.text);

    let result = IdentityParser::new().parse(&ocr.text);
    debug!(
        "Parsed {} lines in {}ms, name rule: {}",
        result.line_count,
        result.processing_time_ms,
        result
            .name_rule
            .map(|r| r.to_string())
            .unwrap_or_else(|| "none".to_string())
    );

    Ok(result.record)
}

/// Write the raw OCR text for troubleshooting. Failures are only logged.
fn dump_raw_text(debug_config: &DebugConfig, text: &str) {
    let Some(path) = &debug_config.ocr_dump_path else {
        return;
    };
    match fs::write(path, text) {
        Ok(()) => debug!("Raw OCR text written to {}", path.display()),
        Err(e) => warn!("Could not write OCR debug output to {}: {}", path.display(), e),
    }
}
