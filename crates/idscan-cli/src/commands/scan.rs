//! Scan command - face crop followed by field extraction.

use std::path::{Path, PathBuf};

use clap::Args;

use super::extract::extract_record;
use super::face::crop_face;
use super::load_config;
use super::output::{print_error, print_json, ScanOutput, NO_IMAGE_PATH, SCAN_SUCCESS};

/// Arguments for the scan command.
#[derive(Args)]
pub struct ScanArgs {
    /// Card image
    image: Option<PathBuf>,

    /// Directory for the cropped face (default from config)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
}

pub async fn run(args: ScanArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let Some(image_path) = args.image else {
        return print_error(NO_IMAGE_PATH);
    };

    let config = match load_config(config_path) {
        Ok(config) => config,
        Err(e) => return print_error(format!("{:#}", e)),
    };
    let output_dir = args
        .output_dir
        .unwrap_or_else(|| config.face.output_dir.clone());

    let photo_path = match crop_face(&image_path, &output_dir, &config) {
        Ok(path) => path,
        Err(e) => return print_error(e),
    };

    match extract_record(&image_path, &config) {
        Ok(record) => print_json(&ScanOutput {
            message: SCAN_SUCCESS,
            photo_path: photo_path.display().to_string(),
            record: &record,
        }),
        Err(e) => print_error(format!("{:#}", e)),
    }
}
