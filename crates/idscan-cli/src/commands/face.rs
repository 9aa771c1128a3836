//! Face command - crop the first detected face from an image.

use std::path::{Path, PathBuf};

use clap::Args;
use image::GrayImage;
use tracing::{debug, info};

use idscan_core::error::FaceError;
use idscan_core::face::locate_face;
use idscan_core::{DetectionParams, FaceDetector, FaceRegion, HaarCascade, IdScanConfig};

use super::load_config;
use super::output::{print_error, print_json, FaceOutput, NO_IMAGE_PATH};

/// Arguments for the face command.
#[derive(Args)]
pub struct FaceArgs {
    /// Image containing a face
    image: Option<PathBuf>,

    /// Directory for cropped faces (default from config: cropped_faces)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
}

pub async fn run(args: FaceArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
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

    match crop_face(&image_path, &output_dir, &config) {
        Ok(path) => print_json(&FaceOutput {
            path: path.display().to_string(),
        }),
        Err(e) => print_error(e),
    }
}

/// Cascade file read at detection time, after the locator has prepared
/// the output directory and decoded the image.
struct CascadeFile<'a> {
    path: &'a Path,
}

impl CascadeFile<'_> {
    fn load(&self) -> Result<HaarCascade, FaceError> {
        debug!("Loading face cascade from {}", self.path.display());
        HaarCascade::from_file(self.path).map_err(|e| match e {
            FaceError::Io(io) => FaceError::Cascade(format!(
                "cannot read {} ({}); run `idscan models download`",
                self.path.display(),
                io
            )),
            other => other,
        })
    }
}

impl FaceDetector for CascadeFile<'_> {
    fn detect(
        &self,
        gray: &GrayImage,
        params: &DetectionParams,
    ) -> Result<Vec<FaceRegion>, FaceError> {
        self.load()?.detect(gray, params)
    }
}

/// Crop the first face into `output_dir` using the configured cascade.
pub fn crop_face(
    image_path: &Path,
    output_dir: &Path,
    config: &IdScanConfig,
) -> Result<PathBuf, FaceError> {
    let detector = CascadeFile {
        path: &config.face.cascade_path,
    };
    let path = locate_face(&detector, image_path, output_dir)?;
    info!("Face from {} saved to {}", image_path.display(), path.display());
    Ok(path)
}
