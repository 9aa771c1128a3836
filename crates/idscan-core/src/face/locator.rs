//! Face locator: detect, crop and save the first face in an image.

use std::fs;
use std::path::{Path, PathBuf};

use image::{GenericImageView, ImageFormat};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::FaceError;

use super::{DetectionParams, FaceDetector};

/// Crops the first detected face of an image into an output directory.
pub struct FaceLocator<D: FaceDetector> {
    detector: D,
    output_dir: PathBuf,
    params: DetectionParams,
}

impl<D: FaceDetector> FaceLocator<D> {
    pub fn new(detector: D, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            detector,
            output_dir: output_dir.into(),
            params: DetectionParams::default(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Locate a face and write it as `face_<uuid>.jpg`.
    ///
    /// The output directory is created before the image is read, so it
    /// exists even when no face is found.
    pub fn locate(&self, image_path: &Path) -> Result<PathBuf, FaceError> {
        fs::create_dir_all(&self.output_dir)?;

        let image = image::open(image_path).map_err(|e| {
            warn!("Failed to open {}: {}", image_path.display(), e);
            FaceError::UnreadableImage
        })?;
        let (width, height) = image.dimensions();
        let gray = image.to_luma8();

        let regions = self.detector.detect(&gray, &self.params)?;
        debug!(
            "{} face regions detected in {}x{} image",
            regions.len(),
            width,
            height
        );

        let region = regions.first().copied().ok_or(FaceError::NoFaceDetected)?;
        if !region.fits_within(width, height) {
            return Err(FaceError::RegionOutOfBounds(region.to_string()));
        }

        let face = image
            .crop_imm(region.x, region.y, region.width, region.height)
            .to_rgb8();
        let path = self
            .output_dir
            .join(format!("face_{}.jpg", Uuid::new_v4().simple()));
        face.save_with_format(&path, ImageFormat::Jpeg)?;

        info!("Saved face {} to {}", region, path.display());
        Ok(path)
    }
}

/// Locate the first face in `image_path` and save it under `output_dir`.
pub fn locate_face<D: FaceDetector>(
    detector: D,
    image_path: &Path,
    output_dir: &Path,
) -> Result<PathBuf, FaceError> {
    FaceLocator::new(detector, output_dir).locate(image_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::region::FaceRegion;
    use image::{GrayImage, Rgb, RgbImage};

    struct FixedDetector(Vec<FaceRegion>);

    impl FaceDetector for FixedDetector {
        fn detect(
            &self,
            _gray: &GrayImage,
            params: &DetectionParams,
        ) -> Result<Vec<FaceRegion>, FaceError> {
            assert_eq!(*params, DetectionParams::default());
            Ok(self.0.clone())
        }
    }

    fn write_image(dir: &Path) -> PathBuf {
        let path = dir.join("card.png");
        RgbImage::from_pixel(64, 48, Rgb([180, 140, 120]))
            .save(&path)
            .unwrap();
        path
    }

    #[test]
    fn test_crops_first_region() {
        let dir = tempfile::tempdir().unwrap();
        let image_path = write_image(dir.path());
        let detector = FixedDetector(vec![
            FaceRegion::new(10, 8, 20, 16),
            FaceRegion::new(0, 0, 64, 48),
        ]);

        let path = locate_face(&detector, &image_path, &dir.path().join("faces")).unwrap();

        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("face_") && name.ends_with(".jpg"));
        let hex = &name["face_".len()..name.len() - ".jpg".len()];
        assert_eq!(hex.len(), 32);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));

        let saved = image::open(&path).unwrap();
        assert_eq!(saved.dimensions(), (20, 16));
    }

    #[test]
    fn test_two_runs_produce_distinct_files() {
        let dir = tempfile::tempdir().unwrap();
        let image_path = write_image(dir.path());
        let locator = FaceLocator::new(
            FixedDetector(vec![FaceRegion::new(0, 0, 32, 32)]),
            dir.path().join("faces"),
        );

        let first = locator.locate(&image_path).unwrap();
        let second = locator.locate(&image_path).unwrap();
        assert_ne!(first, second);
        assert!(first.exists() && second.exists());
    }

    #[test]
    fn test_no_face_still_creates_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let image_path = write_image(dir.path());
        let output_dir = dir.path().join("nested").join("faces");

        let err = locate_face(FixedDetector(Vec::new()), &image_path, &output_dir).unwrap_err();
        assert_eq!(err.to_string(), "No face detected");
        assert!(output_dir.is_dir());
        assert_eq!(fs::read_dir(&output_dir).unwrap().count(), 0);
    }

    #[test]
    fn test_unreadable_image() {
        let dir = tempfile::tempdir().unwrap();
        let garbage = dir.path().join("garbage.png");
        fs::write(&garbage, b"not an image").unwrap();
        let detector = FixedDetector(vec![FaceRegion::new(0, 0, 1, 1)]);

        for path in [garbage, dir.path().join("missing.jpg")] {
            let err = locate_face(&detector, &path, dir.path()).unwrap_err();
            assert!(matches!(err, FaceError::UnreadableImage));
            assert_eq!(err.to_string(), "Could not read image");
        }
    }

    #[test]
    fn test_region_outside_image() {
        let dir = tempfile::tempdir().unwrap();
        let image_path = write_image(dir.path());
        let detector = FixedDetector(vec![FaceRegion::new(50, 40, 20, 20)]);

        let err = locate_face(detector, &image_path, dir.path()).unwrap_err();
        assert!(matches!(err, FaceError::RegionOutOfBounds(_)));
    }
}
