//! Face detection and cropping.

mod cascade;
mod grouping;
mod integral;
mod locator;

pub use cascade::HaarCascade;
pub use grouping::{group_rectangles, Rect, GROUP_EPS};
pub use integral::IntegralImage;
pub use locator::{locate_face, FaceLocator};

use image::GrayImage;

use crate::error::FaceError;
use crate::models::region::FaceRegion;

/// Image pyramid step between detection scales.
pub const SCALE_FACTOR: f64 = 1.1;

/// Minimum number of overlapping hits a face needs to be reported.
pub const MIN_NEIGHBORS: u32 = 5;

/// Multi-scale detection parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionParams {
    pub scale_factor: f64,
    pub min_neighbors: u32,
}

impl DetectionParams {
    pub fn validate(&self) -> Result<(), FaceError> {
        if self.scale_factor.is_nan() || self.scale_factor <= 1.0 {
            return Err(FaceError::InvalidParams(format!(
                "scale factor must be greater than 1, got {}",
                self.scale_factor
            )));
        }
        Ok(())
    }
}

impl Default for DetectionParams {
    fn default() -> Self {
        Self {
            scale_factor: SCALE_FACTOR,
            min_neighbors: MIN_NEIGHBORS,
        }
    }
}

/// Face detection primitive.
///
/// Regions are returned in the detector's own order; callers that want a
/// single face take the first one.
pub trait FaceDetector {
    fn detect(&self, gray: &GrayImage, params: &DetectionParams)
        -> Result<Vec<FaceRegion>, FaceError>;
}

impl<T: FaceDetector + ?Sized> FaceDetector for &T {
    fn detect(
        &self,
        gray: &GrayImage,
        params: &DetectionParams,
    ) -> Result<Vec<FaceRegion>, FaceError> {
        (**self).detect(gray, params)
    }
}

impl<T: FaceDetector + ?Sized> FaceDetector for Box<T> {
    fn detect(
        &self,
        gray: &GrayImage,
        params: &DetectionParams,
    ) -> Result<Vec<FaceRegion>, FaceError> {
        (**self).detect(gray, params)
    }
}
