//! Face bounding box.

use serde::{Deserialize, Serialize};

/// A face rectangle in image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl FaceRegion {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Build a region from signed detector output, clipped to the image.
    ///
    /// Returns `None` when nothing of the rectangle remains inside the image.
    pub fn clipped(
        x: i64,
        y: i64,
        width: i64,
        height: i64,
        image_width: u32,
        image_height: u32,
    ) -> Option<Self> {
        let x1 = x.max(0);
        let y1 = y.max(0);
        let x2 = (x + width).min(image_width as i64);
        let y2 = (y + height).min(image_height as i64);

        if x2 <= x1 || y2 <= y1 {
            return None;
        }

        Some(Self::new(
            x1 as u32,
            y1 as u32,
            (x2 - x1) as u32,
            (y2 - y1) as u32,
        ))
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Whether the region is non-empty and lies fully inside the image.
    pub fn fits_within(&self, image_width: u32, image_height: u32) -> bool {
        self.width > 0
            && self.height > 0
            && self.x as u64 + self.width as u64 <= image_width as u64
            && self.y as u64 + self.height as u64 <= image_height as u64
    }
}

impl std::fmt::Display for FaceRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}+{}+{}", self.width, self.height, self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clipped_inside() {
        let region = FaceRegion::clipped(10, 20, 30, 40, 100, 100).unwrap();
        assert_eq!(region, FaceRegion::new(10, 20, 30, 40));
        assert!(region.fits_within(100, 100));
    }

    #[test]
    fn test_clipped_partially_outside() {
        let region = FaceRegion::clipped(-5, 90, 20, 20, 100, 100).unwrap();
        assert_eq!(region, FaceRegion::new(0, 90, 15, 10));
        assert!(region.fits_within(100, 100));
    }

    #[test]
    fn test_clipped_fully_outside() {
        assert!(FaceRegion::clipped(120, 0, 10, 10, 100, 100).is_none());
        assert!(FaceRegion::clipped(0, 0, 0, 10, 100, 100).is_none());
    }

    #[test]
    fn test_fits_within_rejects_overflow() {
        assert!(!FaceRegion::new(90, 0, 20, 10).fits_within(100, 100));
        assert!(!FaceRegion::new(0, 0, 0, 10).fits_within(100, 100));
        assert_eq!(FaceRegion::new(0, 0, 4, 5).area(), 20);
        assert_eq!(FaceRegion::new(1, 2, 3, 4).to_string(), "3x4+1+2");
    }
}
