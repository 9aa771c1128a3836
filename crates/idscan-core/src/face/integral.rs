//! Summed-area tables.

use image::GrayImage;
use ndarray::Array2;

/// Integral and squared-integral images of a grayscale image.
///
/// Both tables are `(height + 1) x (width + 1)` with a zero first row and
/// column, so any rectangle sum takes four lookups.
#[derive(Debug, Clone)]
pub struct IntegralImage {
    sum: Array2<f64>,
    sqsum: Array2<f64>,
}

impl IntegralImage {
    pub fn new(gray: &GrayImage) -> Self {
        let (width, height) = gray.dimensions();
        let (w, h) = (width as usize, height as usize);
        let mut sum = Array2::<f64>::zeros((h + 1, w + 1));
        let mut sqsum = Array2::<f64>::zeros((h + 1, w + 1));

        for y in 0..h {
            let mut row = 0.0;
            let mut row_sq = 0.0;
            for x in 0..w {
                let v = gray.get_pixel(x as u32, y as u32).0[0] as f64;
                row += v;
                row_sq += v * v;
                sum[[y + 1, x + 1]] = sum[[y, x + 1]] + row;
                sqsum[[y + 1, x + 1]] = sqsum[[y, x + 1]] + row_sq;
            }
        }

        Self { sum, sqsum }
    }

    pub fn width(&self) -> u32 {
        (self.sum.ncols() - 1) as u32
    }

    pub fn height(&self) -> u32 {
        (self.sum.nrows() - 1) as u32
    }

    /// Sum of pixel values in the rectangle. The caller keeps it in bounds.
    pub fn rect_sum(&self, x: u32, y: u32, width: u32, height: u32) -> f64 {
        Self::lookup(&self.sum, x, y, width, height)
    }

    /// Sum of squared pixel values in the rectangle.
    pub fn rect_sq_sum(&self, x: u32, y: u32, width: u32, height: u32) -> f64 {
        Self::lookup(&self.sqsum, x, y, width, height)
    }

    fn lookup(table: &Array2<f64>, x: u32, y: u32, width: u32, height: u32) -> f64 {
        let (x0, y0) = (x as usize, y as usize);
        let (x1, y1) = (x0 + width as usize, y0 + height as usize);
        table[[y1, x1]] - table[[y0, x1]] - table[[y1, x0]] + table[[y0, x0]]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn test_rect_sums() {
        let gray = GrayImage::from_fn(4, 3, |x, y| Luma([(x + y * 4) as u8]));
        let ii = IntegralImage::new(&gray);

        assert_eq!(ii.width(), 4);
        assert_eq!(ii.height(), 3);
        assert_eq!(ii.rect_sum(0, 0, 4, 3), (0..12).sum::<u32>() as f64);
        // pixels 5, 6, 9, 10
        assert_eq!(ii.rect_sum(1, 1, 2, 2), 30.0);
        assert_eq!(ii.rect_sq_sum(1, 1, 2, 2), 25.0 + 36.0 + 81.0 + 100.0);
        assert_eq!(ii.rect_sum(3, 2, 1, 1), 11.0);
    }

    #[test]
    fn test_empty_rect() {
        let gray = GrayImage::from_pixel(5, 5, Luma([200]));
        let ii = IntegralImage::new(&gray);
        assert_eq!(ii.rect_sum(2, 2, 0, 3), 0.0);
    }
}
