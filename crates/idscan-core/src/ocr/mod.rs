//! OCR providers.
//!
//! Recognition engines sit behind [`TextRecognizer`] so extraction can be
//! driven by synthetic text in tests. Engines return positioned text boxes;
//! [`OcrResult::from_boxes`] assembles them into lines according to the
//! configured [`PageSegmentation`].

#[cfg(feature = "native")]
mod pure_engine;
#[cfg(feature = "tesseract")]
mod tesseract;

#[cfg(feature = "native")]
pub use pure_engine::PureOcrEngine;
#[cfg(feature = "tesseract")]
pub use tesseract::TesseractEngine;

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::OcrError;
use crate::models::config::{OcrBackend, OcrConfig, PageSegmentation};

/// Text recognition engine.
pub trait TextRecognizer {
    /// Engine identifier used in logs.
    fn name(&self) -> &'static str;

    /// Recognize all text in an image.
    fn recognize(&self, image: &DynamicImage) -> Result<OcrResult, OcrError>;
}

/// Create the recognizer selected by the configuration.
pub fn create_recognizer(config: &OcrConfig) -> Result<Box<dyn TextRecognizer>, OcrError> {
    debug!("Creating {} recognizer for language '{}'", config.engine, config.language);
    match config.engine {
        OcrBackend::Onnx => onnx_recognizer(config),
        OcrBackend::Tesseract => tesseract_recognizer(config),
    }
}

#[cfg(feature = "native")]
fn onnx_recognizer(config: &OcrConfig) -> Result<Box<dyn TextRecognizer>, OcrError> {
    Ok(Box::new(PureOcrEngine::from_config(config.clone())?))
}

#[cfg(not(feature = "native"))]
fn onnx_recognizer(_config: &OcrConfig) -> Result<Box<dyn TextRecognizer>, OcrError> {
    Err(OcrError::BackendUnavailable(OcrBackend::Onnx.to_string()))
}

#[cfg(feature = "tesseract")]
fn tesseract_recognizer(config: &OcrConfig) -> Result<Box<dyn TextRecognizer>, OcrError> {
    Ok(Box::new(TesseractEngine::from_config(config)))
}

#[cfg(not(feature = "tesseract"))]
fn tesseract_recognizer(_config: &OcrConfig) -> Result<Box<dyn TextRecognizer>, OcrError> {
    Err(OcrError::BackendUnavailable(OcrBackend::Tesseract.to_string()))
}

/// A recognized text box with its coordinates and content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextBox {
    /// Bounding box coordinates (x1, y1, x2, y2, x3, y3, x4, y4) for quadrilateral.
    pub bbox: [f32; 8],

    /// Recognized text content.
    pub text: String,

    /// Recognition confidence score (0.0 - 1.0).
    pub score: f32,
}

impl TextBox {
    /// Axis-aligned box from a rectangle.
    pub fn from_rect(x: f32, y: f32, width: f32, height: f32, text: impl Into<String>) -> Self {
        Self {
            bbox: [x, y, x + width, y, x + width, y + height, x, y + height],
            text: text.into(),
            score: 1.0,
        }
    }

    /// Get the center point of the bounding box.
    pub fn center(&self) -> (f32, f32) {
        let x = (self.bbox[0] + self.bbox[2] + self.bbox[4] + self.bbox[6]) / 4.0;
        let y = (self.bbox[1] + self.bbox[3] + self.bbox[5] + self.bbox[7]) / 4.0;
        (x, y)
    }

    /// Get the height of the bounding box.
    pub fn height(&self) -> f32 {
        let dx1 = self.bbox[6] - self.bbox[0];
        let dy1 = self.bbox[7] - self.bbox[1];
        (dx1 * dx1 + dy1 * dy1).sqrt()
    }

    /// Get the axis-aligned bounding rectangle.
    pub fn rect(&self) -> (f32, f32, f32, f32) {
        let xs = [self.bbox[0], self.bbox[2], self.bbox[4], self.bbox[6]];
        let ys = [self.bbox[1], self.bbox[3], self.bbox[5], self.bbox[7]];

        let min_x = xs.iter().cloned().fold(f32::INFINITY, f32::min);
        let max_x = xs.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        let min_y = ys.iter().cloned().fold(f32::INFINITY, f32::min);
        let max_y = ys.iter().cloned().fold(f32::NEG_INFINITY, f32::max);

        (min_x, min_y, max_x, max_y)
    }
}

/// Result of OCR processing on an image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrResult {
    /// Recognized text boxes (empty for engines that only return text).
    pub boxes: Vec<TextBox>,

    /// Full text, one recognized line per text line.
    pub text: String,

    /// Processing time in milliseconds.
    pub processing_time_ms: u64,

    /// Image dimensions (width, height).
    pub image_size: (u32, u32),
}

impl OcrResult {
    /// Create an empty result.
    pub fn empty(width: u32, height: u32) -> Self {
        Self {
            boxes: Vec::new(),
            text: String::new(),
            processing_time_ms: 0,
            image_size: (width, height),
        }
    }

    /// Wrap plain text produced by an engine without box output.
    pub fn from_text(text: &str, image_size: (u32, u32)) -> Self {
        Self {
            text: text.to_string(),
            ..Self::empty(image_size.0, image_size.1)
        }
    }

    /// Assemble recognized boxes into text.
    pub fn from_boxes(
        mut boxes: Vec<TextBox>,
        segmentation: PageSegmentation,
        image_size: (u32, u32),
    ) -> Self {
        let text = match segmentation {
            PageSegmentation::UniformBlock => {
                let rows = group_rows(&boxes);
                let text = rows
                    .iter()
                    .map(|row| {
                        row.iter()
                            .map(|&i| boxes[i].text.trim())
                            .filter(|t| !t.is_empty())
                            .collect::<Vec<_>>()
                            .join(" ")
                    })
                    .collect::<Vec<_>>()
                    .join("\n");
                boxes = rows.into_iter().flatten().map(|i| boxes[i].clone()).collect();
                text
            }
            PageSegmentation::SparseText => {
                sort_by_reading_order(&mut boxes);
                boxes
                    .iter()
                    .map(|b| b.text.as_str())
                    .collect::<Vec<_>>()
                    .join("\n")
            }
        };

        Self {
            boxes,
            text,
            processing_time_ms: 0,
            image_size,
        }
    }

    pub fn with_processing_time(mut self, ms: u64) -> Self {
        self.processing_time_ms = ms;
        self
    }
}

/// Sort boxes by reading order (top-to-bottom, left-to-right).
fn sort_by_reading_order(boxes: &mut [TextBox]) {
    boxes.sort_by(|a, b| {
        let (_, ay, _, _) = a.rect();
        let (_, by, _, _) = b.rect();

        // Group by approximate vertical position (within 20 pixels)
        let row_a = (ay / 20.0) as i32;
        let row_b = (by / 20.0) as i32;

        if row_a != row_b {
            row_a.cmp(&row_b)
        } else {
            let (ax, _, _, _) = a.rect();
            let (bx, _, _, _) = b.rect();
            ax.partial_cmp(&bx).unwrap_or(std::cmp::Ordering::Equal)
        }
    });
}

/// Group box indices into text rows.
///
/// A box joins the current row when its vertical center lies within half a
/// line height of the row's first box. Rows are ordered top to bottom and
/// boxes within a row left to right.
fn group_rows(boxes: &[TextBox]) -> Vec<Vec<usize>> {
    let mut order: Vec<usize> = (0..boxes.len()).collect();
    order.sort_by(|&a, &b| {
        boxes[a]
            .center()
            .1
            .partial_cmp(&boxes[b].center().1)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut rows: Vec<Vec<usize>> = Vec::new();
    let mut anchor: Option<(f32, f32)> = None;

    for i in order {
        let (_, cy) = boxes[i].center();
        let height = boxes[i].height();
        match anchor {
            Some((row_cy, row_h)) if (cy - row_cy).abs() <= row_h.max(height) / 2.0 => {
                if let Some(row) = rows.last_mut() {
                    row.push(i);
                }
            }
            _ => {
                rows.push(vec![i]);
                anchor = Some((cy, height));
            }
        }
    }

    for row in &mut rows {
        row.sort_by(|&a, &b| {
            boxes[a]
                .rect()
                .0
                .partial_cmp(&boxes[b].rect().0)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card_boxes() -> Vec<TextBox> {
        vec![
            TextBox::from_rect(120.0, 62.0, 60.0, 20.0, "Kumar"),
            TextBox::from_rect(10.0, 10.0, 200.0, 22.0, "GOVERNMENT OF INDIA"),
            TextBox::from_rect(50.0, 60.0, 60.0, 20.0, "Ravi"),
            TextBox::from_rect(50.0, 110.0, 140.0, 20.0, "1234 5678 9012"),
        ]
    }

    #[test]
    fn test_uniform_block_joins_rows() {
        let result = OcrResult::from_boxes(card_boxes(), PageSegmentation::UniformBlock, (300, 200));
        assert_eq!(result.text, "GOVERNMENT OF INDIA\nRavi Kumar\n1234 5678 9012");
        assert_eq!(result.boxes.len(), 4);
        assert_eq!(result.boxes[1].text, "Ravi");
    }

    #[test]
    fn test_sparse_text_one_box_per_line() {
        let result = OcrResult::from_boxes(card_boxes(), PageSegmentation::SparseText, (300, 200));
        assert_eq!(result.text, "GOVERNMENT OF INDIA\nRavi\nKumar\n1234 5678 9012");
    }

    #[test]
    fn test_empty_boxes() {
        let result = OcrResult::from_boxes(Vec::new(), PageSegmentation::UniformBlock, (10, 10));
        assert!(result.text.is_empty());
        assert_eq!(result.image_size, (10, 10));
    }

    #[test]
    fn test_text_box_geometry() {
        let b = TextBox::from_rect(10.0, 20.0, 30.0, 40.0, "x");
        assert_eq!(b.center(), (25.0, 40.0));
        assert_eq!(b.height(), 40.0);
        assert_eq!(b.rect(), (10.0, 20.0, 40.0, 60.0));
    }

    #[test]
    fn test_unavailable_backend_reports_name() {
        let config = OcrConfig {
            engine: OcrBackend::Tesseract,
            ..OcrConfig::default()
        };
        if cfg!(not(feature = "tesseract")) {
            let err = create_recognizer(&config).err().unwrap();
            assert!(err.to_string().contains("tesseract"));
        }
    }
}
