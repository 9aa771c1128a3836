//! Tesseract recognizer through `leptess`.

use std::io::Cursor;
use std::path::PathBuf;
use std::time::Instant;

use image::{DynamicImage, GenericImageView, ImageFormat};
use leptess::{LepTess, Variable};
use tracing::{debug, info};

use crate::error::OcrError;
use crate::models::config::{OcrConfig, PageSegmentation};

use super::{OcrResult, TextRecognizer};

/// Tesseract OCR engine.
///
/// Tesseract keeps per-image state, so a fresh handle is initialized for
/// every call.
pub struct TesseractEngine {
    language: String,
    segmentation: PageSegmentation,
    tessdata_dir: Option<PathBuf>,
}

impl TesseractEngine {
    pub fn from_config(config: &OcrConfig) -> Self {
        Self {
            language: config.language.clone(),
            segmentation: config.page_segmentation,
            tessdata_dir: config.tessdata_dir.clone(),
        }
    }

    fn init(&self) -> Result<LepTess, OcrError> {
        let datapath = self.tessdata_dir.as_deref().and_then(|p| p.to_str());
        let mut tess = LepTess::new(datapath, &self.language).map_err(|e| {
            OcrError::ModelLoad(format!(
                "failed to initialize Tesseract for '{}': {:?}",
                self.language, e
            ))
        })?;

        tess.set_variable(
            Variable::TesseditPagesegMode,
            &self.segmentation.tesseract_psm().to_string(),
        )
        .map_err(|e| OcrError::ModelLoad(format!("failed to set page segmentation: {:?}", e)))?;

        Ok(tess)
    }
}

impl TextRecognizer for TesseractEngine {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    fn recognize(&self, image: &DynamicImage) -> Result<OcrResult, OcrError> {
        let start = Instant::now();
        let (width, height) = image.dimensions();

        let mut png_bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut png_bytes), ImageFormat::Png)
            .map_err(|e| OcrError::InvalidImage(e.to_string()))?;

        let mut tess = self.init()?;
        debug!(
            "Running Tesseract (psm {}) on {}x{} image",
            self.segmentation.tesseract_psm(),
            width,
            height
        );

        tess.set_image_from_mem(&png_bytes)
            .map_err(|e| OcrError::InvalidImage(format!("{:?}", e)))?;
        let text = tess
            .get_utf8_text()
            .map_err(|e| OcrError::Recognition(format!("{:?}", e)))?;

        let result = OcrResult::from_text(&text, (width, height))
            .with_processing_time(start.elapsed().as_millis() as u64);
        info!(
            "Tesseract complete: {} chars in {}ms",
            result.text.len(),
            result.processing_time_ms
        );
        Ok(result)
    }
}
