//! Configuration structures for the scanning pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for idscan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IdScanConfig {
    /// OCR configuration.
    pub ocr: OcrConfig,

    /// Face locator configuration.
    pub face: FaceConfig,

    /// Debug output configuration.
    pub debug: DebugConfig,
}

/// OCR backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OcrBackend {
    /// PaddleOCR models run through `pure-onnx-ocr`.
    Onnx,
    /// Tesseract through `leptess`.
    Tesseract,
}

impl std::fmt::Display for OcrBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OcrBackend::Onnx => write!(f, "onnx"),
            OcrBackend::Tesseract => write!(f, "tesseract"),
        }
    }
}

/// How recognized text boxes are assembled into lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageSegmentation {
    /// Treat the page as a single uniform block of text; boxes on the same
    /// row are joined into one line (Tesseract PSM 6).
    UniformBlock,
    /// Every recognized box becomes its own line (Tesseract PSM 11).
    SparseText,
}

impl PageSegmentation {
    /// Tesseract page segmentation mode number.
    pub fn tesseract_psm(&self) -> u32 {
        match self {
            PageSegmentation::UniformBlock => 6,
            PageSegmentation::SparseText => 11,
        }
    }
}

/// OCR engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Which backend runs recognition.
    pub engine: OcrBackend,

    /// Language hint (Tesseract language code).
    pub language: String,

    /// Line assembly mode.
    pub page_segmentation: PageSegmentation,

    /// Directory containing ONNX model files.
    pub model_dir: PathBuf,

    /// Text detection model file name.
    pub detection_model: String,

    /// Keep `[UNK]` tokens emitted by the recognizer instead of blanking them.
    pub keep_unk: bool,

    /// Tesseract `tessdata` directory (system default when unset).
    pub tessdata_dir: Option<PathBuf>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            engine: OcrBackend::Onnx,
            language: "eng".to_string(),
            page_segmentation: PageSegmentation::UniformBlock,
            model_dir: PathBuf::from("models"),
            detection_model: "det.onnx".to_string(),
            keep_unk: false,
            tessdata_dir: None,
        }
    }
}

impl OcrConfig {
    /// Recognition model family for the language hint.
    ///
    /// PaddleOCR ships one recognizer per script, so every Latin-script
    /// language shares the `latin` family.
    pub fn model_family(&self) -> &str {
        match self.language.as_str() {
            "eng" | "en" | "latin" => "latin",
            other => other,
        }
    }

    /// Recognition model file name.
    pub fn recognition_model(&self) -> String {
        format!("{}_rec.onnx", self.model_family())
    }

    /// Character dictionary file name.
    pub fn dictionary(&self) -> String {
        format!("{}_dict.txt", self.model_family())
    }
}

/// Face locator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FaceConfig {
    /// OpenCV Haar cascade XML for frontal faces.
    pub cascade_path: PathBuf,

    /// Directory receiving cropped faces.
    pub output_dir: PathBuf,
}

impl Default for FaceConfig {
    fn default() -> Self {
        Self {
            cascade_path: PathBuf::from("models").join(HAAR_FRONTALFACE_FILE),
            output_dir: PathBuf::from("cropped_faces"),
        }
    }
}

/// File name of the default frontal face cascade.
pub const HAAR_FRONTALFACE_FILE: &str = "haarcascade_frontalface_default.xml";

/// Debug output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Where the raw OCR text is dumped after each extraction, if anywhere.
    pub ocr_dump_path: Option<PathBuf>,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            ocr_dump_path: Some(PathBuf::from("ocr_debug_output.txt")),
        }
    }
}

impl IdScanConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }

    /// Get full path to an OCR model file.
    pub fn model_path(&self, model_name: &str) -> PathBuf {
        self.ocr.model_dir.join(model_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = IdScanConfig::default();
        assert_eq!(config.ocr.engine, OcrBackend::Onnx);
        assert_eq!(config.ocr.language, "eng");
        assert_eq!(config.ocr.page_segmentation.tesseract_psm(), 6);
        assert_eq!(config.face.output_dir, PathBuf::from("cropped_faces"));
        assert_eq!(
            config.debug.ocr_dump_path,
            Some(PathBuf::from("ocr_debug_output.txt"))
        );
    }

    #[test]
    fn test_model_family_for_english() {
        let config = OcrConfig::default();
        assert_eq!(config.recognition_model(), "latin_rec.onnx");
        assert_eq!(config.dictionary(), "latin_dict.txt");
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: IdScanConfig =
            serde_json::from_str(r#"{"face": {"output_dir": "out"}, "ocr": {"engine": "tesseract"}}"#)
                .unwrap();
        assert_eq!(config.face.output_dir, PathBuf::from("out"));
        assert_eq!(config.ocr.engine, OcrBackend::Tesseract);
        assert_eq!(config.ocr.language, "eng");
        assert_eq!(
            config.face.cascade_path,
            PathBuf::from("models").join(HAAR_FRONTALFACE_FILE)
        );
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = IdScanConfig::default();
        config.debug.ocr_dump_path = None;
        config.save(&path).unwrap();

        let loaded = IdScanConfig::from_file(&path).unwrap();
        assert_eq!(loaded.debug.ocr_dump_path, None);
        assert_eq!(loaded.ocr.detection_model, "det.onnx");
    }
}
