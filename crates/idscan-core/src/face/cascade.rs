//! OpenCV Haar cascade classifier.
//!
//! Loads cascades in the `opencv-cascade-classifier` XML format (the format of
//! the `haarcascade_*.xml` files shipped with OpenCV 3 and later) and runs
//! multi-scale sliding-window detection over a grayscale image.

use std::path::Path;

use image::imageops::{self, FilterType};
use image::GrayImage;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::FaceError;
use crate::models::region::FaceRegion;

use super::grouping::{cv_round, group_rectangles, Rect, GROUP_EPS};
use super::integral::IntegralImage;
use super::{DetectionParams, FaceDetector};

#[derive(Debug, Deserialize)]
struct RawStorage {
    cascade: RawCascade,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCascade {
    stage_type: String,
    feature_type: String,
    height: String,
    width: String,
    stages: RawList<RawStage>,
    features: RawList<RawFeature>,
}

/// OpenCV writes sequences as repeated `<_>` children.
#[derive(Debug, Deserialize)]
struct RawList<T> {
    #[serde(rename = "_", default = "Vec::new")]
    items: Vec<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawStage {
    stage_threshold: String,
    weak_classifiers: RawList<RawWeakClassifier>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawWeakClassifier {
    internal_nodes: String,
    leaf_values: String,
}

#[derive(Debug, Deserialize)]
struct RawFeature {
    rects: RawList<String>,
    #[serde(default)]
    tilted: Option<String>,
}

#[derive(Debug, Clone, Copy)]
struct Node {
    left: i32,
    right: i32,
    feature: usize,
    threshold: f64,
}

#[derive(Debug, Clone)]
struct Tree {
    nodes: Vec<Node>,
    leaves: Vec<f64>,
}

#[derive(Debug, Clone)]
struct Stage {
    threshold: f64,
    trees: Vec<Tree>,
}

#[derive(Debug, Clone, Copy)]
struct WeightedRect {
    x: u32,
    y: u32,
    width: u32,
    height: u32,
    weight: f64,
}

#[derive(Debug, Clone)]
struct Feature {
    rects: Vec<WeightedRect>,
}

impl Feature {
    fn value(&self, ii: &IntegralImage, x: u32, y: u32) -> f64 {
        self.rects
            .iter()
            .map(|r| r.weight * ii.rect_sum(x + r.x, y + r.y, r.width, r.height))
            .sum()
    }
}

/// Boosted Haar cascade.
#[derive(Debug, Clone)]
pub struct HaarCascade {
    width: u32,
    height: u32,
    stages: Vec<Stage>,
    features: Vec<Feature>,
}

impl HaarCascade {
    /// Load a cascade from an XML file.
    pub fn from_file(path: &Path) -> Result<Self, FaceError> {
        let xml = std::fs::read_to_string(path)?;
        let cascade = Self::from_xml_str(&xml)?;
        info!(
            "Loaded Haar cascade from {} ({} stages, {} features, {}x{} window)",
            path.display(),
            cascade.stages.len(),
            cascade.features.len(),
            cascade.width,
            cascade.height
        );
        Ok(cascade)
    }

    /// Parse a cascade from XML text.
    pub fn from_xml_str(xml: &str) -> Result<Self, FaceError> {
        let raw: RawStorage = quick_xml::de::from_str(xml)
            .map_err(|e| FaceError::Cascade(format!("malformed cascade XML: {}", e)))?;
        let raw = raw.cascade;

        if raw.stage_type.trim() != "BOOST" {
            return Err(FaceError::Cascade(format!(
                "unsupported stage type '{}'",
                raw.stage_type.trim()
            )));
        }
        if raw.feature_type.trim() != "HAAR" {
            return Err(FaceError::Cascade(format!(
                "unsupported feature type '{}'",
                raw.feature_type.trim()
            )));
        }

        let width: u32 = parse_number(&raw.width, "width")?;
        let height: u32 = parse_number(&raw.height, "height")?;
        if width < 3 || height < 3 {
            return Err(FaceError::Cascade(format!(
                "window {}x{} is too small",
                width, height
            )));
        }
        if (width - 2).checked_mul(height - 2).is_none() {
            return Err(FaceError::Cascade(format!(
                "window {}x{} is too large",
                width, height
            )));
        }

        let features = raw
            .features
            .items
            .iter()
            .map(|f| parse_feature(f, width, height))
            .collect::<Result<Vec<_>, _>>()?;

        let stages = raw
            .stages
            .items
            .iter()
            .map(|s| parse_stage(s, features.len()))
            .collect::<Result<Vec<_>, _>>()?;

        if stages.is_empty() {
            return Err(FaceError::Cascade("cascade has no stages".to_string()));
        }

        Ok(Self {
            width,
            height,
            stages,
            features,
        })
    }

    /// Detection window size (width, height) at scale 1.
    pub fn window_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Raw detections before grouping, in image coordinates.
    fn scan(&self, gray: &GrayImage, scale_factor: f64) -> Vec<Rect> {
        let (img_w, img_h) = gray.dimensions();
        let mut hits = Vec::new();
        let mut factor = 1.0f64;

        loop {
            let win_w = cv_round(self.width as f64 * factor);
            let win_h = cv_round(self.height as f64 * factor);
            let scaled_w = cv_round(img_w as f64 / factor);
            let scaled_h = cv_round(img_h as f64 / factor);

            let range_w = scaled_w - self.width as i64;
            let range_h = scaled_h - self.height as i64;
            if range_w <= 0 || range_h <= 0 {
                break;
            }
            if win_w > img_w as i64 || win_h > img_h as i64 {
                break;
            }

            let scaled = if factor == 1.0 {
                gray.clone()
            } else {
                imageops::resize(gray, scaled_w as u32, scaled_h as u32, FilterType::Triangle)
            };
            let ii = IntegralImage::new(&scaled);
            let step = if factor > 2.0 { 1 } else { 2 };
            let before = hits.len();

            let mut y = 0;
            while y < range_h {
                let mut x = 0;
                while x < range_w {
                    let result = self.run_at(&ii, x as u32, y as u32);
                    if result > 0 {
                        hits.push(Rect::new(
                            cv_round(x as f64 * factor),
                            cv_round(y as f64 * factor),
                            win_w,
                            win_h,
                        ));
                    }
                    if result == 0 {
                        x += step;
                    }
                    x += step;
                }
                y += step;
            }

            debug!(
                "Scale {:.3}: {}x{} image, {} hits",
                factor,
                scaled_w,
                scaled_h,
                hits.len() - before
            );

            factor *= scale_factor;
        }

        hits
    }

    /// Evaluate the cascade at one window position.
    ///
    /// Returns 1 when every stage passes, otherwise minus the index of the
    /// rejecting stage (so 0 means rejected by the first stage).
    fn run_at(&self, ii: &IntegralImage, x: u32, y: u32) -> i32 {
        let area = ((self.width - 2) * (self.height - 2)) as f64;
        let sum = ii.rect_sum(x + 1, y + 1, self.width - 2, self.height - 2);
        let sqsum = ii.rect_sq_sum(x + 1, y + 1, self.width - 2, self.height - 2);
        let nf = area * sqsum - sum * sum;
        let nf = if nf > 0.0 { nf.sqrt() } else { 1.0 };

        for (index, stage) in self.stages.iter().enumerate() {
            let mut total = 0.0;
            for tree in &stage.trees {
                let mut idx = 0i32;
                loop {
                    let node = &tree.nodes[idx as usize];
                    let value = self.features[node.feature].value(ii, x, y) / nf;
                    idx = if value < node.threshold {
                        node.left
                    } else {
                        node.right
                    };
                    if idx <= 0 {
                        break;
                    }
                }
                total += tree.leaves[(-idx) as usize];
            }
            if total < stage.threshold {
                return -(index as i32);
            }
        }
        1
    }
}

impl FaceDetector for HaarCascade {
    fn detect(
        &self,
        gray: &GrayImage,
        params: &DetectionParams,
    ) -> Result<Vec<FaceRegion>, FaceError> {
        params.validate()?;

        let hits = self.scan(gray, params.scale_factor);
        let grouped = group_rectangles(&hits, params.min_neighbors as i32, GROUP_EPS);
        debug!("{} raw hits grouped into {} faces", hits.len(), grouped.len());

        let (img_w, img_h) = gray.dimensions();
        Ok(grouped
            .iter()
            .filter_map(|r| FaceRegion::clipped(r.x, r.y, r.width, r.height, img_w, img_h))
            .collect())
    }
}

fn parse_number<T: std::str::FromStr>(text: &str, what: &str) -> Result<T, FaceError> {
    text.trim()
        .parse()
        .map_err(|_| FaceError::Cascade(format!("invalid {} '{}'", what, text.trim())))
}

fn parse_feature(raw: &RawFeature, width: u32, height: u32) -> Result<Feature, FaceError> {
    if let Some(tilted) = &raw.tilted {
        if parse_number::<i32>(tilted, "tilted flag")? != 0 {
            return Err(FaceError::Cascade(
                "tilted features are not supported".to_string(),
            ));
        }
    }

    let rects = raw
        .rects
        .items
        .iter()
        .map(|text| {
            let parts: Vec<&str> = text.split_whitespace().collect();
            if parts.len() != 5 {
                return Err(FaceError::Cascade(format!("invalid feature rect '{}'", text.trim())));
            }
            let rect = WeightedRect {
                x: parse_number(parts[0], "rect x")?,
                y: parse_number(parts[1], "rect y")?,
                width: parse_number(parts[2], "rect width")?,
                height: parse_number(parts[3], "rect height")?,
                weight: parse_number(parts[4], "rect weight")?,
            };
            let within = |start: u32, len: u32, limit: u32| {
                start.checked_add(len).is_some_and(|end| end <= limit)
            };
            if !within(rect.x, rect.width, width) || !within(rect.y, rect.height, height) {
                return Err(FaceError::Cascade(format!(
                    "feature rect '{}' exceeds the window",
                    text.trim()
                )));
            }
            Ok(rect)
        })
        .collect::<Result<Vec<_>, _>>()?;

    if rects.is_empty() {
        return Err(FaceError::Cascade("feature without rects".to_string()));
    }
    Ok(Feature { rects })
}

fn parse_stage(raw: &RawStage, feature_count: usize) -> Result<Stage, FaceError> {
    let trees = raw
        .weak_classifiers
        .items
        .iter()
        .map(|w| parse_tree(w, feature_count))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Stage {
        threshold: parse_number(&raw.stage_threshold, "stage threshold")?,
        trees,
    })
}

/// Parse a weak classifier. Node indices must point forward so evaluation
/// always terminates at a leaf.
fn parse_tree(raw: &RawWeakClassifier, feature_count: usize) -> Result<Tree, FaceError> {
    let tokens: Vec<&str> = raw.internal_nodes.split_whitespace().collect();
    if tokens.is_empty() || tokens.len() % 4 != 0 {
        return Err(FaceError::Cascade(format!(
            "invalid internal nodes '{}'",
            raw.internal_nodes.trim()
        )));
    }

    let nodes = tokens
        .chunks(4)
        .map(|chunk| {
            Ok(Node {
                left: parse_number(chunk[0], "node child")?,
                right: parse_number(chunk[1], "node child")?,
                feature: parse_number(chunk[2], "feature index")?,
                threshold: parse_number(chunk[3], "node threshold")?,
            })
        })
        .collect::<Result<Vec<_>, FaceError>>()?;

    let leaves = raw
        .leaf_values
        .split_whitespace()
        .map(|v| parse_number(v, "leaf value"))
        .collect::<Result<Vec<f64>, _>>()?;

    for (i, node) in nodes.iter().enumerate() {
        if node.feature >= feature_count {
            return Err(FaceError::Cascade(format!(
                "feature index {} out of range ({} features)",
                node.feature, feature_count
            )));
        }
        for child in [node.left, node.right] {
            let valid = if child > 0 {
                (child as usize) > i && (child as usize) < nodes.len()
            } else {
                ((-child) as usize) < leaves.len()
            };
            if !valid {
                return Err(FaceError::Cascade(format!("invalid tree child index {}", child)));
            }
        }
    }

    Ok(Tree { nodes, leaves })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    /// 6x6 cascade with one stump that fires on a dark-above-bright edge.
    const EDGE_CASCADE: &str = r#"<?xml version="1.0"?>
<opencv_storage>
<cascade type_id="opencv-cascade-classifier"><stageType>BOOST</stageType>
  <featureType>HAAR</featureType>
  <height>6</height>
  <width>6</width>
  <stageParams>
    <maxWeakCount>1</maxWeakCount></stageParams>
  <featureParams>
    <maxCatCount>0</maxCatCount></featureParams>
  <stageNum>1</stageNum>
  <stages>
    <!-- stage 0 -->
    <_>
      <maxWeakCount>1</maxWeakCount>
      <stageThreshold>0.</stageThreshold>
      <weakClassifiers>
        <_>
          <internalNodes>
            0 -1 0 5.0000000000000000e-01</internalNodes>
          <leafValues>
            -1. 1.</leafValues></_></weakClassifiers></_></stages>
  <features>
    <_>
      <rects>
        <_>
          0 0 6 3 -1.</_>
        <_>
          0 3 6 3 1.</_></rects></_></features></cascade>
</opencv_storage>
"#;

    fn edge_image() -> GrayImage {
        GrayImage::from_fn(40, 40, |_, y| if y < 20 { Luma([0]) } else { Luma([255]) })
    }

    fn raw_params() -> DetectionParams {
        // Only scale 1 fits, and no grouping
        DetectionParams {
            scale_factor: 10.0,
            min_neighbors: 0,
        }
    }

    #[test]
    fn test_parse_cascade() {
        let cascade = HaarCascade::from_xml_str(EDGE_CASCADE).unwrap();
        assert_eq!(cascade.window_size(), (6, 6));
        assert_eq!(cascade.stage_count(), 1);
        assert_eq!(cascade.features.len(), 1);
        assert_eq!(cascade.features[0].rects[1].weight, 1.0);
    }

    #[test]
    fn test_detects_only_edge_windows() {
        let cascade = HaarCascade::from_xml_str(EDGE_CASCADE).unwrap();
        let regions = cascade.detect(&edge_image(), &raw_params()).unwrap();

        assert!(!regions.is_empty());
        for r in &regions {
            assert_eq!((r.width, r.height), (6, 6));
            assert!(r.y < 20 && r.y + r.height > 20, "{} misses the edge", r);
        }
    }

    #[test]
    fn test_uniform_image_has_no_detections() {
        let cascade = HaarCascade::from_xml_str(EDGE_CASCADE).unwrap();
        let gray = GrayImage::from_pixel(40, 40, Luma([128]));
        assert!(cascade.detect(&gray, &raw_params()).unwrap().is_empty());
        assert!(cascade
            .detect(&gray, &DetectionParams::default())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_image_smaller_than_window() {
        let cascade = HaarCascade::from_xml_str(EDGE_CASCADE).unwrap();
        let gray = GrayImage::from_pixel(5, 5, Luma([0]));
        assert!(cascade.detect(&gray, &raw_params()).unwrap().is_empty());
    }

    #[test]
    fn test_first_stage_rejection_is_zero() {
        let cascade = HaarCascade::from_xml_str(EDGE_CASCADE).unwrap();
        let ii = IntegralImage::new(&edge_image());
        assert_eq!(cascade.run_at(&ii, 0, 0), 0);
        assert_eq!(cascade.run_at(&ii, 0, 16), 1);
    }

    #[test]
    fn test_rejects_unsupported_cascades() {
        let lbp = EDGE_CASCADE.replace("<featureType>HAAR", "<featureType>LBP");
        assert!(matches!(
            HaarCascade::from_xml_str(&lbp),
            Err(FaceError::Cascade(_))
        ));

        let tilted = EDGE_CASCADE.replace("</rects></_>", "</rects>\n      <tilted>1</tilted></_>");
        let err = HaarCascade::from_xml_str(&tilted).unwrap_err();
        assert!(err.to_string().contains("tilted"));

        let bad_index = EDGE_CASCADE.replace("0 -1 0 5.0", "0 -1 3 5.0");
        assert!(HaarCascade::from_xml_str(&bad_index).is_err());

        assert!(HaarCascade::from_xml_str("<opencv_storage/>").is_err());
    }

    #[test]
    fn test_rejects_overflowing_geometry() {
        let huge_window = EDGE_CASCADE
            .replace("<height>6</height>", "<height>70000</height>")
            .replace("<width>6</width>", "<width>70000</width>");
        let err = HaarCascade::from_xml_str(&huge_window).unwrap_err();
        assert!(err.to_string().contains("too large"));

        let far_rect = EDGE_CASCADE.replace("0 0 6 3 -1.", "4294967295 0 6 3 -1.");
        let err = HaarCascade::from_xml_str(&far_rect).unwrap_err();
        assert!(err.to_string().contains("exceeds the window"));
    }

    #[test]
    fn test_invalid_scale_factor() {
        let cascade = HaarCascade::from_xml_str(EDGE_CASCADE).unwrap();
        let params = DetectionParams {
            scale_factor: 1.0,
            min_neighbors: 5,
        };
        assert!(matches!(
            cascade.detect(&edge_image(), &params),
            Err(FaceError::InvalidParams(_))
        ));
    }
}
