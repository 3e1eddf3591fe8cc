//! Card detector: match, suppress, classify

use image::DynamicImage;
use log::debug;
use serde::Serialize;

use super::config::DetectorConfig;
use crate::bbox::Detection;
use crate::nms::suppress;
use crate::rows::split_rows;
use crate::template::{CorrelationMatcher, SharedCatalog, TemplateMatch};

/// Structured output of one detection pass, consumed by the decision
/// collaborator.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DetectionResult {
    /// Hero hole card codes, left to right
    pub hero_cards: Vec<String>,
    /// Board card codes, left to right
    pub board_cards: Vec<String>,
    /// Every detection that survived suppression, with its box
    pub raw_detections: Vec<Detection>,
}

/// Synchronous single-pass detector over pre-decoded screenshots.
///
/// Capture is the caller's problem; passing a decoded image keeps I/O
/// latency and acquisition failures out of the detection core. The catalog
/// handle may be shared across concurrent passes and reloaded between them.
pub struct CardDetector<M: TemplateMatch = CorrelationMatcher> {
    catalog: SharedCatalog,
    matcher: M,
    config: DetectorConfig,
}

impl CardDetector<CorrelationMatcher> {
    pub fn new(catalog: SharedCatalog, config: DetectorConfig) -> Self {
        Self::with_matcher(catalog, CorrelationMatcher::new(), config)
    }
}

impl<M: TemplateMatch> CardDetector<M> {
    pub fn with_matcher(catalog: SharedCatalog, matcher: M, config: DetectorConfig) -> Self {
        Self {
            catalog,
            matcher,
            config,
        }
    }

    pub fn catalog(&self) -> &SharedCatalog {
        &self.catalog
    }

    /// Run match -> suppress -> row split on one screenshot.
    ///
    /// An empty catalog degrades to an empty result; it is not an error.
    pub fn detect(&self, image: &DynamicImage) -> DetectionResult {
        let gray = image.to_luma8();
        let catalog = self.catalog.get();

        let raw = self
            .matcher
            .find_matches(&gray, &catalog, self.config.match_threshold);
        debug!(
            "{} raw matches across {} templates",
            raw.len(),
            catalog.len()
        );

        // Suppression is the synchronization barrier: every per-template
        // match for this image is in `raw` before it runs.
        let detections = suppress(raw, self.config.nms_threshold);
        let rows = split_rows(&detections);

        DetectionResult {
            hero_cards: rows.hero_codes,
            board_cards: rows.board_codes,
            raw_detections: detections,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::{Template, TemplateCatalog};
    use image::{GrayImage, Luma};

    // Noise glyphs: decorrelated between seeds and across shifts, so each
    // template matches exactly its own position.
    fn glyph(seed: u32, w: u32, h: u32) -> GrayImage {
        GrayImage::from_fn(w, h, |x, y| {
            let mut v = x.wrapping_mul(0x9E37_79B1)
                ^ y.wrapping_mul(0x85EB_CA77)
                ^ seed.wrapping_mul(0xC2B2_AE35);
            v ^= v >> 15;
            v = v.wrapping_mul(0x2545_F491);
            v ^= v >> 13;
            Luma([(v & 0xFF) as u8])
        })
    }

    fn scene_with(cards: &[(&str, u32, i64, i64)]) -> (DynamicImage, SharedCatalog) {
        let mut img = GrayImage::from_pixel(400, 300, Luma([40u8]));
        let mut templates = Vec::new();
        for &(code, seed, x, y) in cards {
            let g = glyph(seed, 24, 24);
            image::imageops::replace(&mut img, &g, x, y);
            templates.push(Template::new(code, g));
        }
        let catalog = SharedCatalog::new(TemplateCatalog::from_templates(templates));
        (DynamicImage::ImageLuma8(img), catalog)
    }

    #[test]
    fn test_empty_catalog_gives_empty_result() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(100, 100, Luma([40u8])));
        let detector = CardDetector::new(
            SharedCatalog::new(TemplateCatalog::default()),
            DetectorConfig::default(),
        );
        let result = detector.detect(&img);
        assert!(result.hero_cards.is_empty());
        assert!(result.board_cards.is_empty());
        assert!(result.raw_detections.is_empty());
    }

    #[test]
    fn test_full_pipeline_rows_and_order() {
        // Three board cards up top, two hero cards below
        let (img, catalog) = scene_with(&[
            ("2c", 10, 60, 40),
            ("7h", 60, 120, 40),
            ("Jh", 110, 180, 40),
            ("As", 160, 100, 200),
            ("Kd", 210, 160, 200),
        ]);
        let detector = CardDetector::new(catalog, DetectorConfig::default());
        let result = detector.detect(&img);

        assert_eq!(result.board_cards, vec!["2c", "7h", "Jh"]);
        assert_eq!(result.hero_cards, vec!["As", "Kd"]);
        assert_eq!(result.raw_detections.len(), 5);
    }

    #[test]
    fn test_disabled_matcher_pipeline_is_empty() {
        let (img, catalog) = scene_with(&[("As", 10, 50, 50)]);
        let detector = CardDetector::with_matcher(
            catalog,
            crate::template::DisabledMatcher,
            DetectorConfig::default(),
        );
        let result = detector.detect(&img);
        assert!(result.raw_detections.is_empty());
    }
}
