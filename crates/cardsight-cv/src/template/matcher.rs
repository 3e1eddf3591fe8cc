//! Normalized cross-correlation template matching

use image::GrayImage;

use super::{Template, TemplateCatalog};
use crate::bbox::{BBox, RawMatch};

/// Default minimum correlation score for a window to count as a match
pub const DEFAULT_MATCH_THRESHOLD: f64 = 0.8;

/// Trait for template matching backends.
///
/// Matching order across templates is unspecified; implementations are free
/// to parallelize per-template since there is no shared mutable state.
pub trait TemplateMatch {
    fn find_matches(
        &self,
        image: &GrayImage,
        catalog: &TemplateCatalog,
        threshold: f64,
    ) -> Vec<RawMatch>;
}

/// Zero-mean normalized cross-correlation matcher.
///
/// Scores every equally-sized window of the target against each template;
/// the score is invariant to uniform brightness shifts, which is what the
/// corner glyphs need across table themes.
#[derive(Debug, Clone, Copy, Default)]
pub struct CorrelationMatcher;

impl CorrelationMatcher {
    pub fn new() -> Self {
        Self
    }

    /// Scan one template across the image, emitting every window at or
    /// above `threshold`. A template larger than the image in either
    /// dimension produces no matches.
    fn match_one(image: &GrayImage, template: &Template, threshold: f64) -> Vec<RawMatch> {
        let (iw, ih) = image.dimensions();
        let (tw, th) = template.pixels.dimensions();
        if tw == 0 || th == 0 || tw > iw || th > ih {
            return Vec::new();
        }

        let n = (tw as f64) * (th as f64);
        let tpix: Vec<f64> = template.pixels.as_raw().iter().map(|&p| p as f64).collect();
        let tmean = tpix.iter().sum::<f64>() / n;
        let tzero: Vec<f64> = tpix.iter().map(|v| v - tmean).collect();
        let tnorm_sq: f64 = tzero.iter().map(|v| v * v).sum();
        // A flat template correlates with nothing
        if tnorm_sq <= 0.0 {
            return Vec::new();
        }

        let rows: Vec<&[u8]> = image
            .as_raw()
            .chunks_exact(iw as usize)
            .collect();

        let mut matches = Vec::new();
        for y in 0..=(ih - th) {
            for x in 0..=(iw - tw) {
                let score = Self::window_score(&rows, x as usize, y as usize, tw as usize, th as usize, &tzero, tnorm_sq, n);
                if score >= threshold {
                    matches.push(RawMatch::new(
                        template.code.clone(),
                        score,
                        BBox::new(x as i32, y as i32, tw as i32, th as i32),
                    ));
                }
            }
        }
        matches
    }

    #[allow(clippy::too_many_arguments)]
    fn window_score(
        rows: &[&[u8]],
        x: usize,
        y: usize,
        tw: usize,
        th: usize,
        tzero: &[f64],
        tnorm_sq: f64,
        n: f64,
    ) -> f64 {
        let mut sum = 0.0;
        for ty in 0..th {
            for &p in &rows[y + ty][x..x + tw] {
                sum += p as f64;
            }
        }
        let wmean = sum / n;

        let mut num = 0.0;
        let mut wnorm_sq = 0.0;
        let mut i = 0;
        for ty in 0..th {
            for &p in &rows[y + ty][x..x + tw] {
                let wv = p as f64 - wmean;
                num += wv * tzero[i];
                wnorm_sq += wv * wv;
                i += 1;
            }
        }

        // Zero-variance window: no signal to correlate against
        if wnorm_sq <= 0.0 {
            return 0.0;
        }
        num / (tnorm_sq * wnorm_sq).sqrt()
    }
}

impl TemplateMatch for CorrelationMatcher {
    fn find_matches(
        &self,
        image: &GrayImage,
        catalog: &TemplateCatalog,
        threshold: f64,
    ) -> Vec<RawMatch> {
        let mut all_matches = Vec::new();

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            let per_template: Vec<Vec<RawMatch>> = catalog
                .entries()
                .par_iter()
                .map(|template| Self::match_one(image, template, threshold))
                .collect();
            for matches in per_template {
                all_matches.extend(matches);
            }
        }

        #[cfg(not(feature = "parallel"))]
        {
            for template in catalog.entries() {
                all_matches.extend(Self::match_one(image, template, threshold));
            }
        }

        all_matches
    }
}

/// Matching backend for environments with no usable image pipeline:
/// deterministically reports nothing instead of failing at call sites.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledMatcher;

impl TemplateMatch for DisabledMatcher {
    fn find_matches(
        &self,
        _image: &GrayImage,
        _catalog: &TemplateCatalog,
        _threshold: f64,
    ) -> Vec<RawMatch> {
        Vec::new()
    }
}
