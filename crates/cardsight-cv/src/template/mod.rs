//! Card template catalog and correlation matcher

pub mod catalog;
pub mod matcher;

pub use catalog::{SharedCatalog, TemplateCatalog};
pub use matcher::{CorrelationMatcher, DisabledMatcher, TemplateMatch};

use image::GrayImage;

/// A single card signature: grayscale corner glyph keyed by card code
#[derive(Debug, Clone)]
pub struct Template {
    /// Two-character rank+suit identifier taken from the filename stem
    pub code: String,
    pub pixels: GrayImage,
}

impl Template {
    pub fn new(code: impl Into<String>, pixels: GrayImage) -> Self {
        Self {
            code: code.into(),
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }
}
