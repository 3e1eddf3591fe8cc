//! Cardsight Computer Vision Library
//!
//! Detects and localizes playing-card glyphs in table screenshots and
//! turns raw correlation matches into an ordered, deduplicated description
//! of which cards belong to which player area.

pub mod bbox;
pub mod calibration;
pub mod capture;
pub mod config;
pub mod detection;
pub mod nms;
pub mod regions;
pub mod rows;
pub mod template;

// Re-export commonly used types
pub use bbox::{BBox, Detection, RawMatch};
pub use calibration::{CalibrationError, CornerCrop, SlotGeometry};
pub use capture::{CaptureError, FrameSource};
pub use config::VisionConfig;
pub use detection::{CardDetector, DetectionResult, DetectorConfig};
pub use regions::{Region, ResolvedRegions, UiProbe, resolve_regions};
pub use rows::RowSplit;
pub use template::{SharedCatalog, TemplateCatalog, TemplateMatch};

// Error handling
pub type Result<T> = anyhow::Result<T>;
