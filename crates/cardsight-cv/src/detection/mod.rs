//! High-level detection pipeline

pub mod config;
pub mod detector;

pub use config::DetectorConfig;
pub use detector::{CardDetector, DetectionResult};
