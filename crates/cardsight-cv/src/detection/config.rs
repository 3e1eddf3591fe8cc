//! Detection pipeline configuration

use serde::{Deserialize, Serialize};

use crate::nms::DEFAULT_IOU_THRESHOLD;
use crate::template::matcher::DEFAULT_MATCH_THRESHOLD;

/// Thresholds for one detection pass
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Minimum correlation score for a window to become a raw match
    pub match_threshold: f64,
    /// IoU at which overlapping raw matches are merged into one detection
    pub nms_threshold: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            match_threshold: DEFAULT_MATCH_THRESHOLD,
            nms_threshold: DEFAULT_IOU_THRESHOLD,
        }
    }
}
