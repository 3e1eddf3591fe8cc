//! Bounding box operations and detection value types
//!
//! Core abstraction for representing and comparing detection results.

use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in image pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl BBox {
    /// Create a new bounding box
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Calculate area of the bounding box
    pub fn area(&self) -> f64 {
        (self.width * self.height) as f64
    }

    /// Exclusive right edge
    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    /// Exclusive bottom edge
    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Calculate intersection over union (IoU) with another box.
    ///
    /// Returns 0.0 for non-overlapping boxes.
    pub fn iou(&self, other: &BBox) -> f64 {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = self.right().min(other.right());
        let y2 = self.bottom().min(other.bottom());

        if x2 <= x1 || y2 <= y1 {
            return 0.0;
        }

        let intersection = ((x2 - x1) * (y2 - y1)) as f64;
        let union = self.area() + other.area() - intersection;
        if union <= 0.0 {
            return 0.0;
        }

        intersection / union
    }

    /// Check if this box overlaps another at or above the given IoU threshold
    pub fn overlaps(&self, other: &BBox, threshold: f64) -> bool {
        self.iou(other) >= threshold
    }
}

/// A scored candidate produced by the matcher, before suppression.
///
/// Many near-adjacent windows around one physical card can pass the match
/// threshold; these are resolved by non-maximum suppression downstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawMatch {
    /// Two-character rank+suit card code, e.g. "As" or "2c"
    pub code: String,
    /// Normalized cross-correlation score in [-1, 1]
    pub score: f64,
    pub bbox: BBox,
}

impl RawMatch {
    pub fn new(code: impl Into<String>, score: f64, bbox: BBox) -> Self {
        Self {
            code: code.into(),
            score,
            bbox,
        }
    }
}

/// A match that survived suppression: one detection per physical card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub code: String,
    pub bbox: BBox,
}

impl Detection {
    pub fn new(code: impl Into<String>, bbox: BBox) -> Self {
        Self {
            code: code.into(),
            bbox,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bbox_iou_partial_overlap() {
        let box1 = BBox::new(0, 0, 10, 10);
        let box2 = BBox::new(5, 5, 10, 10);

        let iou = box1.iou(&box2);
        assert!(iou > 0.0 && iou < 1.0);
        // 25 / (100 + 100 - 25)
        assert!((iou - 25.0 / 175.0).abs() < 1e-9);
    }

    #[test]
    fn test_bbox_iou_disjoint_is_zero() {
        let box1 = BBox::new(0, 0, 10, 10);
        let box2 = BBox::new(100, 100, 10, 10);
        assert_eq!(box1.iou(&box2), 0.0);
    }

    #[test]
    fn test_bbox_iou_touching_edges_is_zero() {
        let box1 = BBox::new(0, 0, 10, 10);
        let box2 = BBox::new(10, 0, 10, 10);
        assert_eq!(box1.iou(&box2), 0.0);
    }

    #[test]
    fn test_bbox_iou_identical_is_one() {
        let b = BBox::new(3, 7, 40, 40);
        assert!((b.iou(&b) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_iou_is_symmetric() {
        let box1 = BBox::new(0, 0, 20, 10);
        let box2 = BBox::new(5, 2, 12, 30);
        assert_eq!(box1.iou(&box2), box2.iou(&box1));
    }
}
