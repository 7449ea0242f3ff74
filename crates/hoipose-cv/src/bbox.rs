//! Axis-aligned boxes and intersection-over-union.

use serde::{Deserialize, Serialize};

/// Box in pixel corner coordinates, `[x1, y1, x2, y2]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct BBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl BBox {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }

    /// Area; zero for degenerate or inverted boxes.
    pub fn area(&self) -> f64 {
        self.width().max(0.0) * self.height().max(0.0)
    }

    pub fn is_degenerate(&self) -> bool {
        self.area() <= 0.0
    }

    /// Intersection over union with another box.
    ///
    /// A degenerate box has IoU 0 against anything, itself included.
    pub fn iou(&self, other: &BBox) -> f64 {
        let w = (self.x2.min(other.x2) - self.x1.max(other.x1)).max(0.0);
        let h = (self.y2.min(other.y2) - self.y1.max(other.y1)).max(0.0);
        let intersection = w * h;
        let union = self.area() + other.area() - intersection;

        if union <= 0.0 || intersection <= 0.0 {
            return 0.0;
        }
        intersection / union
    }

    /// Check if the overlap with `other` is strictly above `threshold`.
    pub fn overlaps(&self, other: &BBox, threshold: f64) -> bool {
        self.iou(other) > threshold
    }

    pub fn to_array(self) -> [f64; 4] {
        [self.x1, self.y1, self.x2, self.y2]
    }
}

impl From<[f64; 4]> for BBox {
    fn from([x1, y1, x2, y2]: [f64; 4]) -> Self {
        Self::new(x1, y1, x2, y2)
    }
}

impl From<BBox> for [f64; 4] {
    fn from(bbox: BBox) -> Self {
        bbox.to_array()
    }
}

/// IoU of `bbox` against each box in `others`, in order.
pub fn iou_row(bbox: &BBox, others: &[BBox]) -> Vec<f64> {
    others.iter().map(|other| bbox.iou(other)).collect()
}
