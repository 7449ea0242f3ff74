//! Geometry and fusion algorithms for pose-annotated detections.
//!
//! Box IoU, class-aware NMS, joint assignment for known human boxes, and
//! the pose-aware merge of detector and pose-estimator output.

pub mod bbox;
pub mod fusion;
pub mod utils;

// Re-export commonly used types
pub use bbox::BBox;
pub use fusion::{FusionConfig, JointAssigner, MergeResult, MergeStats, PoseAwareDetectionMerger};
pub use utils::{class_aware_nms, class_aware_nms_preferring};
