//! Per-image JSON records read and written by the pipeline.

pub mod annotation;
pub mod detection;

pub use annotation::{GroundTruthAnnotation, GroundTruthFile};
pub use detection::{AnnotatedDetection, DetectionRecord, DetectionSet};
