//! Data model for pose-annotated human-object-interaction detections.
//!
//! Holds the record schemas, joint types, and error type shared by the
//! fusion algorithms in `hoipose-cv` and the batch CLI.

pub mod error;
pub mod io;
pub mod pose;
pub mod records;

pub use error::{FusionError, Result};
pub use pose::{DefaultPose, JointScores, Joints, NUM_JOINTS, PoseEstimate};
pub use records::{AnnotatedDetection, DetectionSet, GroundTruthAnnotation, GroundTruthFile};
