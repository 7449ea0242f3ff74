//! Pose-to-box association and deduplication

pub mod assigner;
pub mod config;
pub mod merger;

pub use assigner::JointAssigner;
pub use config::FusionConfig;
pub use merger::{MergeResult, MergeStats, PoseAwareDetectionMerger};
