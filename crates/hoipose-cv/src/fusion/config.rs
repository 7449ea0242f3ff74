//! Fusion configuration

use hoipose_core::io::read_json;
use hoipose_core::{FusionError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Human class id in the HICO-DET label space.
pub const HICODET_HUMAN_ID: i64 = 49;
/// Human class id in the V-COCO label space.
pub const VCOCO_HUMAN_ID: i64 = 1;

/// Thresholds and label constants for joint assignment and merging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    /// Label value identifying "person" in the detector's label space.
    pub human_class_id: i64,
    /// A pose estimate matches a box only with IoU strictly above this.
    pub assign_iou_threshold: f64,
    /// NMS suppresses a box with IoU strictly above this.
    pub nms_iou_threshold: f64,
    /// Added to pose scores when ranking for NMS. At least 1.0, so a pose
    /// row outranks any plain row.
    pub pose_score_boost: f64,
    pub min_human_score: Option<f64>,
    pub min_object_score: Option<f64>,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self::hicodet()
    }
}

impl FusionConfig {
    pub fn hicodet() -> Self {
        Self {
            human_class_id: HICODET_HUMAN_ID,
            assign_iou_threshold: 0.5,
            nms_iou_threshold: 0.5,
            pose_score_boost: 1.0,
            min_human_score: None,
            min_object_score: None,
        }
    }

    pub fn vcoco() -> Self {
        Self {
            human_class_id: VCOCO_HUMAN_ID,
            ..Self::hicodet()
        }
    }

    /// Load from a JSON file; absent fields take the HICO-DET defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let config: Self = read_json(path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("assign_iou_threshold", self.assign_iou_threshold),
            ("nms_iou_threshold", self.nms_iou_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(FusionError::InvalidConfig(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }

        if self.pose_score_boost.is_nan() || self.pose_score_boost < 1.0 {
            return Err(FusionError::InvalidConfig(format!(
                "pose_score_boost must be at least 1.0, got {}",
                self.pose_score_boost
            )));
        }

        Ok(())
    }

    /// Whether a post-merge score filter is configured.
    pub fn has_score_filter(&self) -> bool {
        self.min_human_score.is_some() || self.min_object_score.is_some()
    }
}
