//! Joint assignment for known human boxes.

use crate::bbox::{BBox, iou_row};
use hoipose_core::{DefaultPose, JointScores, Joints, PoseEstimate};

/// Gives each human box the joints of its best-overlapping pose estimate,
/// or the default pose when none overlaps enough.
#[derive(Debug, Clone)]
pub struct JointAssigner<'a> {
    iou_threshold: f64,
    default_pose: &'a DefaultPose,
}

impl<'a> JointAssigner<'a> {
    pub fn new(default_pose: &'a DefaultPose, iou_threshold: f64) -> Self {
        Self {
            iou_threshold,
            default_pose,
        }
    }

    /// Index into `poses` of the estimate matched to `bbox`, if any.
    ///
    /// Candidates are estimates with IoU strictly above the threshold; the
    /// highest IoU wins and ties go to the earliest estimate.
    pub fn best_match(&self, bbox: &BBox, poses: &[PoseEstimate]) -> Option<usize> {
        let pose_boxes: Vec<BBox> = poses.iter().map(|p| BBox::from(p.bbox)).collect();
        let ious = iou_row(bbox, &pose_boxes);

        let mut best: Option<usize> = None;
        for (i, &iou) in ious.iter().enumerate() {
            if iou <= self.iou_threshold {
                continue;
            }
            if best.is_none_or(|b| iou > ious[b]) {
                best = Some(i);
            }
        }
        best
    }

    /// Joints and joint scores for one human box.
    pub fn assign(&self, bbox: &BBox, poses: &[PoseEstimate]) -> (Joints, JointScores) {
        match self.best_match(bbox, poses) {
            Some(i) => (poses[i].joints, poses[i].joints_score),
            None => (self.default_pose.joints, self.default_pose.joints_score),
        }
    }

    /// Assign every box independently; output rows follow `boxes`.
    pub fn assign_all(&self, boxes: &[BBox], poses: &[PoseEstimate]) -> (Vec<Joints>, Vec<JointScores>) {
        boxes.iter().map(|bbox| self.assign(bbox, poses)).unzip()
    }
}
