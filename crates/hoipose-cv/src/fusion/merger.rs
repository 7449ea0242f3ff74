//! Merge detector output with pose-estimator output.
//!
//! Human boxes come from two populations: the detector's own human boxes
//! ("plain" rows, no joints) and the pose estimator's boxes ("pose" rows).
//! Both go through one NMS pass in which pose rows are ranked by
//! `score + boost`, so a pose row always wins over a plain row it overlaps.
//! Object boxes pass through untouched.

use super::config::FusionConfig;
use crate::bbox::BBox;
use crate::utils::class_aware_nms_preferring;
use hoipose_core::{AnnotatedDetection, DefaultPose, DetectionSet, FusionError, PoseEstimate, Result};
use serde::Serialize;
use std::ops::AddAssign;
use tracing::debug;

/// Counts describing one merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeStats {
    /// Detector human boxes that survived NMS.
    pub plain_kept: usize,
    /// Pose boxes that survived NMS.
    pub pose_kept: usize,
    /// Human candidates removed by NMS.
    pub suppressed: usize,
    /// Object rows passed through.
    pub objects: usize,
    /// Rows removed by the optional score filter.
    pub filtered: usize,
}

impl AddAssign for MergeStats {
    fn add_assign(&mut self, other: Self) {
        self.plain_kept += other.plain_kept;
        self.pose_kept += other.pose_kept;
        self.suppressed += other.suppressed;
        self.objects += other.objects;
        self.filtered += other.filtered;
    }
}

#[derive(Debug, Clone)]
pub struct MergeResult {
    pub detection: AnnotatedDetection,
    pub stats: MergeStats,
}

/// NMS candidates for the human class: plain rows first, then pose rows.
struct HumanCandidates {
    boxes: Vec<BBox>,
    labels: Vec<i64>,
    /// Ranking key for NMS.
    priority: Vec<f64>,
    /// Score written to the output.
    scores: Vec<f64>,
    /// Pose rows win exact priority ties.
    from_pose: Vec<bool>,
    num_plain: usize,
}

impl HumanCandidates {
    fn build(plain: &DetectionSet, poses: &[PoseEstimate], human_class_id: i64, boost: f64) -> Self {
        let n = plain.len() + poses.len();
        let mut candidates = Self {
            boxes: Vec::with_capacity(n),
            labels: Vec::with_capacity(n),
            priority: Vec::with_capacity(n),
            scores: Vec::with_capacity(n),
            from_pose: Vec::with_capacity(n),
            num_plain: plain.len(),
        };

        for i in 0..plain.len() {
            candidates.boxes.push(BBox::from(plain.boxes()[i]));
            candidates.labels.push(plain.labels()[i]);
            candidates.priority.push(plain.scores()[i]);
            candidates.scores.push(plain.scores()[i]);
            candidates.from_pose.push(false);
        }
        for pose in poses {
            candidates.boxes.push(BBox::from(pose.bbox));
            candidates.labels.push(human_class_id);
            candidates.priority.push(pose.score + boost);
            candidates.scores.push(pose.score);
            candidates.from_pose.push(true);
        }

        candidates
    }

    fn len(&self) -> usize {
        self.boxes.len()
    }
}

/// Builds one pose-annotated detection set per image.
#[derive(Debug, Clone)]
pub struct PoseAwareDetectionMerger<'a> {
    config: FusionConfig,
    default_pose: &'a DefaultPose,
}

impl<'a> PoseAwareDetectionMerger<'a> {
    pub fn new(config: FusionConfig, default_pose: &'a DefaultPose) -> Self {
        Self {
            config,
            default_pose,
        }
    }

    /// Merge one image's detector output with its pose estimates.
    ///
    /// Output holds the surviving human rows in NMS keep order followed by
    /// the object rows in input order. Fails with
    /// [`FusionError::NoDetections`] when the detector reported nothing.
    pub fn merge(&self, detections: &DetectionSet, poses: &[PoseEstimate]) -> Result<MergeResult> {
        if detections.is_empty() {
            return Err(FusionError::NoDetections);
        }

        let human_id = self.config.human_class_id;
        let (plain, objects) = detections.partition(human_id);
        let candidates = HumanCandidates::build(&plain, poses, human_id, self.config.pose_score_boost);

        let keep: Vec<usize> = if poses.is_empty() {
            (0..candidates.len()).collect()
        } else {
            class_aware_nms_preferring(
                &candidates.boxes,
                &candidates.labels,
                &candidates.priority,
                &candidates.from_pose,
                self.config.nms_iou_threshold,
            )
        };

        let mut stats = MergeStats {
            suppressed: candidates.len() - keep.len(),
            objects: objects.len(),
            ..MergeStats::default()
        };

        let mut merged = AnnotatedDetection::with_capacity(keep.len() + objects.len());
        for &i in &keep {
            let (joints, joints_score) = if i < candidates.num_plain {
                stats.plain_kept += 1;
                (self.default_pose.joints, self.default_pose.joints_score)
            } else {
                stats.pose_kept += 1;
                let pose = &poses[i - candidates.num_plain];
                (pose.joints, pose.joints_score)
            };
            merged.push_row(
                candidates.boxes[i].to_array(),
                candidates.labels[i],
                candidates.scores[i],
                joints,
                joints_score,
            );
        }

        for i in 0..objects.len() {
            merged.push_object(objects.boxes()[i], objects.labels()[i], objects.scores()[i]);
        }

        if self.config.has_score_filter() {
            let before = merged.len();
            merged = merged.filter_by_score(
                human_id,
                self.config.min_human_score.unwrap_or(f64::NEG_INFINITY),
                self.config.min_object_score.unwrap_or(f64::NEG_INFINITY),
            );
            stats.filtered = before - merged.len();
        }

        merged.check_lengths()?;
        debug!(
            "Merged {} plain + {} pose human boxes: kept {} plain, {} pose, suppressed {}, {} objects",
            plain.len(),
            poses.len(),
            stats.plain_kept,
            stats.pose_kept,
            stats.suppressed,
            stats.objects
        );

        Ok(MergeResult {
            detection: merged,
            stats,
        })
    }
}
