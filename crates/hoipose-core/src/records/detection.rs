//! Detector output and the pose-annotated detection set built from it.

use crate::error::{FusionError, Result};
use crate::io::read_json;
use crate::pose::{JointScores, Joints, NUM_JOINTS, zero_joints};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Detector record as stored on disk.
#[derive(Debug, Clone, Deserialize)]
pub struct DetectionRecord {
    pub boxes: Option<Vec<[f64; 4]>>,
    pub labels: Option<Vec<i64>>,
    pub scores: Option<Vec<f64>>,
}

/// Parallel `boxes`/`labels`/`scores` columns for one image.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DetectionSet {
    boxes: Vec<[f64; 4]>,
    labels: Vec<i64>,
    scores: Vec<f64>,
}

impl DetectionSet {
    /// Build from parallel columns. Lengths must agree and every score and
    /// coordinate must be finite.
    pub fn new(boxes: Vec<[f64; 4]>, labels: Vec<i64>, scores: Vec<f64>) -> Result<Self> {
        check_len("labels", boxes.len(), labels.len())?;
        check_len("scores", boxes.len(), scores.len())?;
        FusionError::check_finite("scores", &scores)?;
        FusionError::check_finite("boxes", boxes.as_flattened())?;
        Ok(Self {
            boxes,
            labels,
            scores,
        })
    }

    /// Load one detector record.
    pub fn load(path: &Path) -> Result<Self> {
        let record: DetectionRecord = read_json(path)?;
        Self::try_from(record)
    }

    pub fn push(&mut self, bbox: [f64; 4], label: i64, score: f64) {
        self.boxes.push(bbox);
        self.labels.push(label);
        self.scores.push(score);
    }

    pub fn boxes(&self) -> &[[f64; 4]] {
        &self.boxes
    }

    pub fn labels(&self) -> &[i64] {
        &self.labels
    }

    pub fn scores(&self) -> &[f64] {
        &self.scores
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// Split into `(humans, objects)` in one pass, keeping relative order
    /// inside each half.
    pub fn partition(&self, human_class_id: i64) -> (DetectionSet, DetectionSet) {
        let mut humans = DetectionSet::default();
        let mut objects = DetectionSet::default();

        for i in 0..self.len() {
            let target = if self.labels[i] == human_class_id {
                &mut humans
            } else {
                &mut objects
            };
            target.push(self.boxes[i], self.labels[i], self.scores[i]);
        }

        (humans, objects)
    }
}

impl TryFrom<DetectionRecord> for DetectionSet {
    type Error = FusionError;

    fn try_from(record: DetectionRecord) -> Result<Self> {
        let missing = |field: &str| FusionError::MissingInput(format!("detection field `{field}`"));
        Self::new(
            record.boxes.ok_or_else(|| missing("boxes"))?,
            record.labels.ok_or_else(|| missing("labels"))?,
            record.scores.ok_or_else(|| missing("scores"))?,
        )
    }
}

/// A detection set where every row also carries a joints row.
///
/// Only rows labelled with the human class hold meaningful joints; object
/// rows are zero-filled so all columns keep the same length.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedDetection {
    pub boxes: Vec<[f64; 4]>,
    pub labels: Vec<i64>,
    pub scores: Vec<f64>,
    pub human_joints: Vec<Joints>,
    pub human_joints_score: Vec<JointScores>,
}

impl AnnotatedDetection {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            boxes: Vec::with_capacity(capacity),
            labels: Vec::with_capacity(capacity),
            scores: Vec::with_capacity(capacity),
            human_joints: Vec::with_capacity(capacity),
            human_joints_score: Vec::with_capacity(capacity),
        }
    }

    pub fn push_row(
        &mut self,
        bbox: [f64; 4],
        label: i64,
        score: f64,
        joints: Joints,
        joints_score: JointScores,
    ) {
        self.boxes.push(bbox);
        self.labels.push(label);
        self.scores.push(score);
        self.human_joints.push(joints);
        self.human_joints_score.push(joints_score);
    }

    pub fn push_object(&mut self, bbox: [f64; 4], label: i64, score: f64) {
        self.push_row(bbox, label, score, zero_joints(), [0.0; NUM_JOINTS]);
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// Verify every column has the same length.
    pub fn check_lengths(&self) -> Result<()> {
        let n = self.boxes.len();
        check_len("labels", n, self.labels.len())?;
        check_len("scores", n, self.scores.len())?;
        check_len("human_joints", n, self.human_joints.len())?;
        check_len("human_joints_score", n, self.human_joints_score.len())
    }

    /// Drop low-confidence rows, see [`score_filter_indices`].
    pub fn filter_by_score(&self, human_class_id: i64, min_human: f64, min_object: f64) -> Self {
        let keep = score_filter_indices(&self.labels, &self.scores, human_class_id, min_human, min_object);
        let mut kept = Self::with_capacity(keep.len());
        for i in keep {
            kept.push_row(
                self.boxes[i],
                self.labels[i],
                self.scores[i],
                self.human_joints[i],
                self.human_joints_score[i],
            );
        }
        kept
    }
}

/// Indices of rows passing the per-class score thresholds: human rows with
/// `score >= min_human` first, then object rows with `score >= min_object`,
/// each group in input order.
pub fn score_filter_indices(
    labels: &[i64],
    scores: &[f64],
    human_class_id: i64,
    min_human: f64,
    min_object: f64,
) -> Vec<usize> {
    let humans = (0..labels.len()).filter(|&i| labels[i] == human_class_id && scores[i] >= min_human);
    let objects = (0..labels.len()).filter(|&i| labels[i] != human_class_id && scores[i] >= min_object);
    humans.chain(objects).collect()
}

fn check_len(what: &str, expected: usize, found: usize) -> Result<()> {
    if expected == found {
        Ok(())
    } else {
        Err(FusionError::shape(what, expected, found))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HUMAN: i64 = 49;

    fn mixed() -> DetectionSet {
        DetectionSet::new(
            vec![
                [0.0, 0.0, 10.0, 10.0],
                [5.0, 5.0, 15.0, 15.0],
                [100.0, 100.0, 110.0, 110.0],
                [7.0, 7.0, 9.0, 9.0],
            ],
            vec![HUMAN, 3, HUMAN, 12],
            vec![0.9, 0.99, 0.1, 0.3],
        )
        .unwrap()
    }

    #[test]
    fn test_length_mismatch() {
        let err = DetectionSet::new(vec![[0.0; 4]; 2], vec![1], vec![0.5, 0.5]).unwrap_err();
        assert!(matches!(err, FusionError::ShapeMismatch { expected: 2, found: 1, .. }));
    }

    #[test]
    fn test_partition_keeps_order() {
        let (humans, objects) = mixed().partition(HUMAN);

        assert_eq!(humans.scores(), &[0.9, 0.1]);
        assert_eq!(humans.boxes()[1], [100.0, 100.0, 110.0, 110.0]);
        assert_eq!(objects.labels(), &[3, 12]);
        assert_eq!(objects.scores(), &[0.99, 0.3]);
    }

    #[test]
    fn test_non_finite_rejected() {
        let err = DetectionSet::new(vec![[0.0, 0.0, 1.0, 1.0]], vec![HUMAN], vec![f64::NAN]).unwrap_err();
        assert!(matches!(err, FusionError::InvalidField { ref field, .. } if field == "scores"));

        let err = DetectionSet::new(vec![[0.0, 0.0, f64::INFINITY, 1.0]], vec![HUMAN], vec![0.5]).unwrap_err();
        assert!(matches!(err, FusionError::InvalidField { ref field, .. } if field == "boxes"));
    }

    #[test]
    fn test_score_filter_indices() {
        let set = mixed();
        let keep = score_filter_indices(set.labels(), set.scores(), HUMAN, 0.2, 0.5);
        assert_eq!(keep, vec![0, 1]);
    }

    #[test]
    fn test_annotated_filter_keeps_joints_aligned() {
        let mut det = AnnotatedDetection::default();
        det.push_object([5.0, 5.0, 15.0, 15.0], 3, 0.1);
        det.push_row([0.0, 0.0, 10.0, 10.0], HUMAN, 0.4, [[1.0, 2.0]; 17], [0.5; 17]);
        det.push_row([0.0, 0.0, 1.0, 1.0], HUMAN, 0.05, [[3.0, 4.0]; 17], [0.7; 17]);

        let kept = det.filter_by_score(HUMAN, 0.2, 0.0);
        kept.check_lengths().unwrap();
        assert_eq!(kept.labels, vec![HUMAN, 3]);
        assert_eq!(kept.human_joints[0], [[1.0, 2.0]; 17]);
        assert_eq!(kept.human_joints[1], zero_joints());
    }

    #[test]
    fn test_record_missing_field() {
        let record: DetectionRecord =
            serde_json::from_str(r#"{"boxes": [[0, 0, 1, 1]], "labels": [49]}"#).unwrap();
        let err = DetectionSet::try_from(record).unwrap_err();
        assert!(matches!(err, FusionError::MissingInput(ref msg) if msg.contains("scores")));
    }
}
