use super::{JointScores, Joints, JointsRepr, joint_scores_from_vec};
use crate::error::{FusionError, Result};
use crate::io::read_json;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One person found by the pose estimator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoseEstimate {
    pub bbox: [f64; 4],
    pub score: f64,
    pub joints: Joints,
    pub joints_score: JointScores,
}

/// A pose-estimate entry exactly as written by the estimator.
#[derive(Debug, Clone, Deserialize)]
pub struct PoseRecord {
    pub bbox: Option<[f64; 4]>,
    pub score: Option<f64>,
    pub joints: Option<JointsRepr>,
    pub joints_score: Option<Vec<f64>>,
}

impl TryFrom<PoseRecord> for PoseEstimate {
    type Error = FusionError;

    fn try_from(record: PoseRecord) -> Result<Self> {
        let missing = |field: &str| FusionError::MissingInput(format!("pose field `{field}`"));

        let bbox = record.bbox.ok_or_else(|| missing("bbox"))?;
        let score = record.score.ok_or_else(|| missing("score"))?;
        FusionError::check_finite("bbox", &bbox)?;
        FusionError::check_finite("score", &[score])?;

        Ok(Self {
            bbox,
            score,
            joints: record.joints.ok_or_else(|| missing("joints"))?.into_joints()?,
            joints_score: joint_scores_from_vec(
                record.joints_score.ok_or_else(|| missing("joints_score"))?,
            )?,
        })
    }
}

impl PoseEstimate {
    /// Load every pose estimate of one image.
    pub fn load_all(path: &Path) -> Result<Vec<PoseEstimate>> {
        let records: Vec<PoseRecord> = read_json(path)?;
        records.into_iter().map(PoseEstimate::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> PoseRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_flat_record() {
        let pose = PoseEstimate::try_from(record(json!({
            "bbox": [1, 2, 30, 40],
            "score": 0.75,
            "joints": vec![4.0; 34],
            "joints_score": vec![0.5; 17],
        })))
        .unwrap();

        assert_eq!(pose.bbox, [1.0, 2.0, 30.0, 40.0]);
        assert_eq!(pose.score, 0.75);
        assert_eq!(pose.joints[16], [4.0, 4.0]);
        assert_eq!(pose.joints_score, [0.5; 17]);
    }

    #[test]
    fn test_missing_field() {
        let err = PoseEstimate::try_from(record(json!({
            "bbox": [1, 2, 30, 40],
            "joints": vec![4.0; 34],
            "joints_score": vec![0.5; 17],
        })))
        .unwrap_err();

        assert!(matches!(err, FusionError::MissingInput(ref msg) if msg.contains("score")));
    }

    #[test]
    fn test_non_finite_score() {
        let mut raw = record(json!({
            "bbox": [1, 2, 30, 40],
            "score": 0.5,
            "joints": vec![4.0; 34],
            "joints_score": vec![0.5; 17],
        }));
        raw.score = Some(f64::NAN);

        let err = PoseEstimate::try_from(raw).unwrap_err();
        assert!(matches!(err, FusionError::InvalidField { ref field, .. } if field == "score"));
    }

    #[test]
    fn test_load_all_empty_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("img.json");
        std::fs::write(&path, "[]").unwrap();
        assert!(PoseEstimate::load_all(&path).unwrap().is_empty());
    }
}
