//! Body-joint annotations: pose estimates and the fallback default pose.

pub mod default;
pub mod estimate;

pub use default::DefaultPose;
pub use estimate::PoseEstimate;

use crate::error::{FusionError, Result};
use serde::{Deserialize, Serialize};

/// Number of body joints per pose (COCO keypoint layout).
pub const NUM_JOINTS: usize = 17;

/// Joint coordinates, `[x, y]` per joint.
pub type Joints = [[f64; 2]; NUM_JOINTS];

/// Per-joint confidence.
pub type JointScores = [f64; NUM_JOINTS];

/// Joint coordinates as they appear on disk: either 34 flat numbers
/// (`x0, y0, x1, y1, ...`) or 17 `[x, y]` pairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JointsRepr {
    Nested(Vec<[f64; 2]>),
    Flat(Vec<f64>),
}

impl JointsRepr {
    /// Normalise to a fixed 17x2 array.
    pub fn into_joints(self) -> Result<Joints> {
        let pairs: Vec<[f64; 2]> = match self {
            JointsRepr::Nested(pairs) => pairs,
            JointsRepr::Flat(flat) => {
                if flat.len() != NUM_JOINTS * 2 {
                    return Err(FusionError::shape("flat joints", NUM_JOINTS * 2, flat.len()));
                }
                flat.chunks_exact(2).map(|xy| [xy[0], xy[1]]).collect()
            }
        };

        let found = pairs.len();
        pairs
            .try_into()
            .map_err(|_| FusionError::shape("joints", NUM_JOINTS, found))
    }
}

/// Check a per-joint score list has one entry per joint.
pub fn joint_scores_from_vec(scores: Vec<f64>) -> Result<JointScores> {
    let found = scores.len();
    scores
        .try_into()
        .map_err(|_| FusionError::shape("joints_score", NUM_JOINTS, found))
}

/// All-zero joints, used for rows that carry no pose.
pub const fn zero_joints() -> Joints {
    [[0.0; 2]; NUM_JOINTS]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_and_nested_agree() {
        let flat: Vec<f64> = (0..34).map(f64::from).collect();
        let nested: Vec<[f64; 2]> = (0..17).map(|j| [2.0 * j as f64, 2.0 * j as f64 + 1.0]).collect();

        let a = JointsRepr::Flat(flat).into_joints().unwrap();
        let b = JointsRepr::Nested(nested).into_joints().unwrap();
        assert_eq!(a, b);
        assert_eq!(a[3], [6.0, 7.0]);
    }

    #[test]
    fn test_untagged_parsing() {
        let flat: JointsRepr = serde_json::from_str(&format!("{:?}", vec![1.5; 34])).unwrap();
        assert!(matches!(flat, JointsRepr::Flat(_)));

        let nested: JointsRepr = serde_json::from_str("[[1, 2], [3, 4]]").unwrap();
        assert!(matches!(nested, JointsRepr::Nested(ref v) if v.len() == 2));
    }

    #[test]
    fn test_wrong_joint_count() {
        let err = JointsRepr::Flat(vec![0.0; 32]).into_joints().unwrap_err();
        assert!(matches!(err, FusionError::ShapeMismatch { expected: 34, found: 32, .. }));

        let err = JointsRepr::Nested(vec![[0.0; 2]; 18]).into_joints().unwrap_err();
        assert!(matches!(err, FusionError::ShapeMismatch { expected: 17, found: 18, .. }));

        let err = joint_scores_from_vec(vec![1.0; 3]).unwrap_err();
        assert!(matches!(err, FusionError::ShapeMismatch { expected: 17, found: 3, .. }));
    }
}
