use super::{JointScores, Joints, JointsRepr, NUM_JOINTS};
use crate::error::{FusionError, Result};
use crate::io::read_json;
use serde::Deserialize;
use std::path::Path;
use tracing::info;

/// Canonical pose attached to any human box no pose estimate could be
/// matched to. Its joint scores are always zero.
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultPose {
    pub joints: Joints,
    pub joints_score: JointScores,
}

#[derive(Debug, Deserialize)]
struct DefaultPoseRecord {
    joints: Option<JointsRepr>,
}

impl DefaultPose {
    pub fn from_joints(joints: Joints) -> Self {
        Self {
            joints,
            joints_score: [0.0; NUM_JOINTS],
        }
    }

    /// Load the default pose from a single-entry list file.
    ///
    /// Only `joints` of the first entry is read; any `joints_score` in the
    /// file is ignored.
    pub fn load(path: &Path) -> Result<Self> {
        let records: Vec<DefaultPoseRecord> = read_json(path)?;
        let first = records.into_iter().next().ok_or_else(|| {
            FusionError::MissingInput(format!("default pose entry in {}", path.display()))
        })?;
        let joints = first
            .joints
            .ok_or_else(|| FusionError::MissingInput("default pose field `joints`".to_string()))?
            .into_joints()?;

        info!("Loaded default pose from {}", path.display());
        Ok(Self::from_joints(joints))
    }
}
