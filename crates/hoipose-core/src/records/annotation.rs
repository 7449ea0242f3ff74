//! Ground-truth annotation file: one entry per image plus the image file
//! names. Fields this crate does not interpret are carried through as-is.

use crate::error::{FusionError, Result};
use crate::io::{read_json, write_json};
use crate::pose::{JointScores, Joints};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroundTruthFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<Vec<GroundTruthAnnotation>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filenames: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GroundTruthFile {
    pub fn load(path: &Path) -> Result<Self> {
        read_json(path)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        write_json(path, self)
    }

    /// Pair every annotation with its image file name.
    pub fn entries_mut(&mut self) -> Result<Vec<(&str, &mut GroundTruthAnnotation)>> {
        let annotation = self
            .annotation
            .as_mut()
            .ok_or_else(|| FusionError::MissingInput("ground-truth field `annotation`".to_string()))?;
        let filenames = self
            .filenames
            .as_ref()
            .ok_or_else(|| FusionError::MissingInput("ground-truth field `filenames`".to_string()))?;

        if annotation.len() != filenames.len() {
            return Err(FusionError::shape("filenames", annotation.len(), filenames.len()));
        }

        Ok(filenames
            .iter()
            .map(String::as_str)
            .zip(annotation.iter_mut())
            .collect())
    }
}

/// One image's ground truth. `boxes_h` is read but left untouched in the
/// underlying map.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroundTruthAnnotation {
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl GroundTruthAnnotation {
    /// Human boxes of this image.
    pub fn boxes_h(&self) -> Result<Vec<[f64; 4]>> {
        let value = self
            .fields
            .get("boxes_h")
            .ok_or_else(|| FusionError::MissingInput("ground-truth field `boxes_h`".to_string()))?;

        serde_json::from_value(value.clone())
            .map_err(|source| FusionError::invalid_field("boxes_h", source.to_string()))
    }

    /// Store one joints row per human box.
    pub fn set_human_joints(&mut self, joints: &[Joints], joints_score: &[JointScores]) -> Result<()> {
        if joints.len() != joints_score.len() {
            return Err(FusionError::shape("human_joints_score", joints.len(), joints_score.len()));
        }

        let joints = serde_json::to_value(joints)
            .map_err(|source| FusionError::invalid_field("human_joints", source.to_string()))?;
        let joints_score = serde_json::to_value(joints_score)
            .map_err(|source| FusionError::invalid_field("human_joints_score", source.to_string()))?;
        self.fields.insert("human_joints".to_string(), joints);
        self.fields.insert("human_joints_score".to_string(), joints_score);
        Ok(())
    }
}
