//! Error types shared by every stage of the fusion pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the library crates.
pub type Result<T> = std::result::Result<T, FusionError>;

/// Errors raised while reading, fusing, or writing per-image records.
///
/// All of them are deterministic: re-running on the same input reproduces
/// the same error.
#[derive(Debug, Error)]
pub enum FusionError {
    /// A required file or field is absent.
    #[error("missing input: {0}")]
    MissingInput(String),

    /// Parallel sequences disagree in length, or a joints array is not 17x2.
    #[error("shape mismatch in {what}: expected {expected}, found {found}")]
    ShapeMismatch {
        what: String,
        expected: usize,
        found: usize,
    },

    /// A field is present but its value is unusable.
    #[error("invalid value in field `{field}`: {reason}")]
    InvalidField { field: String, reason: String },

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The detector produced no boxes at all for an image.
    #[error("no detections reported for image")]
    NoDetections,

    #[error("failed to access {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path:?}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Wraps a failure with the image it happened on.
    #[error("failed to process image {image}")]
    Image {
        image: String,
        #[source]
        source: Box<FusionError>,
    },
}

impl FusionError {
    pub fn shape(what: impl Into<String>, expected: usize, found: usize) -> Self {
        Self::ShapeMismatch {
            what: what.into(),
            expected,
            found,
        }
    }

    pub fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Reject NaN and infinite values.
    pub fn check_finite(field: &str, values: &[f64]) -> Result<()> {
        match values.iter().find(|v| !v.is_finite()) {
            Some(v) => Err(Self::invalid_field(field, format!("non-finite value {v}"))),
            None => Ok(()),
        }
    }

    /// Attach the image file name to an error.
    pub fn in_image(self, image: impl Into<String>) -> Self {
        Self::Image {
            image: image.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, skipping any `Image` wrappers.
    pub fn root(&self) -> &FusionError {
        match self {
            Self::Image { source, .. } => source.root(),
            other => other,
        }
    }
}
