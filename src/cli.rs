//! Command-line arguments

use crate::pipeline::FailurePolicy;
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use hoipose_cv::FusionConfig;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(after_help = r#"Examples:
    hoipose gt --annotations hicodet/instances_train2015.json \
        --pose-dir hicodet/detections/train_pose \
        --default-pose hicodet/basic_pose/basic_pose.json \
        --output hicodet/instances_train2015_pose.json
    hoipose det --detections hicodet/detections/train2015 \
        --pose-dir hicodet/detections/train_pose \
        --default-pose hicodet/basic_pose/basic_pose.json \
        --output-dir hicodet/detections/train2015_pose --on-error skip"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// More log output (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Attach joints to the human boxes of a ground-truth annotation file
    Gt(GtArgs),
    /// Merge per-image detector output with pose estimates
    Det(DetArgs),
}

#[derive(Args, Debug)]
pub struct GtArgs {
    /// Ground-truth annotation file with `annotation` and `filenames`
    #[arg(short, long)]
    pub annotations: PathBuf,

    /// Directory holding one pose-estimate file per image
    #[arg(short, long)]
    pub pose_dir: PathBuf,

    /// Default pose file used when no estimate matches
    #[arg(short, long)]
    pub default_pose: PathBuf,

    /// Where to write the annotated file
    #[arg(short, long)]
    pub output: PathBuf,

    #[command(flatten)]
    pub fusion: FusionArgs,
}

#[derive(Args, Debug)]
pub struct DetArgs {
    /// Directory holding one detector record per image
    #[arg(long)]
    pub detections: PathBuf,

    /// Directory holding one pose-estimate file per image
    #[arg(short, long)]
    pub pose_dir: PathBuf,

    /// Default pose file used for detector boxes without a pose
    #[arg(short, long)]
    pub default_pose: PathBuf,

    /// Directory for the merged records (created if missing)
    #[arg(short, long)]
    pub output_dir: PathBuf,

    /// What to do when one image fails
    #[arg(long, value_enum, default_value_t = FailurePolicy::FailFast)]
    pub on_error: FailurePolicy,

    #[command(flatten)]
    pub fusion: FusionArgs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Dataset {
    Hicodet,
    Vcoco,
}

/// Options shared by both subcommands. Explicit flags override the config
/// file, which overrides the dataset preset.
#[derive(Args, Debug)]
pub struct FusionArgs {
    /// JSON file with fusion settings
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Label space preset
    #[arg(long, value_enum, default_value_t = Dataset::Hicodet)]
    pub dataset: Dataset,

    /// Human class id in the detector label space
    #[arg(long)]
    pub human_id: Option<i64>,

    /// `IoU` a pose estimate must exceed to match a box
    #[arg(long)]
    pub assign_iou: Option<f64>,

    /// `IoU` threshold for NMS
    #[arg(long)]
    pub nms_iou: Option<f64>,

    /// Drop merged human boxes scoring below this
    #[arg(long)]
    pub min_human_score: Option<f64>,

    /// Drop merged object boxes scoring below this
    #[arg(long)]
    pub min_object_score: Option<f64>,

}

impl FusionArgs {
    pub fn resolve(&self) -> Result<FusionConfig> {
        let mut config = match &self.config {
            Some(path) => FusionConfig::from_file(path)
                .with_context(|| format!("Failed to load config: {}", path.display()))?,
            None => match self.dataset {
                Dataset::Hicodet => FusionConfig::hicodet(),
                Dataset::Vcoco => FusionConfig::vcoco(),
            },
        };

        if let Some(id) = self.human_id {
            config.human_class_id = id;
        }
        if let Some(iou) = self.assign_iou {
            config.assign_iou_threshold = iou;
        }
        if let Some(iou) = self.nms_iou {
            config.nms_iou_threshold = iou;
        }
        if self.min_human_score.is_some() {
            config.min_human_score = self.min_human_score;
        }
        if self.min_object_score.is_some() {
            config.min_object_score = self.min_object_score;
        }

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_det_args() {
        let cli = Cli::try_parse_from([
            "hoipose", "det", "--detections", "d", "-p", "p", "-d", "basic.json", "-o", "out",
            "--dataset", "vcoco", "--nms-iou", "0.7", "--on-error", "skip",
        ])
        .unwrap();

        let Commands::Det(args) = cli.command else {
            panic!("expected det subcommand");
        };
        let config = args.fusion.resolve().unwrap();
        assert_eq!(config.human_class_id, 1);
        assert_eq!(config.nms_iou_threshold, 0.7);
        assert_eq!(args.on_error, FailurePolicy::Skip);
    }

    #[test]
    fn test_flags_override_preset() {
        let cli = Cli::try_parse_from([
            "hoipose", "-v", "gt", "-a", "gt.json", "-p", "p", "-d", "basic.json", "-o", "out.json",
            "--human-id", "7", "--assign-iou", "0.3",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 1);
        let Commands::Gt(args) = cli.command else {
            panic!("expected gt subcommand");
        };
        let config = args.fusion.resolve().unwrap();
        assert_eq!(config.human_class_id, 7);
        assert_eq!(config.assign_iou_threshold, 0.3);
    }

    #[test]
    fn test_gt_has_no_skip_policy() {
        let parsed = Cli::try_parse_from([
            "hoipose", "gt", "-a", "gt.json", "-p", "p", "-d", "basic.json", "-o", "out.json",
            "--on-error", "skip",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        let cli = Cli::try_parse_from([
            "hoipose", "gt", "-a", "gt.json", "-p", "p", "-d", "basic.json", "-o", "out.json",
            "--assign-iou", "2.0",
        ])
        .unwrap();
        let Commands::Gt(args) = cli.command else {
            panic!("expected gt subcommand");
        };
        assert!(args.fusion.resolve().is_err());
    }
}
