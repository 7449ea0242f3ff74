use anyhow::{Context, Result};
use clap::Parser;
use hoipose_core::DefaultPose;
use std::path::Path;
use tracing::{error, info};

mod cli;
mod logging;
mod pipeline;

use cli::{Cli, Commands};
use pipeline::BatchSummary;

fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose, cli.quiet);

    match run(cli) {
        Ok(summary) if summary.skipped.is_empty() => {}
        Ok(summary) => {
            error!("{} images were skipped", summary.skipped.len());
            std::process::exit(2);
        }
        Err(e) => {
            error!("{:#}", e);
            std::process::exit(1);
        }
    }
}

fn run(cli: Cli) -> Result<BatchSummary> {
    let summary = match cli.command {
        Commands::Gt(args) => {
            let config = args.fusion.resolve()?;
            let default_pose = load_default_pose(&args.default_pose)?;
            info!("Human class id {}, assignment IoU > {}", config.human_class_id, config.assign_iou_threshold);
            pipeline::annotate_ground_truth(
                &args.annotations,
                &args.pose_dir,
                &args.output,
                &default_pose,
                &config,
            )?
        }
        Commands::Det(args) => {
            let config = args.fusion.resolve()?;
            let default_pose = load_default_pose(&args.default_pose)?;
            info!("Human class id {}, NMS IoU > {}", config.human_class_id, config.nms_iou_threshold);
            pipeline::merge_detections(
                &args.detections,
                &args.pose_dir,
                &args.output_dir,
                &default_pose,
                &config,
                args.on_error,
            )?
        }
    };

    summary.log();
    Ok(summary)
}

fn load_default_pose(path: &Path) -> Result<DefaultPose> {
    DefaultPose::load(path).with_context(|| format!("Failed to load default pose: {}", path.display()))
}
