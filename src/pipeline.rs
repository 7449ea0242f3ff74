//! Batch drivers: one task per image, no state shared between images.

use anyhow::{Context, Result, bail};
use clap::ValueEnum;
use hoipose_core::io::write_json;
use hoipose_core::{DefaultPose, DetectionSet, FusionError, GroundTruthFile, PoseEstimate};
use hoipose_cv::{BBox, FusionConfig, JointAssigner, MergeStats, PoseAwareDetectionMerger};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// How a batch reacts to a failing image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FailurePolicy {
    /// Stop and report the first failing image (in file-name order).
    FailFast,
    /// Log the failing image, write nothing for it, and continue.
    Skip,
}

#[derive(Debug, Default)]
pub struct BatchSummary {
    pub processed: usize,
    pub skipped: Vec<String>,
    pub stats: MergeStats,
}

impl BatchSummary {
    pub fn log(&self) {
        info!(
            "Processed {} images ({} skipped): {} detector humans kept, {} pose humans kept, {} suppressed, {} objects, {} filtered",
            self.processed,
            self.skipped.len(),
            self.stats.plain_kept,
            self.stats.pose_kept,
            self.stats.suppressed,
            self.stats.objects,
            self.stats.filtered
        );
    }
}

/// Pose-estimate file for an image: same stem, `.json` extension.
pub fn pose_path_for(pose_dir: &Path, image: &str) -> PathBuf {
    pose_dir.join(Path::new(image).with_extension("json"))
}

/// Run `task` on every item, in parallel when the `parallel` feature is on.
/// Results come back in input order.
fn run_per_image<T, R, F>(items: Vec<T>, task: F) -> Vec<R>
where
    T: Send,
    R: Send,
    F: Fn(T) -> R + Sync + Send,
{
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        items.into_par_iter().map(task).collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        items.into_iter().map(task).collect()
    }
}

/// Apply the failure policy to per-image results, in input order.
fn settle<R>(
    results: Vec<(String, hoipose_core::Result<R>)>,
    policy: FailurePolicy,
    summary: &mut BatchSummary,
) -> Result<Vec<R>> {
    let mut ok = Vec::with_capacity(results.len());
    for (image, result) in results {
        match result {
            Ok(value) => {
                summary.processed += 1;
                ok.push(value);
            }
            Err(err) => {
                let err = err.in_image(image.clone());
                match policy {
                    FailurePolicy::FailFast => return Err(err.into()),
                    FailurePolicy::Skip => {
                        warn!("Skipping {}: {:#}", image, anyhow::Error::from(err));
                        summary.skipped.push(image);
                    }
                }
            }
        }
    }
    Ok(ok)
}

/// Attach joints to every human box of a ground-truth file.
///
/// Always fail-fast: the output is one file whose per-image arrays must stay
/// aligned, so a failing image aborts the run and nothing is written.
pub fn annotate_ground_truth(
    annotations: &Path,
    pose_dir: &Path,
    output: &Path,
    default_pose: &DefaultPose,
    config: &FusionConfig,
) -> Result<BatchSummary> {
    let mut gt = GroundTruthFile::load(annotations)
        .with_context(|| format!("Failed to load annotations: {}", annotations.display()))?;
    let assigner = JointAssigner::new(default_pose, config.assign_iou_threshold);
    let mut summary = BatchSummary::default();

    let entries = gt.entries_mut()?;
    info!("Assigning joints for {} images", entries.len());

    let results = run_per_image(entries, |(image, anno)| {
        let result = (|| {
            let boxes: Vec<BBox> = anno.boxes_h()?.into_iter().map(BBox::from).collect();
            let poses = PoseEstimate::load_all(&pose_path_for(pose_dir, image))?;
            let (joints, joints_score) = assigner.assign_all(&boxes, &poses);
            anno.set_human_joints(&joints, &joints_score)?;
            debug!("{}: {} human boxes, {} pose estimates", image, boxes.len(), poses.len());
            Ok::<_, FusionError>(())
        })();
        (image.to_string(), result)
    });
    settle(results, FailurePolicy::FailFast, &mut summary)?;

    gt.save(output)
        .with_context(|| format!("Failed to write annotations: {}", output.display()))?;
    info!("Wrote {}", output.display());
    Ok(summary)
}

/// Merge every detector record in `detections` with its pose estimates and
/// write the result under the same file name in `output_dir`.
pub fn merge_detections(
    detections: &Path,
    pose_dir: &Path,
    output_dir: &Path,
    default_pose: &DefaultPose,
    config: &FusionConfig,
    policy: FailurePolicy,
) -> Result<BatchSummary> {
    let images = list_json_files(detections)?;
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory: {}", output_dir.display()))?;

    let merger = PoseAwareDetectionMerger::new(config.clone(), default_pose);
    let mut summary = BatchSummary::default();
    info!("Merging {} detection files", images.len());

    let results = run_per_image(images, |image| {
        let result = (|| {
            let dets = DetectionSet::load(&detections.join(&image))?;
            let poses = PoseEstimate::load_all(&pose_dir.join(&image))?;
            let merged = merger.merge(&dets, &poses)?;
            write_json(&output_dir.join(&image), &merged.detection)?;
            debug!("{}: {} rows written", image, merged.detection.len());
            Ok::<_, FusionError>(merged.stats)
        })();
        (image, result)
    });

    for stats in settle(results, policy, &mut summary)? {
        summary.stats += stats;
    }
    Ok(summary)
}

/// Sorted file names of the `*.json` files directly inside `dir`.
fn list_json_files(dir: &Path) -> Result<Vec<String>> {
    if !dir.is_dir() {
        bail!("Detection directory not found: {}", dir.display());
    }

    let mut names = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("Failed to read directory: {:?}", dir))? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            if let Some(name) = path.file_name() {
                names.push(name.to_string_lossy().to_string());
            }
        }
    }
    names.sort();
    Ok(names)
}
