//! COCO JSON to YOLO label conversion, plus COCO aggregation.
//!
//! This is the heart of the toolkit. `convert_labels_to_yolo` walks the
//! `labels/` tree (split-aware), turns every per-subset COCO JSON into
//! one label file per image, and removes the consumed JSON files so a
//! re-run is a detectable no-op. `aggregate_coco` is the alternative
//! path that keeps COCO as the on-disk format but merges the per-subset
//! files into one per split, with category ids remapped to the dense
//! YOLO numbering.

mod report;

pub use report::{ConvertReport, SplitOutcome};

use std::fs;
use std::path::Path;

use crate::dataset::coco::{self, CocoDataset};
use crate::dataset::layout::{self, Split};
use crate::dataset::{yolo, yolo_class_id, PixelBox};
use crate::error::LocoprepError;

/// Options for `convert_labels_to_yolo`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConvertOptions {
    /// Keep the source JSON files instead of removing them. Note that a
    /// kept JSON defeats the no-op detection on re-runs.
    pub keep_json: bool,
}

/// Converts every COCO JSON under `<dataset_root>/labels` into YOLO
/// label files and writes `loco.yaml` at the dataset root.
///
/// Works per split when `labels/train` etc. exist, otherwise on the
/// flat directory. A directory with no JSON files is reported as
/// already converted and left untouched.
pub fn convert_labels_to_yolo(
    dataset_root: &Path,
    opts: &ConvertOptions,
) -> Result<ConvertReport, LocoprepError> {
    let labels_dir = dataset_root.join("labels");
    layout::require_dir(&labels_dir)?;

    let wrote_loco_yaml = yolo::write_loco_yaml(dataset_root)?;

    let mut report = ConvertReport {
        wrote_loco_yaml,
        ..Default::default()
    };

    for (split, dir) in layout::work_dirs(&labels_dir) {
        report.splits.push(convert_dir(&dir, split, opts)?);
    }

    Ok(report)
}

fn convert_dir(
    dir: &Path,
    split: Option<Split>,
    opts: &ConvertOptions,
) -> Result<SplitOutcome, LocoprepError> {
    let json_files = layout::list_files_with_extension(dir, &["json"])?;

    let mut outcome = SplitOutcome::new(split);
    if json_files.is_empty() {
        outcome.already_converted = true;
        return Ok(outcome);
    }

    for json_path in &json_files {
        let dataset = coco::read_coco_json(json_path)?;
        convert_json(dir, json_path, &dataset, &mut outcome)?;

        if !opts.keep_json {
            fs::remove_file(json_path).map_err(LocoprepError::Io)?;
        }
    }

    outcome.json_files = json_files.len();
    Ok(outcome)
}

fn convert_json(
    dir: &Path,
    json_path: &Path,
    dataset: &CocoDataset,
    outcome: &mut SplitOutcome,
) -> Result<(), LocoprepError> {
    for image in &dataset.images {
        let label_path = dir.join(layout::label_file_name(&image.file_name));

        let mut rows = Vec::new();
        for ann in dataset.annotations_for_image(image.id) {
            let class_id = yolo_class_id(ann.category_id).ok_or_else(|| {
                LocoprepError::UnknownCategory {
                    id: ann.category_id,
                    path: json_path.to_path_buf(),
                }
            })?;

            let bbox = PixelBox::from_coco(ann.bbox).to_yolo(image.width, image.height);
            rows.push((class_id, bbox));
        }

        if rows.is_empty() {
            outcome.empty_label_files += 1;
        }
        outcome.annotations += rows.len();
        outcome.label_files += 1;

        yolo::write_label_file(&label_path, &rows)?;
    }

    Ok(())
}

/// Merges the per-subset COCO JSONs under `<dataset_root>/labels` into
/// one `<split>-subset.json` per split (`all-subset.json` for a flat
/// layout), remapping category ids to the dense YOLO numbering.
///
/// The consumed input files are removed. A directory with no JSON files
/// is left untouched.
pub fn aggregate_coco(dataset_root: &Path) -> Result<ConvertReport, LocoprepError> {
    let labels_dir = dataset_root.join("labels");
    layout::require_dir(&labels_dir)?;

    let mut report = ConvertReport::default();

    for (split, dir) in layout::work_dirs(&labels_dir) {
        report.splits.push(aggregate_dir(&dir, split)?);
    }

    Ok(report)
}

fn aggregate_dir(dir: &Path, split: Option<Split>) -> Result<SplitOutcome, LocoprepError> {
    // The merged output of an earlier run lives in the same directory;
    // picking it up again would feed already-dense category ids back
    // through the remap.
    let json_files: Vec<_> = layout::list_files_with_extension(dir, &["json"])?
        .into_iter()
        .filter(|path| {
            !path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with("-subset.json"))
        })
        .collect();

    let mut outcome = SplitOutcome::new(split);
    if json_files.is_empty() {
        outcome.already_converted = true;
        return Ok(outcome);
    }

    let mut merged = CocoDataset::default();
    for json_path in &json_files {
        let mut dataset = coco::read_coco_json(json_path)?;

        for ann in &mut dataset.annotations {
            let dense = yolo_class_id(ann.category_id).ok_or_else(|| {
                LocoprepError::UnknownCategory {
                    id: ann.category_id,
                    path: json_path.to_path_buf(),
                }
            })?;
            ann.category_id = dense as u64;
        }
        for cat in &mut dataset.categories {
            if let Some(dense) = yolo_class_id(cat.id) {
                cat.id = dense as u64;
            }
        }

        outcome.annotations += dataset.annotations.len();
        outcome.label_files += dataset.images.len();
        merged.merge(dataset);
    }

    let out_name = match split {
        Some(split) => format!("{}-subset.json", split.dir_name()),
        None => "all-subset.json".to_string(),
    };
    coco::write_coco_json(&dir.join(out_name), &merged)?;

    for json_path in &json_files {
        fs::remove_file(json_path).map_err(LocoprepError::Io)?;
    }

    outcome.json_files = json_files.len();
    Ok(outcome)
}
