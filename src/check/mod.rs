//! Consistency auditing between images, YOLO labels, and COCO JSON.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::dataset::coco::read_coco_json;
use crate::dataset::layout::{self, Split, IMAGE_EXTENSIONS, LABEL_EXTENSION};
use crate::error::LocoprepError;

/// Options for [`check_dataset`].
#[derive(Clone, Debug, Default)]
pub struct CheckOptions {
    /// COCO JSON to cross-check against the label files on disk.
    pub coco_json: Option<PathBuf>,
    /// Read each image's actual dimensions and compare them against the
    /// COCO JSON. Requires `coco_json`.
    pub verify_dims: bool,
}

/// A width/height disagreement between COCO JSON and the image on disk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DimensionMismatch {
    pub file_name: String,
    pub expected: (u32, u32),
    pub actual: (u32, u32),
}

impl fmt::Display for DimensionMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: JSON says {}x{}, image is {}x{}",
            self.file_name, self.expected.0, self.expected.1, self.actual.0, self.actual.1
        )
    }
}

/// Audit results for one split.
#[derive(Clone, Debug)]
pub struct CheckOutcome {
    pub split: Option<Split>,
    pub images: usize,
    pub labels: usize,
    /// Image file names with no matching label file.
    pub missing_labels: Vec<String>,
    /// Label file names with no matching image.
    pub orphan_labels: Vec<String>,
}

impl CheckOutcome {
    fn split_label(&self) -> &'static str {
        match self.split {
            Some(split) => split.dir_name(),
            None => "all",
        }
    }
}

impl fmt::Display for CheckOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}: {} image(s), {} label file(s), {} missing label(s), {} orphan label(s)",
            self.split_label(),
            self.images,
            self.labels,
            self.missing_labels.len(),
            self.orphan_labels.len()
        )?;
        for name in &self.missing_labels {
            writeln!(f, "  missing label: {}", name)?;
        }
        for name in &self.orphan_labels {
            writeln!(f, "  orphan label: {}", name)?;
        }
        Ok(())
    }
}

/// Full audit report.
#[derive(Clone, Debug, Default)]
pub struct CheckReport {
    pub splits: Vec<CheckOutcome>,
    /// File names listed in the COCO JSON with no label file anywhere.
    pub json_without_label: Vec<String>,
    /// File names listed in the COCO JSON not found under `images/`.
    pub json_without_image: Vec<String>,
    pub dimension_mismatches: Vec<DimensionMismatch>,
}

impl CheckReport {
    /// True when the audit found no problems.
    pub fn is_clean(&self) -> bool {
        self.splits
            .iter()
            .all(|o| o.missing_labels.is_empty() && o.orphan_labels.is_empty())
            && self.json_without_label.is_empty()
            && self.json_without_image.is_empty()
            && self.dimension_mismatches.is_empty()
    }

    pub fn problem_count(&self) -> usize {
        self.splits
            .iter()
            .map(|o| o.missing_labels.len() + o.orphan_labels.len())
            .sum::<usize>()
            + self.json_without_label.len()
            + self.json_without_image.len()
            + self.dimension_mismatches.len()
    }

    /// One-line summary, used by quiet output.
    pub fn summary(&self) -> String {
        if self.is_clean() {
            "check passed: images and labels are consistent".to_string()
        } else {
            format!("check found {} problem(s)", self.problem_count())
        }
    }
}

impl fmt::Display for CheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for outcome in &self.splits {
            write!(f, "{}", outcome)?;
        }
        for name in &self.json_without_label {
            writeln!(f, "in JSON but no label file: {}", name)?;
        }
        for name in &self.json_without_image {
            writeln!(f, "in JSON but no image on disk: {}", name)?;
        }
        for mismatch in &self.dimension_mismatches {
            writeln!(f, "dimension mismatch: {}", mismatch)?;
        }
        writeln!(f, "{}", self.summary())
    }
}

/// Audits `<dataset_root>/images` against `<dataset_root>/labels`,
/// split by split, and optionally cross-checks a COCO JSON file.
pub fn check_dataset(
    dataset_root: &Path,
    options: &CheckOptions,
) -> Result<CheckReport, LocoprepError> {
    let labels_dir = dataset_root.join("labels");
    let images_dir = dataset_root.join("images");
    layout::require_dir(&labels_dir)?;
    layout::require_dir(&images_dir)?;

    let mut report = CheckReport::default();
    for split in split_pairs(&labels_dir, &images_dir) {
        report.splits.push(check_split(split)?);
    }

    if let Some(json_path) = &options.coco_json {
        cross_check_json(json_path, &labels_dir, &images_dir, options, &mut report)?;
    }

    Ok(report)
}

struct SplitPair {
    split: Option<Split>,
    labels: PathBuf,
    images: PathBuf,
}

/// Pairs labels and images directories by split. The labels side decides
/// the layout; a missing images split directory simply yields no images.
fn split_pairs(labels_dir: &Path, images_dir: &Path) -> Vec<SplitPair> {
    layout::work_dirs(labels_dir)
        .into_iter()
        .map(|(split, labels)| {
            let images = match split {
                Some(split) => images_dir.join(split.dir_name()),
                None => images_dir.to_path_buf(),
            };
            SplitPair {
                split,
                labels,
                images,
            }
        })
        .collect()
}

fn check_split(pair: SplitPair) -> Result<CheckOutcome, LocoprepError> {
    let image_paths = if pair.images.is_dir() {
        layout::collect_files_with_extension(&pair.images, &IMAGE_EXTENSIONS)?
    } else {
        Vec::new()
    };
    let label_paths = label_files(&pair.labels)?;

    let image_stems: BTreeSet<String> = image_paths.iter().filter_map(|p| stem_of(p)).collect();
    let label_stems: BTreeSet<String> = label_paths.iter().filter_map(|p| stem_of(p)).collect();

    let missing_labels = image_paths
        .iter()
        .filter(|p| stem_of(p).is_some_and(|s| !label_stems.contains(&s)))
        .filter_map(|p| file_name_of(p))
        .collect();
    let orphan_labels = label_paths
        .iter()
        .filter(|p| stem_of(p).is_some_and(|s| !image_stems.contains(&s)))
        .filter_map(|p| file_name_of(p))
        .collect();

    Ok(CheckOutcome {
        split: pair.split,
        images: image_paths.len(),
        labels: label_paths.len(),
        missing_labels,
        orphan_labels,
    })
}

fn cross_check_json(
    json_path: &Path,
    labels_dir: &Path,
    images_dir: &Path,
    options: &CheckOptions,
    report: &mut CheckReport,
) -> Result<(), LocoprepError> {
    let dataset = read_coco_json(json_path)?;

    let label_stems: BTreeSet<String> =
        layout::collect_files_with_extension(labels_dir, &[LABEL_EXTENSION])?
            .iter()
            .filter(|p| {
                !file_name_of(p).is_some_and(|n| n.starts_with("InstancesIn_"))
            })
            .filter_map(|p| stem_of(p))
            .collect();
    let images_on_disk: Vec<PathBuf> =
        layout::collect_files_with_extension(images_dir, &IMAGE_EXTENSIONS)?;

    for image in &dataset.images {
        let stem = Path::new(&image.file_name)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        if !label_stems.contains(&stem) {
            report.json_without_label.push(image.file_name.clone());
        }

        let on_disk = images_on_disk
            .iter()
            .find(|p| file_name_of(p).as_deref() == Some(image.file_name.as_str()));
        match on_disk {
            None => report.json_without_image.push(image.file_name.clone()),
            Some(path) if options.verify_dims => {
                let size = imagesize::size(path).map_err(|source| {
                    LocoprepError::ImageDimensionRead {
                        path: path.clone(),
                        source,
                    }
                })?;
                let actual = (size.width as u32, size.height as u32);
                if actual != (image.width, image.height) {
                    report.dimension_mismatches.push(DimensionMismatch {
                        file_name: image.file_name.clone(),
                        expected: (image.width, image.height),
                        actual,
                    });
                }
            }
            Some(_) => {}
        }
    }

    Ok(())
}

fn label_files(dir: &Path) -> Result<Vec<PathBuf>, LocoprepError> {
    Ok(layout::list_files_with_extension(dir, &[LABEL_EXTENSION])?
        .into_iter()
        .filter(|p| !file_name_of(p).is_some_and(|n| n.starts_with("InstancesIn_")))
        .collect())
}

fn stem_of(path: &Path) -> Option<String> {
    path.file_stem().map(|s| s.to_string_lossy().into_owned())
}

fn file_name_of(path: &Path) -> Option<String> {
    path.file_name().map(|s| s.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn make_dataset(root: &Path) {
        let labels = root.join("labels");
        let images = root.join("images/sub1");
        fs::create_dir_all(&labels).expect("create labels");
        fs::create_dir_all(&images).expect("create images");
        fs::write(
            labels.join("frame_001.txt"),
            "2 0.500000 0.500000 0.100000 0.100000\n",
        )
        .expect("write label");
        fs::write(images.join("frame_001.jpg"), b"jpg").expect("write image");
    }

    #[test]
    fn clean_dataset_passes() {
        let temp = tempfile::tempdir().expect("create temp dir");
        make_dataset(temp.path());

        let report =
            check_dataset(temp.path(), &CheckOptions::default()).expect("check should succeed");

        assert!(report.is_clean());
        assert_eq!(report.splits[0].images, 1);
        assert_eq!(report.splits[0].labels, 1);
        assert!(report.summary().contains("check passed"));
    }

    #[test]
    fn reports_missing_and_orphan_labels() {
        let temp = tempfile::tempdir().expect("create temp dir");
        make_dataset(temp.path());
        fs::write(temp.path().join("images/sub1/frame_002.jpg"), b"jpg").expect("write image");
        fs::write(temp.path().join("labels/frame_009.txt"), "").expect("write orphan");

        let report =
            check_dataset(temp.path(), &CheckOptions::default()).expect("check should succeed");

        assert!(!report.is_clean());
        assert_eq!(report.problem_count(), 2);
        assert_eq!(report.splits[0].missing_labels, vec!["frame_002.jpg"]);
        assert_eq!(report.splits[0].orphan_labels, vec!["frame_009.txt"]);
    }

    #[test]
    fn cross_checks_coco_json() {
        let temp = tempfile::tempdir().expect("create temp dir");
        make_dataset(temp.path());
        let json_path = temp.path().join("coco.json");
        fs::write(
            &json_path,
            r#"{
                "images": [
                    {"id": 1, "width": 640, "height": 480, "file_name": "frame_001.jpg"},
                    {"id": 2, "width": 640, "height": 480, "file_name": "frame_777.jpg"}
                ],
                "annotations": [],
                "categories": []
            }"#,
        )
        .expect("write json");

        let options = CheckOptions {
            coco_json: Some(json_path),
            verify_dims: false,
        };
        let report = check_dataset(temp.path(), &options).expect("check should succeed");

        assert_eq!(report.json_without_label, vec!["frame_777.jpg"]);
        assert_eq!(report.json_without_image, vec!["frame_777.jpg"]);
    }

    #[test]
    fn audits_split_layout_per_split() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let train_labels = temp.path().join("labels/train");
        let train_images = temp.path().join("images/train/sub2");
        fs::create_dir_all(&train_labels).expect("create train labels");
        fs::create_dir_all(&train_images).expect("create train images");
        fs::write(train_images.join("frame_010.jpg"), b"jpg").expect("write image");

        let report =
            check_dataset(temp.path(), &CheckOptions::default()).expect("check should succeed");

        assert_eq!(report.splits.len(), 1);
        assert_eq!(report.splits[0].split, Some(Split::Train));
        assert_eq!(report.splits[0].missing_labels, vec!["frame_010.jpg"]);
    }
}
