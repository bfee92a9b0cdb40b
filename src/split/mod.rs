//! Train/val/test assignment of LOCO recording subsets.
//!
//! LOCO ships five recording subsets. A split spec like `2,3,5/1,4/`
//! assigns subsets to train, val, and test. JSON annotation files carry
//! the subset in their name (`...sub3.json`); image subdirectories carry
//! it as a digit in the directory name.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::dataset::layout::{self, Split};
use crate::error::LocoprepError;

/// Highest LOCO recording subset number.
const MAX_SUBSET: u32 = 5;

/// An assignment of recording subsets to splits.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SubsetSplit {
    pub train: Vec<u32>,
    pub val: Vec<u32>,
    pub test: Vec<u32>,
}

impl SubsetSplit {
    /// The split a subset number belongs to, if any.
    pub fn split_for(&self, subset: u32) -> Option<Split> {
        if self.train.contains(&subset) {
            Some(Split::Train)
        } else if self.val.contains(&subset) {
            Some(Split::Val)
        } else if self.test.contains(&subset) {
            Some(Split::Test)
        } else {
            None
        }
    }
}

impl FromStr for SubsetSplit {
    type Err = LocoprepError;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = spec.split('/').collect();
        if parts.len() != 3 {
            return Err(LocoprepError::InvalidSubsetSpec {
                spec: spec.to_string(),
                message: "expected three lists separated by '/'".to_string(),
            });
        }

        let parse_list = |raw: &str| -> Result<Vec<u32>, LocoprepError> {
            if raw.is_empty() {
                return Ok(Vec::new());
            }
            raw.split(',')
                .map(|item| {
                    let n = item.trim().parse::<u32>().map_err(|_| {
                        LocoprepError::InvalidSubsetSpec {
                            spec: spec.to_string(),
                            message: format!("'{}' is not an integer", item.trim()),
                        }
                    })?;
                    if !(1..=MAX_SUBSET).contains(&n) {
                        return Err(LocoprepError::InvalidSubsetSpec {
                            spec: spec.to_string(),
                            message: format!("subset {} is outside 1..={}", n, MAX_SUBSET),
                        });
                    }
                    Ok(n)
                })
                .collect()
        };

        Ok(SubsetSplit {
            train: parse_list(parts[0])?,
            val: parse_list(parts[1])?,
            test: parse_list(parts[2])?,
        })
    }
}

impl fmt::Display for SubsetSplit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let join = |list: &[u32]| {
            list.iter()
                .map(u32::to_string)
                .collect::<Vec<_>>()
                .join(",")
        };
        write!(
            f,
            "{}/{}/{}",
            join(&self.train),
            join(&self.val),
            join(&self.test)
        )
    }
}

/// A report of one `split` run.
#[derive(Clone, Debug, Default)]
pub struct SplitReport {
    /// Annotation JSON files moved into split directories.
    pub moved_json: usize,
    /// Image subdirectories moved into split directories.
    pub moved_image_dirs: usize,
}

impl fmt::Display for SplitReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "moved {} annotation file(s) and {} image subdirectorie(s)",
            self.moved_json, self.moved_image_dirs
        )
    }
}

/// Creates the split directories under `labels/` and `images/` and moves
/// the per-subset annotation files and image subdirectories into them.
///
/// Files and directories whose name carries no subset number, or whose
/// subset is not assigned by the spec, are left in place. Items already
/// inside a split directory are never touched, so re-runs are no-ops.
pub fn assign_subsets(
    dataset_root: &Path,
    split: &SubsetSplit,
) -> Result<SplitReport, LocoprepError> {
    let labels_dir = dataset_root.join("labels");
    let images_dir = dataset_root.join("images");
    layout::require_dir(&labels_dir)?;
    layout::require_dir(&images_dir)?;

    for base in [&labels_dir, &images_dir] {
        for s in Split::ALL {
            fs::create_dir_all(base.join(s.dir_name())).map_err(LocoprepError::Io)?;
        }
    }

    let mut report = SplitReport::default();

    // Annotation files: labels/loco-all-sub3.json -> labels/train/...
    for json_path in layout::list_files_with_extension(&labels_dir, &["json"])? {
        let Some(name) = json_path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some(subset) = subset_number_after_marker(name) else {
            continue;
        };
        if let Some(target) = split.split_for(subset) {
            let destination = labels_dir.join(target.dir_name()).join(name);
            fs::rename(&json_path, &destination).map_err(LocoprepError::Io)?;
            report.moved_json += 1;
        }
    }

    // Image subdirectories: images/sub3/ (or images/subset-3/) -> images/train/sub3/
    for entry in fs::read_dir(&images_dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if Split::ALL.iter().any(|s| s.dir_name() == name) {
            continue;
        }
        let Some(subset) = first_number(name) else {
            continue;
        };
        if let Some(target) = split.split_for(subset) {
            let destination = images_dir.join(target.dir_name()).join(name);
            fs::rename(&path, &destination).map_err(LocoprepError::Io)?;
            report.moved_image_dirs += 1;
        }
    }

    Ok(report)
}

/// Extracts the number following the `sub` marker in a file name
/// (`loco-all-sub3.json` -> 3).
fn subset_number_after_marker(name: &str) -> Option<u32> {
    let idx = name.find("sub")?;
    let digits: String = name[idx + 3..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

/// Extracts the first digit run in a directory name (`subset-3` -> 3).
fn first_number(name: &str) -> Option<u32> {
    let start = name.find(|c: char| c.is_ascii_digit())?;
    let digits: String = name[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_default_spec() {
        let split: SubsetSplit = "2,3,5/1,4/".parse().expect("parse spec");
        assert_eq!(split.train, vec![2, 3, 5]);
        assert_eq!(split.val, vec![1, 4]);
        assert!(split.test.is_empty());
        assert_eq!(split.split_for(3), Some(Split::Train));
        assert_eq!(split.split_for(4), Some(Split::Val));
    }

    #[test]
    fn rejects_malformed_specs() {
        assert!("1,2".parse::<SubsetSplit>().is_err());
        assert!("1/2/3/4".parse::<SubsetSplit>().is_err());
        assert!("a/2/".parse::<SubsetSplit>().is_err());
        assert!("6/1/".parse::<SubsetSplit>().is_err());
        assert!("0/1/".parse::<SubsetSplit>().is_err());
    }

    #[test]
    fn spec_roundtrips_through_display() {
        let split: SubsetSplit = "2,3,5/1,4/".parse().expect("parse spec");
        assert_eq!(split.to_string(), "2,3,5/1,4/");
    }

    #[test]
    fn extracts_subset_numbers() {
        assert_eq!(subset_number_after_marker("loco-all-sub3.json"), Some(3));
        assert_eq!(subset_number_after_marker("sub12-extra.json"), Some(12));
        assert_eq!(subset_number_after_marker("no-marker.json"), None);
        assert_eq!(first_number("subset-4"), Some(4));
        assert_eq!(first_number("nodigits"), None);
    }

    #[test]
    fn moves_files_and_dirs_into_splits() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let labels = temp.path().join("labels");
        let images = temp.path().join("images");
        fs::create_dir_all(&labels).expect("create labels");
        fs::create_dir_all(images.join("sub2")).expect("create sub2");
        fs::create_dir_all(images.join("sub1")).expect("create sub1");
        fs::write(labels.join("loco-all-sub2.json"), "{}").expect("write sub2 json");
        fs::write(labels.join("loco-all-sub1.json"), "{}").expect("write sub1 json");

        let split: SubsetSplit = "2,3,5/1,4/".parse().expect("parse spec");
        let report = assign_subsets(temp.path(), &split).expect("assign should succeed");

        assert_eq!(report.moved_json, 2);
        assert_eq!(report.moved_image_dirs, 2);
        assert!(labels.join("train/loco-all-sub2.json").is_file());
        assert!(labels.join("val/loco-all-sub1.json").is_file());
        assert!(images.join("train/sub2").is_dir());
        assert!(images.join("val/sub1").is_dir());
    }

    #[test]
    fn rerun_moves_nothing() {
        let temp = tempfile::tempdir().expect("create temp dir");
        fs::create_dir_all(temp.path().join("labels")).expect("create labels");
        fs::create_dir_all(temp.path().join("images/sub5")).expect("create sub5");

        let split: SubsetSplit = "2,3,5/1,4/".parse().expect("parse spec");
        assign_subsets(temp.path(), &split).expect("first run");
        let report = assign_subsets(temp.path(), &split).expect("second run");

        assert_eq!(report.moved_json, 0);
        assert_eq!(report.moved_image_dirs, 0);
    }

    #[test]
    fn unassigned_subsets_stay_put() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let labels = temp.path().join("labels");
        fs::create_dir_all(&labels).expect("create labels");
        fs::create_dir_all(temp.path().join("images")).expect("create images");
        fs::write(labels.join("loco-all-sub5.json"), "{}").expect("write json");

        let split: SubsetSplit = "2/1/".parse().expect("parse spec");
        let report = assign_subsets(temp.path(), &split).expect("assign");

        assert_eq!(report.moved_json, 0);
        assert!(labels.join("loco-all-sub5.json").is_file());
    }
}
