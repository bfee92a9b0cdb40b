//! Per-class instance counting over YOLO label files.

use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::dataset::layout::{self, Split, LABEL_EXTENSION};
use crate::dataset::yolo::read_label_file;
use crate::dataset::{class_name, NUM_CLASSES};
use crate::error::LocoprepError;

/// Options for [`count_instances`].
#[derive(Clone, Debug, Default)]
pub struct CountOptions {
    /// Restrict counting to these YOLO class ids. `None` counts all.
    pub class_ids: Option<BTreeSet<usize>>,
    /// Write an `InstancesIn_<split>.txt` listing of matching label files
    /// next to the labels that were counted.
    pub write_lists: bool,
}

impl CountOptions {
    fn counts(&self, class_id: usize) -> bool {
        match &self.class_ids {
            Some(ids) => ids.contains(&class_id),
            None => true,
        }
    }
}

/// Counting results for one labels directory.
#[derive(Clone, Debug)]
pub struct CountOutcome {
    pub split: Option<Split>,
    /// Label files inspected.
    pub label_files: usize,
    /// Label files containing at least one counted instance.
    pub matching_files: usize,
    /// Counted instances per YOLO class id.
    pub per_class: [usize; NUM_CLASSES],
    /// Rows with a class id outside the LOCO table. Counted so corrupt
    /// labels show up instead of vanishing from the totals.
    pub unknown: usize,
    /// Listing file written, if any.
    pub list_path: Option<PathBuf>,
}

impl CountOutcome {
    pub fn instances(&self) -> usize {
        self.per_class.iter().sum::<usize>() + self.unknown
    }

    fn split_label(&self) -> &'static str {
        match self.split {
            Some(split) => split.dir_name(),
            None => "all",
        }
    }
}

impl fmt::Display for CountOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}: {} instance(s) in {} of {} label file(s)",
            self.split_label(),
            self.instances(),
            self.matching_files,
            self.label_files
        )?;
        for (class_id, count) in self.per_class.iter().enumerate() {
            if *count > 0 {
                let name = class_name(class_id).unwrap_or("unknown");
                writeln!(f, "  {}: {}", name, count)?;
            }
        }
        if self.unknown > 0 {
            writeln!(f, "  unknown class ids: {}", self.unknown)?;
        }
        if let Some(path) = &self.list_path {
            writeln!(f, "  wrote {}", path.display())?;
        }
        Ok(())
    }
}

/// Full counting report across all splits.
#[derive(Clone, Debug, Default)]
pub struct CountReport {
    pub splits: Vec<CountOutcome>,
}

impl CountReport {
    pub fn instances(&self) -> usize {
        self.splits.iter().map(CountOutcome::instances).sum()
    }
}

impl fmt::Display for CountReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for outcome in &self.splits {
            write!(f, "{}", outcome)?;
        }
        if self.splits.len() > 1 {
            writeln!(f, "total: {} instance(s)", self.instances())?;
        }
        Ok(())
    }
}

/// Counts class instances across the label files under
/// `<dataset_root>/labels`, split by split, optionally writing a listing
/// of the files that contained a counted instance.
pub fn count_instances(
    dataset_root: &Path,
    options: &CountOptions,
) -> Result<CountReport, LocoprepError> {
    if let Some(ids) = &options.class_ids {
        for id in ids {
            if *id >= NUM_CLASSES {
                return Err(LocoprepError::InvalidClassId {
                    id: *id,
                    max: NUM_CLASSES - 1,
                });
            }
        }
    }

    let labels_dir = dataset_root.join("labels");
    layout::require_dir(&labels_dir)?;

    let mut report = CountReport::default();
    for (split, dir) in layout::work_dirs(&labels_dir) {
        report
            .splits
            .push(count_dir(split, &dir, options)?);
    }
    Ok(report)
}

fn count_dir(
    split: Option<Split>,
    dir: &Path,
    options: &CountOptions,
) -> Result<CountOutcome, LocoprepError> {
    let mut outcome = CountOutcome {
        split,
        label_files: 0,
        matching_files: 0,
        per_class: [0; NUM_CLASSES],
        unknown: 0,
        list_path: None,
    };

    let mut matching_names: Vec<String> = Vec::new();
    for label_path in layout::list_files_with_extension(dir, &[LABEL_EXTENSION])? {
        // Listing files from earlier runs must not be counted as labels.
        let Some(name) = label_path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name.starts_with("InstancesIn_") {
            continue;
        }

        outcome.label_files += 1;
        let mut matched = false;
        for row in read_label_file(&label_path)? {
            if row.class_id >= NUM_CLASSES {
                // Rows outside the class table only match an unfiltered
                // count; a filter can never name them.
                if options.class_ids.is_none() {
                    outcome.unknown += 1;
                    matched = true;
                }
            } else if options.counts(row.class_id) {
                outcome.per_class[row.class_id] += 1;
                matched = true;
            }
        }
        if matched {
            outcome.matching_files += 1;
            matching_names.push(name.to_string());
        }
    }

    if options.write_lists && !matching_names.is_empty() {
        let list_path = dir.join(format!("InstancesIn_{}.txt", outcome.split_label()));
        let mut contents = matching_names.join("\n");
        contents.push('\n');
        fs::write(&list_path, contents).map_err(LocoprepError::Io)?;
        outcome.list_path = Some(list_path);
    }

    Ok(outcome)
}
