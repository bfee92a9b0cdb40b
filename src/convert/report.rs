//! Report types for annotation conversion runs.

use serde::Serialize;
use std::fmt;

use crate::dataset::Split;

/// A report of one `convert` run over a dataset tree.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ConvertReport {
    /// Per-directory outcomes, one per split (or one for a flat layout).
    pub splits: Vec<SplitOutcome>,
    /// Whether this run created the `loco.yaml` description file.
    pub wrote_loco_yaml: bool,
}

impl ConvertReport {
    /// Total label files written across all splits.
    pub fn label_files(&self) -> usize {
        self.splits.iter().map(|s| s.label_files).sum()
    }

    /// Total annotations converted across all splits.
    pub fn annotations(&self) -> usize {
        self.splits.iter().map(|s| s.annotations).sum()
    }

    /// Returns true if every split was already converted.
    pub fn is_noop(&self) -> bool {
        self.splits.iter().all(|s| s.already_converted)
    }
}

impl fmt::Display for ConvertReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for outcome in &self.splits {
            writeln!(f, "{}", outcome)?;
        }
        if self.wrote_loco_yaml {
            writeln!(f, "wrote loco.yaml")?;
        }
        if self.is_noop() {
            writeln!(f, "nothing to do: no COCO JSON files left")?;
        }
        Ok(())
    }
}

/// The outcome of converting one directory.
#[derive(Clone, Debug, Default, Serialize)]
pub struct SplitOutcome {
    /// The split this directory belongs to; `None` for a flat layout.
    pub split: Option<Split>,
    /// COCO JSON files processed.
    pub json_files: usize,
    /// Label files written (one per image).
    pub label_files: usize,
    /// Label files written empty (images with zero annotations).
    pub empty_label_files: usize,
    /// Annotations converted.
    pub annotations: usize,
    /// True when the directory held no JSON files and was left untouched.
    pub already_converted: bool,
}

impl SplitOutcome {
    pub fn new(split: Option<Split>) -> Self {
        Self {
            split,
            ..Default::default()
        }
    }

    fn split_label(&self) -> &str {
        match self.split {
            Some(Split::Train) => "train",
            Some(Split::Val) => "val",
            Some(Split::Test) => "test",
            None => "labels",
        }
    }
}

impl fmt::Display for SplitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.already_converted {
            return write!(f, "{}: already converted, skipped", self.split_label());
        }

        write!(
            f,
            "{}: {} JSON file(s) -> {} label file(s), {} annotation(s), {} empty",
            self.split_label(),
            self.json_files,
            self.label_files,
            self.annotations,
            self.empty_label_files
        )
    }
}

// Serialize Split as its directory name so JSON reports stay readable.
impl Serialize for Split {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.dir_name())
    }
}
