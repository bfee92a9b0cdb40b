//! Directory layout helpers for the LOCO dataset tree.
//!
//! A dataset root holds `images/` and `labels/`, each either flat or
//! split into `train/`, `val/`, `test/` subdirectories. Every operation
//! in this crate is split-aware: it discovers which splits exist and
//! works per split, falling back to the flat directory when none do.

use std::fmt;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::LocoprepError;

/// Image file extensions recognized in the LOCO tree.
pub const IMAGE_EXTENSIONS: [&str; 2] = ["jpg", "jpeg"];

/// Extension of YOLO label files.
pub const LABEL_EXTENSION: &str = "txt";

/// A train/val/test split of the dataset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Split {
    Train,
    Val,
    Test,
}

impl Split {
    /// All splits in canonical order.
    pub const ALL: [Split; 3] = [Split::Train, Split::Val, Split::Test];

    /// The directory name of this split.
    pub fn dir_name(&self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Val => "val",
            Split::Test => "test",
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Returns the splits that exist as subdirectories of `dir`.
pub fn existing_splits(dir: &Path) -> Vec<Split> {
    Split::ALL
        .into_iter()
        .filter(|split| dir.join(split.dir_name()).is_dir())
        .collect()
}

/// Returns the directories an operation should work on: one per existing
/// split, or the directory itself when no split layout is present.
pub fn work_dirs(dir: &Path) -> Vec<(Option<Split>, PathBuf)> {
    let splits = existing_splits(dir);
    if splits.is_empty() {
        vec![(None, dir.to_path_buf())]
    } else {
        splits
            .into_iter()
            .map(|split| (Some(split), dir.join(split.dir_name())))
            .collect()
    }
}

/// Errors unless `dir` exists and is a directory.
pub fn require_dir(dir: &Path) -> Result<(), LocoprepError> {
    if dir.is_dir() {
        Ok(())
    } else {
        Err(LocoprepError::MissingDirectory {
            path: dir.to_path_buf(),
        })
    }
}

/// Returns true if `path` has one of the `allowed` extensions
/// (ASCII case-insensitive).
pub fn has_extension(path: &Path, allowed: &[&str]) -> bool {
    let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
        return false;
    };

    allowed
        .iter()
        .any(|allowed_ext| ext.eq_ignore_ascii_case(allowed_ext))
}

/// Lists files with one of the `allowed` extensions directly inside
/// `dir` (non-recursive), sorted by file name.
pub fn list_files_with_extension(
    dir: &Path,
    allowed: &[&str],
) -> Result<Vec<PathBuf>, LocoprepError> {
    let mut files = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() && has_extension(&path, allowed) {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

/// Recursively collects files with one of the `allowed` extensions under
/// `root`, sorted by path.
pub fn collect_files_with_extension(
    root: &Path,
    allowed: &[&str],
) -> Result<Vec<PathBuf>, LocoprepError> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root).follow_links(true) {
        let entry = entry.map_err(|source| match source.into_io_error() {
            Some(io) => LocoprepError::Io(io),
            None => LocoprepError::MissingDirectory {
                path: root.to_path_buf(),
            },
        })?;

        if entry.file_type().is_file() && has_extension(entry.path(), allowed) {
            files.push(entry.path().to_path_buf());
        }
    }

    files.sort();
    Ok(files)
}

/// Swaps the extension of an image file name for the label extension.
pub fn label_file_name(image_file_name: &str) -> String {
    Path::new(image_file_name)
        .with_extension(LABEL_EXTENSION)
        .to_string_lossy()
        .into_owned()
}
