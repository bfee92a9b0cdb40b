//! Image-tree flattening.
//!
//! The LOCO download nests images in per-recording subdirectories
//! (`images/sub1/scene-17/...`). YOLO training expects every image of a
//! split directly inside the split directory. Flattening moves images
//! up and deletes the emptied subdirectories; a split with no nested
//! subdirectories is already flat and left untouched.

use std::fmt;
use std::fs;
use std::path::Path;

use walkdir::WalkDir;

use crate::dataset::layout::{self, Split, IMAGE_EXTENSIONS};
use crate::error::LocoprepError;

/// A report of one `flatten` run.
#[derive(Clone, Debug, Default)]
pub struct FlattenReport {
    pub splits: Vec<FlattenOutcome>,
}

/// The outcome of flattening one split directory.
#[derive(Clone, Debug, Default)]
pub struct FlattenOutcome {
    pub split: Option<Split>,
    /// Images moved up to the split root.
    pub moved: usize,
    /// Emptied subdirectories removed.
    pub removed_dirs: usize,
}

impl FlattenReport {
    pub fn moved(&self) -> usize {
        self.splits.iter().map(|s| s.moved).sum()
    }
}

impl fmt::Display for FlattenReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for outcome in &self.splits {
            let label = match outcome.split {
                Some(split) => split.dir_name(),
                None => "images",
            };
            if outcome.moved == 0 && outcome.removed_dirs == 0 {
                writeln!(f, "{}: already flat", label)?;
            } else {
                writeln!(
                    f,
                    "{}: moved {} image(s), removed {} subdirectorie(s)",
                    label, outcome.moved, outcome.removed_dirs
                )?;
            }
        }
        Ok(())
    }
}

/// Flattens `<dataset_root>/images` (split-aware) into a flat per-split
/// layout.
///
/// A name collision at the destination aborts with an error rather than
/// silently overwriting.
pub fn flatten_images(dataset_root: &Path) -> Result<FlattenReport, LocoprepError> {
    let images_dir = dataset_root.join("images");
    layout::require_dir(&images_dir)?;

    let mut report = FlattenReport::default();
    for (split, dir) in layout::work_dirs(&images_dir) {
        report.splits.push(flatten_dir(&dir, split)?);
    }

    Ok(report)
}

fn flatten_dir(dir: &Path, split: Option<Split>) -> Result<FlattenOutcome, LocoprepError> {
    let mut outcome = FlattenOutcome {
        split,
        ..Default::default()
    };

    // Collect nested images first. min_depth(2) leaves already-flat
    // files alone.
    let mut nested = Vec::new();
    for entry in WalkDir::new(dir).min_depth(2).follow_links(false) {
        let entry = entry.map_err(|source| match source.into_io_error() {
            Some(io) => LocoprepError::Io(io),
            None => LocoprepError::MissingDirectory {
                path: dir.to_path_buf(),
            },
        })?;

        if entry.file_type().is_file() && layout::has_extension(entry.path(), &IMAGE_EXTENSIONS) {
            nested.push(entry.path().to_path_buf());
        }
    }

    // Check every destination before the first rename, so a collision
    // leaves the tree exactly as it was.
    let mut claimed = std::collections::BTreeSet::new();
    for path in &nested {
        let Some(file_name) = path.file_name() else {
            continue;
        };
        let destination = dir.join(file_name);
        if destination.exists() || !claimed.insert(destination.clone()) {
            return Err(LocoprepError::DuplicateImage { path: destination });
        }
    }

    for path in &nested {
        let Some(file_name) = path.file_name() else {
            continue;
        };
        fs::rename(path, dir.join(file_name)).map_err(LocoprepError::Io)?;
        outcome.moved += 1;
    }

    // Remove emptied subdirectories, deepest first.
    let mut subdirs: Vec<_> = WalkDir::new(dir)
        .min_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_dir())
        .map(|e| e.path().to_path_buf())
        .collect();
    subdirs.sort_by_key(|p| std::cmp::Reverse(p.components().count()));

    for subdir in subdirs {
        if fs::read_dir(&subdir)?.next().is_none() {
            fs::remove_dir(&subdir).map_err(LocoprepError::Io)?;
            outcome.removed_dirs += 1;
        }
    }

    Ok(outcome)
}
