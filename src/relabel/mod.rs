//! Removing a class from YOLO label files and renumbering the rest.

use std::fmt;
use std::path::Path;

use crate::dataset::layout::{self, LABEL_EXTENSION};
use crate::dataset::yolo::{read_label_file, write_label_file};
use crate::dataset::NUM_CLASSES;
use crate::error::LocoprepError;

/// A report of one `strip-class` run.
#[derive(Clone, Debug, Default)]
pub struct StripReport {
    pub files_seen: usize,
    pub files_changed: usize,
    pub rows_removed: usize,
    pub rows_renumbered: usize,
}

impl fmt::Display for StripReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "removed {} row(s) and renumbered {} row(s) across {} of {} label file(s)",
            self.rows_removed, self.rows_renumbered, self.files_changed, self.files_seen
        )
    }
}

/// Deletes every row of `class_id` from the label files under
/// `<dataset_root>/labels` and shifts the ids above it down by one.
///
/// Files that end up with no rows are rewritten empty rather than
/// deleted, so the one-label-file-per-image pairing survives.
pub fn strip_class(dataset_root: &Path, class_id: usize) -> Result<StripReport, LocoprepError> {
    if class_id >= NUM_CLASSES {
        return Err(LocoprepError::InvalidClassId {
            id: class_id,
            max: NUM_CLASSES - 1,
        });
    }

    let labels_dir = dataset_root.join("labels");
    layout::require_dir(&labels_dir)?;

    let mut report = StripReport::default();
    for label_path in layout::collect_files_with_extension(&labels_dir, &[LABEL_EXTENSION])? {
        if label_path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with("InstancesIn_"))
        {
            continue;
        }

        report.files_seen += 1;
        let rows = read_label_file(&label_path)?;

        let mut kept = Vec::with_capacity(rows.len());
        let mut removed = 0;
        let mut renumbered = 0;
        for row in rows {
            if row.class_id == class_id {
                removed += 1;
            } else if row.class_id > class_id {
                kept.push((row.class_id - 1, row.bbox));
                renumbered += 1;
            } else {
                kept.push((row.class_id, row.bbox));
            }
        }

        if removed > 0 || renumbered > 0 {
            write_label_file(&label_path, &kept)?;
            report.files_changed += 1;
            report.rows_removed += removed;
            report.rows_renumbered += renumbered;
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn strips_class_and_renumbers_the_rest() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let labels = temp.path().join("labels");
        fs::create_dir_all(&labels).expect("create labels");
        fs::write(
            labels.join("frame_001.txt"),
            "0 0.100000 0.100000 0.050000 0.050000\n\
             2 0.500000 0.500000 0.100000 0.100000\n\
             4 0.900000 0.900000 0.050000 0.050000\n",
        )
        .expect("write label");

        let report = strip_class(temp.path(), 0).expect("strip should succeed");

        assert_eq!(report.files_changed, 1);
        assert_eq!(report.rows_removed, 1);
        assert_eq!(report.rows_renumbered, 2);
        let contents = fs::read_to_string(labels.join("frame_001.txt")).expect("read label");
        assert_eq!(
            contents,
            "1 0.500000 0.500000 0.100000 0.100000\n\
             3 0.900000 0.900000 0.050000 0.050000\n"
        );
    }

    #[test]
    fn ids_below_the_stripped_class_keep_their_value() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let labels = temp.path().join("labels");
        fs::create_dir_all(&labels).expect("create labels");
        fs::write(
            labels.join("frame_001.txt"),
            "1 0.200000 0.200000 0.100000 0.100000\n\
             3 0.600000 0.600000 0.100000 0.100000\n",
        )
        .expect("write label");

        strip_class(temp.path(), 3).expect("strip should succeed");

        let contents =
            fs::read_to_string(labels.join("frame_001.txt")).expect("read label");
        assert_eq!(contents, "1 0.200000 0.200000 0.100000 0.100000\n");
    }

    #[test]
    fn file_with_only_the_stripped_class_becomes_empty() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let labels = temp.path().join("labels");
        fs::create_dir_all(&labels).expect("create labels");
        fs::write(
            labels.join("frame_002.txt"),
            "0 0.500000 0.500000 0.100000 0.100000\n",
        )
        .expect("write label");

        let report = strip_class(temp.path(), 0).expect("strip should succeed");

        assert_eq!(report.rows_removed, 1);
        let path = labels.join("frame_002.txt");
        assert!(path.is_file());
        assert_eq!(fs::read_to_string(&path).expect("read label"), "");
    }

    #[test]
    fn untouched_files_are_not_rewritten() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let labels = temp.path().join("labels");
        fs::create_dir_all(&labels).expect("create labels");
        fs::write(
            labels.join("frame_003.txt"),
            "1 0.500000 0.500000 0.100000 0.100000\n",
        )
        .expect("write label");

        let report = strip_class(temp.path(), 3).expect("strip should succeed");

        assert_eq!(report.files_seen, 1);
        assert_eq!(report.files_changed, 0);
    }

    #[test]
    fn walks_split_layout() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let train = temp.path().join("labels/train");
        let val = temp.path().join("labels/val");
        fs::create_dir_all(&train).expect("create train");
        fs::create_dir_all(&val).expect("create val");
        fs::write(
            train.join("a.txt"),
            "0 0.500000 0.500000 0.100000 0.100000\n",
        )
        .expect("write train label");
        fs::write(val.join("b.txt"), "0 0.400000 0.400000 0.100000 0.100000\n")
            .expect("write val label");

        let report = strip_class(temp.path(), 0).expect("strip should succeed");

        assert_eq!(report.files_changed, 2);
        assert_eq!(report.rows_removed, 2);
    }

    #[test]
    fn rejects_out_of_range_class_id() {
        let temp = tempfile::tempdir().expect("create temp dir");
        fs::create_dir_all(temp.path().join("labels")).expect("create labels");

        let err = strip_class(temp.path(), 9).expect_err("must reject id 9");
        assert!(matches!(err, LocoprepError::InvalidClassId { id: 9, .. }));
    }
}
