//! YOLO label file reader and writer.
//!
//! One label file per image, co-named by stem, one object per line:
//! `class_id x_center y_center width height` with the four floats
//! normalized to `[0, 1]` and written at fixed 6-decimal precision.
//! An empty (or absent) file means the image has no annotations.

use std::fs;
use std::io::Write;
use std::path::Path;

use super::bbox::YoloBox;
use super::layout::existing_splits;
use super::{class_names, NUM_CLASSES};
use crate::error::LocoprepError;

/// One parsed row of a YOLO label file.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LabelRow {
    pub class_id: usize,
    pub bbox: YoloBox,
}

/// Formats a label row the way the training pipeline expects it.
pub fn format_label_row(class_id: usize, bbox: &YoloBox) -> String {
    format!(
        "{} {:.6} {:.6} {:.6} {:.6}",
        class_id, bbox.cx, bbox.cy, bbox.w, bbox.h
    )
}

/// Parses one line of a YOLO label file.
///
/// Blank lines yield `Ok(None)`. Anything other than exactly five
/// whitespace-separated tokens is an error; lines with more tokens are
/// segmentation or pose annotations, which LOCO does not use.
pub fn parse_label_line(
    line: &str,
    file_path: &Path,
    line_num: usize,
) -> Result<Option<LabelRow>, LocoprepError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    // Take at most 6 tokens so pathological inputs stay bounded.
    let tokens: Vec<&str> = trimmed.split_whitespace().take(6).collect();

    if tokens.len() != 5 {
        return Err(LocoprepError::LabelParse {
            path: file_path.to_path_buf(),
            line: line_num,
            message: format!("expected 5 tokens, found {}", tokens.len()),
        });
    }

    let class_id = tokens[0]
        .parse::<usize>()
        .map_err(|_| LocoprepError::LabelParse {
            path: file_path.to_path_buf(),
            line: line_num,
            message: format!(
                "invalid class_id '{}'; expected non-negative integer",
                tokens[0]
            ),
        })?;

    let cx = parse_f64_token(tokens[1], "x_center", file_path, line_num)?;
    let cy = parse_f64_token(tokens[2], "y_center", file_path, line_num)?;
    let w = parse_f64_token(tokens[3], "width", file_path, line_num)?;
    let h = parse_f64_token(tokens[4], "height", file_path, line_num)?;

    Ok(Some(LabelRow {
        class_id,
        bbox: YoloBox { cx, cy, w, h },
    }))
}

fn parse_f64_token(
    raw: &str,
    field_name: &str,
    file_path: &Path,
    line_num: usize,
) -> Result<f64, LocoprepError> {
    raw.parse::<f64>()
        .map_err(|_| LocoprepError::LabelParse {
            path: file_path.to_path_buf(),
            line: line_num,
            message: format!("invalid {field_name} '{raw}'; expected floating-point number"),
        })
}

/// Reads every row of a label file. An absent file reads as zero rows.
pub fn read_label_file(path: &Path) -> Result<Vec<LabelRow>, LocoprepError> {
    if !path.is_file() {
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(path).map_err(LocoprepError::Io)?;
    let mut rows = Vec::new();

    for (line_idx, line) in content.lines().enumerate() {
        if let Some(row) = parse_label_line(line, path, line_idx + 1)? {
            rows.push(row);
        }
    }

    Ok(rows)
}

/// Writes a label file; an empty `rows` slice produces an empty file.
pub fn write_label_file(path: &Path, rows: &[(usize, YoloBox)]) -> Result<(), LocoprepError> {
    let mut file = fs::File::create(path).map_err(LocoprepError::Io)?;

    for (class_id, bbox) in rows {
        writeln!(file, "{}", format_label_row(*class_id, bbox)).map_err(LocoprepError::Io)?;
    }

    Ok(())
}

/// Writes the `loco.yaml` dataset description at the dataset root.
///
/// Split keys point at the image directories; when the dataset is still
/// flat a single `path:` key is written instead. Skipped if the file
/// already exists so re-runs leave a hand-edited file alone.
pub fn write_loco_yaml(dataset_root: &Path) -> Result<bool, LocoprepError> {
    let yaml_path = dataset_root.join("loco.yaml");
    if yaml_path.exists() {
        return Ok(false);
    }

    // Training configs want absolute image paths, even when the caller
    // passed a relative dataset root. Fall back to the joined path if
    // `images/` does not exist yet.
    let images_dir = dataset_root.join("images");
    let images_dir = fs::canonicalize(&images_dir).unwrap_or(images_dir);
    let splits = existing_splits(&images_dir);

    let mut yaml = String::new();
    if splits.is_empty() {
        yaml.push_str(&format!("path: {}\n", images_dir.display()));
    } else {
        for split in splits {
            yaml.push_str(&format!(
                "{}: {}\n",
                split.dir_name(),
                images_dir.join(split.dir_name()).display()
            ));
        }
    }

    yaml.push_str(&format!("\nnc: {}\nnames:\n", NUM_CLASSES));
    for (id, name) in class_names().iter().enumerate() {
        yaml.push_str(&format!("  {}: {}\n", id, name));
    }

    fs::write(&yaml_path, yaml).map_err(LocoprepError::Io)?;
    Ok(true)
}
