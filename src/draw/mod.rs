//! Rendering YOLO bounding boxes onto dataset images.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use image::{Rgb, RgbImage};

use crate::dataset::layout::{self, IMAGE_EXTENSIONS, LABEL_EXTENSION};
use crate::dataset::yolo::{read_label_file, LabelRow};
use crate::dataset::NUM_CLASSES;
use crate::error::LocoprepError;

/// One box colour per class, in YOLO class id order.
const CLASS_COLORS: [Rgb<u8>; NUM_CLASSES] = [
    Rgb([255, 128, 0]),  // small_load_carrier
    Rgb([0, 200, 0]),    // forklift
    Rgb([0, 128, 255]),  // pallet
    Rgb([255, 0, 255]),  // stillage
    Rgb([255, 255, 0]),  // pallet_truck
];

/// Options for [`draw_boxes`].
#[derive(Clone, Debug)]
pub struct DrawOptions {
    /// Only draw boxes with these YOLO class ids. `None` draws all.
    pub class_ids: Option<BTreeSet<usize>>,
    /// Outline thickness in pixels.
    pub thickness: u32,
    /// Output path. Defaults to `<stem>_boxes.jpg` in the current
    /// directory.
    pub output: Option<PathBuf>,
}

impl Default for DrawOptions {
    fn default() -> Self {
        DrawOptions {
            class_ids: None,
            thickness: 2,
            output: None,
        }
    }
}

/// A report of one `draw` run.
#[derive(Clone, Debug)]
pub struct DrawReport {
    pub image: PathBuf,
    pub output: PathBuf,
    pub boxes_drawn: usize,
    pub boxes_skipped: usize,
}

impl fmt::Display for DrawReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "drew {} box(es) from {} onto {}",
            self.boxes_drawn,
            self.image.display(),
            self.output.display()
        )?;
        if self.boxes_skipped > 0 {
            writeln!(f, "skipped {} box(es) outside the class filter", self.boxes_skipped)?;
        }
        Ok(())
    }
}

/// Locates `image_name` under `<dataset_root>/images`, overlays the
/// boxes from its label file, and writes the result.
///
/// An absent label file means the image has no annotations and the copy
/// is written without boxes.
pub fn draw_boxes(
    dataset_root: &Path,
    image_name: &str,
    options: &DrawOptions,
) -> Result<DrawReport, LocoprepError> {
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

    let images_dir = dataset_root.join("images");
    layout::require_dir(&images_dir)?;

    let image_path = locate_image(&images_dir, image_name)?;
    let stem = image_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let rows = match locate_label(&dataset_root.join("labels"), &stem)? {
        Some(label_path) => read_label_file(&label_path)?,
        None => Vec::new(),
    };

    let mut canvas = image::open(&image_path)
        .map_err(|source| LocoprepError::Image {
            path: image_path.clone(),
            source,
        })?
        .to_rgb8();

    let mut drawn = 0;
    let mut skipped = 0;
    for row in &rows {
        if wanted(options, row) {
            draw_box(&mut canvas, row, options.thickness);
            drawn += 1;
        } else {
            skipped += 1;
        }
    }

    let output = match &options.output {
        Some(path) => path.clone(),
        None => PathBuf::from(format!("{}_boxes.jpg", stem)),
    };
    canvas.save(&output).map_err(|source| LocoprepError::Image {
        path: output.clone(),
        source,
    })?;

    Ok(DrawReport {
        image: image_path,
        output,
        boxes_drawn: drawn,
        boxes_skipped: skipped,
    })
}

fn wanted(options: &DrawOptions, row: &LabelRow) -> bool {
    match &options.class_ids {
        Some(ids) => ids.contains(&row.class_id),
        None => true,
    }
}

/// Finds the named image anywhere under `images/`, matching by full
/// file name or by stem when no extension was given.
fn locate_image(images_dir: &Path, image_name: &str) -> Result<PathBuf, LocoprepError> {
    let has_ext = Path::new(image_name).extension().is_some();
    for path in layout::collect_files_with_extension(images_dir, &IMAGE_EXTENSIONS)? {
        let matches = if has_ext {
            path.file_name().and_then(|n| n.to_str()) == Some(image_name)
        } else {
            path.file_stem().and_then(|n| n.to_str()) == Some(image_name)
        };
        if matches {
            return Ok(path);
        }
    }
    Err(LocoprepError::ImageNotFound {
        name: image_name.to_string(),
        root: images_dir.to_path_buf(),
    })
}

fn locate_label(labels_dir: &Path, stem: &str) -> Result<Option<PathBuf>, LocoprepError> {
    if !labels_dir.is_dir() {
        return Ok(None);
    }
    let target = format!("{}.{}", stem, LABEL_EXTENSION);
    Ok(
        layout::collect_files_with_extension(labels_dir, &[LABEL_EXTENSION])?
            .into_iter()
            .find(|path| path.file_name().and_then(|n| n.to_str()) == Some(target.as_str())),
    )
}

/// Draws a hollow rectangle for one label row, clamped to the image.
fn draw_box(canvas: &mut RgbImage, row: &LabelRow, thickness: u32) {
    let (width, height) = canvas.dimensions();
    let (x_min, y_min, x_max, y_max) = row.bbox.corners(width, height);

    let x_min = x_min.round().max(0.0) as u32;
    let y_min = y_min.round().max(0.0) as u32;
    let x_max = (x_max.round() as i64).clamp(0, width as i64 - 1) as u32;
    let y_max = (y_max.round() as i64).clamp(0, height as i64 - 1) as u32;
    if x_min > x_max || y_min > y_max {
        return;
    }

    let color = CLASS_COLORS[row.class_id.min(NUM_CLASSES - 1)];
    let thickness = thickness.max(1);

    for offset in 0..thickness {
        for x in x_min..=x_max {
            put(canvas, x, y_min.saturating_add(offset).min(y_max), color);
            put(canvas, x, y_max.saturating_sub(offset).max(y_min), color);
        }
        for y in y_min..=y_max {
            put(canvas, x_min.saturating_add(offset).min(x_max), y, color);
            put(canvas, x_max.saturating_sub(offset).max(x_min), y, color);
        }
    }
}

fn put(canvas: &mut RgbImage, x: u32, y: u32, color: Rgb<u8>) {
    if x < canvas.width() && y < canvas.height() {
        canvas.put_pixel(x, y, color);
    }
}
