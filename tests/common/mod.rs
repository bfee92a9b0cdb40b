use std::fs;
use std::path::Path;

use image::{Rgb, RgbImage};

/// COCO JSON for recording subset 2: two frames, two annotations on the
/// first, none on the second.
pub const SUB2_JSON: &str = r#"{
    "images": [
        {"id": 1, "width": 640, "height": 480, "file_name": "frame_001.jpg"},
        {"id": 2, "width": 640, "height": 480, "file_name": "frame_002.jpg"}
    ],
    "categories": [
        {"id": 3, "name": "small_load_carrier"},
        {"id": 7, "name": "pallet"}
    ],
    "annotations": [
        {"id": 10, "image_id": 1, "category_id": 7, "bbox": [10.0, 20.0, 90.0, 60.0]},
        {"id": 11, "image_id": 1, "category_id": 3, "bbox": [0.0, 0.0, 64.0, 48.0]}
    ]
}"#;

/// COCO JSON for recording subset 1: one frame with one forklift.
pub const SUB1_JSON: &str = r#"{
    "images": [
        {"id": 101, "width": 640, "height": 480, "file_name": "frame_101.jpg"}
    ],
    "categories": [
        {"id": 5, "name": "forklift"}
    ],
    "annotations": [
        {"id": 20, "image_id": 101, "category_id": 5, "bbox": [100.0, 100.0, 200.0, 100.0]}
    ]
}"#;

/// Expected YOLO rows for frame_001 after converting [`SUB2_JSON`].
pub const FRAME_001_LABELS: &str =
    "2 0.085938 0.104167 0.140625 0.125000\n0 0.050000 0.050000 0.100000 0.100000\n";

pub fn write_jpg(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    RgbImage::from_pixel(width, height, Rgb([255, 255, 255]))
        .save(path)
        .expect("write jpg file");
}

/// Lays out a LOCO tree the way a fresh download looks: per-subset COCO
/// JSON under `labels/` and per-subset image directories under
/// `images/`.
pub fn write_loco_tree(root: &Path) {
    let labels = root.join("labels");
    fs::create_dir_all(&labels).expect("create labels dir");
    fs::write(labels.join("loco-all-sub2.json"), SUB2_JSON).expect("write sub2 json");

    write_jpg(&root.join("images/sub2/frame_001.jpg"), 640, 480);
    write_jpg(&root.join("images/sub2/frame_002.jpg"), 640, 480);
}

/// Like [`write_loco_tree`] but with a second recording subset, so the
/// default split assignment produces both a train and a val side.
pub fn write_two_subset_tree(root: &Path) {
    write_loco_tree(root);
    fs::write(root.join("labels/loco-all-sub1.json"), SUB1_JSON).expect("write sub1 json");
    write_jpg(&root.join("images/sub1/frame_101.jpg"), 640, 480);
}
