//! COCO JSON reader and writer for the LOCO annotation files.
//!
//! The LOCO dataset distributes one COCO-style JSON per recording subset
//! (`loco-all-sub1.json` and friends). The schema here is deliberately
//! tolerant: optional blocks default instead of failing, and extra
//! fields such as segmentation are accepted and ignored.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::LocoprepError;

/// Top-level COCO dataset structure.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CocoDataset {
    #[serde(default)]
    pub images: Vec<CocoImage>,

    #[serde(default)]
    pub annotations: Vec<CocoAnnotation>,

    #[serde(default)]
    pub categories: Vec<CocoCategory>,
}

/// COCO image entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CocoImage {
    pub id: u64,
    pub width: u32,
    pub height: u32,
    pub file_name: String,
}

/// COCO category entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CocoCategory {
    pub id: u64,
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supercategory: Option<String>,
}

/// COCO annotation entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CocoAnnotation {
    pub id: u64,
    pub image_id: u64,
    pub category_id: u64,

    /// COCO bbox format: [x, y, width, height] with (x,y) as top-left corner.
    pub bbox: [f64; 4],

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iscrowd: Option<u8>,
}

impl CocoDataset {
    /// Returns the annotations attached to the image with `image_id`,
    /// in file order.
    pub fn annotations_for_image(&self, image_id: u64) -> Vec<&CocoAnnotation> {
        self.annotations
            .iter()
            .filter(|ann| ann.image_id == image_id)
            .collect()
    }

    /// Merges `other` into `self`, deduplicating categories by id.
    ///
    /// Images and annotations are concatenated as-is; the per-subset
    /// LOCO files use globally unique ids so no renumbering is needed.
    pub fn merge(&mut self, other: CocoDataset) {
        let known: BTreeSet<u64> = self.categories.iter().map(|c| c.id).collect();

        self.images.extend(other.images);
        self.annotations.extend(other.annotations);
        self.categories
            .extend(other.categories.into_iter().filter(|c| !known.contains(&c.id)));
    }

    /// Returns true if the dataset holds no images, categories, or
    /// annotations.
    pub fn is_empty(&self) -> bool {
        self.images.is_empty() && self.categories.is_empty() && self.annotations.is_empty()
    }
}

/// Reads a COCO dataset from a JSON file.
pub fn read_coco_json(path: &Path) -> Result<CocoDataset, LocoprepError> {
    let file = File::open(path).map_err(LocoprepError::Io)?;
    let reader = BufReader::new(file);

    serde_json::from_reader(reader).map_err(|source| LocoprepError::CocoJsonParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes a COCO dataset to a JSON file.
pub fn write_coco_json(path: &Path, dataset: &CocoDataset) -> Result<(), LocoprepError> {
    let file = File::create(path).map_err(LocoprepError::Io)?;
    let writer = BufWriter::new(file);

    serde_json::to_writer_pretty(writer, dataset).map_err(|source| LocoprepError::CocoJsonWrite {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads a COCO dataset from a JSON string. Useful for testing without
/// file I/O.
pub fn from_coco_str(json: &str) -> Result<CocoDataset, serde_json::Error> {
    serde_json::from_str(json)
}
