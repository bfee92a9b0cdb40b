use std::path::PathBuf;
use thiserror::Error;

/// The main error type for locoprep operations.
#[derive(Debug, Error)]
pub enum LocoprepError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse COCO JSON from {path}: {source}")]
    CocoJsonParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write COCO JSON to {path}: {source}")]
    CocoJsonWrite {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse label file {path} at line {line}: {message}")]
    LabelParse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Unknown LOCO category id {id} in {path} (known ids: 3, 5, 7, 10, 11)")]
    UnknownCategory { id: u64, path: PathBuf },

    #[error("Directory {path} does not exist")]
    MissingDirectory { path: PathBuf },

    #[error("Image '{name}' not found under {root}")]
    ImageNotFound { name: String, root: PathBuf },

    #[error("Failed to read/write image {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to read dimensions of {path}: {source}")]
    ImageDimensionRead {
        path: PathBuf,
        #[source]
        source: imagesize::ImageError,
    },

    #[error("Invalid subset split '{spec}': {message}")]
    InvalidSubsetSpec { spec: String, message: String },

    #[error("Invalid class id {id} (valid ids: 0..={max})")]
    InvalidClassId { id: usize, max: usize },

    #[error("Refusing to overwrite existing file {path} while flattening")]
    DuplicateImage { path: PathBuf },

    #[error("Check found {problems} problem(s)")]
    CheckFailed { problems: usize },
}
