//! Core data model for LOCO dataset tooling.
//!
//! The LOCO dataset ships COCO-style JSON annotations; YOLO training
//! consumes plain-text label files with normalized center/size boxes.
//! This module defines both box representations, the fixed LOCO class
//! table, and the readers/writers for the two on-disk formats.

mod bbox;
mod classes;
pub mod coco;
pub mod layout;
pub mod yolo;

pub use bbox::{PixelBox, YoloBox};
pub use classes::{class_name, class_names, yolo_class_id, NUM_CLASSES};
pub use layout::Split;
