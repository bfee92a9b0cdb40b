//! The fixed LOCO class table.
//!
//! The upstream COCO-style JSON uses sparse category ids; YOLO training
//! wants dense zero-based class ids. The mapping never changes, so it
//! lives here as a constant table rather than being read from the data.

/// `(COCO category id, class name)` in YOLO class-id order.
pub const LOCO_CLASSES: [(u64, &str); 5] = [
    (3, "small_load_carrier"),
    (5, "forklift"),
    (7, "pallet"),
    (10, "stillage"),
    (11, "pallet_truck"),
];

/// Number of LOCO classes after remapping.
pub const NUM_CLASSES: usize = LOCO_CLASSES.len();

/// Maps a sparse COCO category id to its dense YOLO class id.
///
/// Returns `None` for ids outside the LOCO taxonomy; callers decide
/// whether that is an error (conversion) or skippable (auditing).
pub fn yolo_class_id(coco_category_id: u64) -> Option<usize> {
    LOCO_CLASSES
        .iter()
        .position(|(coco_id, _)| *coco_id == coco_category_id)
}

/// Returns the class name for a dense YOLO class id.
pub fn class_name(yolo_id: usize) -> Option<&'static str> {
    LOCO_CLASSES.get(yolo_id).map(|(_, name)| *name)
}

/// Returns all class names in YOLO class-id order.
pub fn class_names() -> [&'static str; NUM_CLASSES] {
    let mut names = [""; NUM_CLASSES];
    let mut i = 0;
    while i < NUM_CLASSES {
        names[i] = LOCO_CLASSES[i].1;
        i += 1;
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sparse_ids_map_to_dense_ids() {
        assert_eq!(yolo_class_id(3), Some(0));
        assert_eq!(yolo_class_id(5), Some(1));
        assert_eq!(yolo_class_id(7), Some(2));
        assert_eq!(yolo_class_id(10), Some(3));
        assert_eq!(yolo_class_id(11), Some(4));
    }

    #[test]
    fn unknown_ids_map_to_none() {
        for id in [0, 1, 2, 4, 6, 8, 9, 12, 100] {
            assert_eq!(yolo_class_id(id), None, "id {} should be unknown", id);
        }
    }

    #[test]
    fn class_names_are_in_yolo_order() {
        assert_eq!(class_name(0), Some("small_load_carrier"));
        assert_eq!(class_name(4), Some("pallet_truck"));
        assert_eq!(class_name(5), None);
        assert_eq!(class_names()[2], "pallet");
    }
}
