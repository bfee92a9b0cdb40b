//! Bounding box types for the two coordinate conventions in play.
//!
//! COCO annotations store `[x, y, width, height]` with `(x, y)` the
//! top-left corner in absolute pixels. YOLO label files store
//! `x_center y_center width height` as fractions of the image size.
//! Keeping the two as distinct types makes it impossible to feed a
//! normalized box where pixels are expected and vice versa.

/// A COCO-style box: top-left corner plus size, in absolute pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PixelBox {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

/// A YOLO-style box: center plus size, normalized to `[0, 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct YoloBox {
    pub cx: f64,
    pub cy: f64,
    pub w: f64,
    pub h: f64,
}

impl PixelBox {
    /// Creates a box from the COCO `bbox` array `[x, y, width, height]`.
    #[inline]
    pub fn from_coco(bbox: [f64; 4]) -> Self {
        let [x, y, w, h] = bbox;
        Self { x, y, w, h }
    }

    /// Normalizes to the YOLO representation for an image of
    /// `img_width` x `img_height` pixels.
    ///
    /// The arithmetic mirrors the reference conversion used to produce
    /// LOCO training labels: the reciprocal of each image dimension is
    /// taken once and multiplied through.
    pub fn to_yolo(&self, img_width: u32, img_height: u32) -> YoloBox {
        let dw = 1.0 / img_width as f64;
        let dh = 1.0 / img_height as f64;

        let x_center = self.x + self.w / 2.0;
        let y_center = self.y + self.h / 2.0;

        YoloBox {
            cx: x_center * dw,
            cy: y_center * dh,
            w: self.w * dw,
            h: self.h * dh,
        }
    }

    /// Returns the corner coordinates `(xmin, ymin, xmax, ymax)`.
    #[inline]
    pub fn corners(&self) -> (f64, f64, f64, f64) {
        (self.x, self.y, self.x + self.w, self.y + self.h)
    }

    /// Returns the area of the box. May be negative for malformed input.
    #[inline]
    pub fn area(&self) -> f64 {
        self.w * self.h
    }

    /// Returns true if all components are finite (not NaN or infinite).
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.w.is_finite() && self.h.is_finite()
    }
}

impl YoloBox {
    /// Denormalizes back to pixel space for an image of
    /// `img_width` x `img_height` pixels.
    pub fn to_pixel(&self, img_width: u32, img_height: u32) -> PixelBox {
        let w = self.w * img_width as f64;
        let h = self.h * img_height as f64;

        PixelBox {
            x: self.cx * img_width as f64 - w / 2.0,
            y: self.cy * img_height as f64 - h / 2.0,
            w,
            h,
        }
    }

    /// Reconstructs pixel corners `(xmin, ymin, xmax, ymax)` as
    /// `center ± size / 2`, scaled by the image dimensions.
    pub fn corners(&self, img_width: u32, img_height: u32) -> (f64, f64, f64, f64) {
        let (w, h) = (img_width as f64, img_height as f64);
        (
            (self.cx - self.w / 2.0) * w,
            (self.cy - self.h / 2.0) * h,
            (self.cx + self.w / 2.0) * w,
            (self.cy + self.h / 2.0) * h,
        )
    }

    /// Returns true if all components lie in `[0, 1]`.
    pub fn is_normalized(&self) -> bool {
        [self.cx, self.cy, self.w, self.h]
            .iter()
            .all(|v| (0.0..=1.0).contains(v))
    }

    /// Returns true if all components are finite (not NaN or infinite).
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.cx.is_finite() && self.cy.is_finite() && self.w.is_finite() && self.h.is_finite()
    }
}
