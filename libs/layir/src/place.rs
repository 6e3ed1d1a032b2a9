//! Bounding-box based placement.

use geometry::prelude::*;

use crate::device::{Device, Instance};

/// Moves an object by reference to its bounding box.
///
/// Every method is a no-op on objects with an empty bounding box.
pub trait Place: TranslateMut + Bbox {
    /// The center of the bounding box.
    fn center(&self) -> Option<Point> {
        self.bbox().map(|bbox| bbox.center())
    }

    /// Moves the object so that its bounding box is centered on `p`.
    fn set_center(&mut self, p: Point) -> &mut Self {
        if let Some(bbox) = self.bbox() {
            self.translate_mut(p - bbox.center());
        }
        self
    }

    fn set_x(&mut self, x: i64) -> &mut Self {
        if let Some(bbox) = self.bbox() {
            self.translate_mut(Point::new(x - bbox.center().x, 0));
        }
        self
    }

    fn set_y(&mut self, y: i64) -> &mut Self {
        if let Some(bbox) = self.bbox() {
            self.translate_mut(Point::new(0, y - bbox.center().y));
        }
        self
    }

    fn set_xmin(&mut self, x: i64) -> &mut Self {
        if let Some(bbox) = self.bbox() {
            self.translate_mut(Point::new(x - bbox.left(), 0));
        }
        self
    }

    fn set_xmax(&mut self, x: i64) -> &mut Self {
        if let Some(bbox) = self.bbox() {
            self.translate_mut(Point::new(x - bbox.right(), 0));
        }
        self
    }

    fn set_ymin(&mut self, y: i64) -> &mut Self {
        if let Some(bbox) = self.bbox() {
            self.translate_mut(Point::new(0, y - bbox.bot()));
        }
        self
    }

    fn set_ymax(&mut self, y: i64) -> &mut Self {
        if let Some(bbox) = self.bbox() {
            self.translate_mut(Point::new(0, y - bbox.top()));
        }
        self
    }
}

impl Place for Device {}
impl Place for Instance {}
