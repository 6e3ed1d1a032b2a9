//! Rectangular ring geometry.
//!
//! Used for chip frames and other borders that enclose a rectangular region.

use serde::{Deserialize, Serialize};

use crate::prelude::*;

/// A rectangular ring surrounding an enclosed rectangle.
#[derive(Debug, Default, Copy, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Ring {
    outer: Rect,
    inner: Rect,
}

impl Ring {
    /// Creates a ring of the given border width that fits within `outer`.
    ///
    /// Returns `None` if the border is too wide to leave an opening.
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let ring = Ring::from_outer(Rect::from_sides(0, 0, 100, 50), 10).unwrap();
    /// assert_eq!(ring.inner(), Rect::from_sides(10, 10, 90, 40));
    /// assert!(Ring::from_outer(Rect::from_sides(0, 0, 100, 50), 25).is_none());
    /// ```
    pub fn from_outer(outer: Rect, width: i64) -> Option<Self> {
        let inner = outer.shrink_all(width)?;
        if inner.is_empty() {
            return None;
        }
        Some(Self { outer, inner })
    }

    /// Creates a ring of the given border width that encloses `inner`.
    pub fn from_inner(inner: Rect, width: i64) -> Self {
        Self {
            outer: inner.expand_all(width),
            inner,
        }
    }

    /// The outer bounding box of the ring.
    #[inline]
    pub fn outer(&self) -> Rect {
        self.outer
    }

    /// The enclosed rectangle.
    #[inline]
    pub fn inner(&self) -> Rect {
        self.inner
    }

    /// The four border rectangles: top, bottom, left, right.
    ///
    /// The top and bottom rectangles span the full outer width; the side
    /// rectangles span only the inner height, so the pieces do not overlap.
    pub fn rects(&self) -> [Rect; 4] {
        let (o, i) = (self.outer, self.inner);
        [
            Rect::from_sides(o.left(), i.top(), o.right(), o.top()),
            Rect::from_sides(o.left(), o.bot(), o.right(), i.bot()),
            Rect::from_sides(o.left(), i.bot(), i.left(), i.top()),
            Rect::from_sides(i.right(), i.bot(), o.right(), i.top()),
        ]
    }

    /// The ring as a single keyhole polygon.
    pub fn to_polygon(&self) -> Polygon {
        Polygon::keyhole(&self.outer.to_polygon(), &self.inner.to_polygon())
            .unwrap_or_else(|| self.outer.to_polygon())
    }
}

impl Bbox for Ring {
    fn bbox(&self) -> Option<Rect> {
        Some(self.outer)
    }
}

impl TranslateMut for Ring {
    fn translate_mut(&mut self, p: Point) {
        self.outer.translate_mut(p);
        self.inner.translate_mut(p);
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    #[test]
    fn ring_rects_tile_the_border() {
        let ring = Ring::from_inner(Rect::from_sides(0, 0, 100, 60), 10);
        assert_eq!(ring.outer(), Rect::from_sides(-10, -10, 110, 70));
        let area: i64 = ring.rects().iter().map(Rect::area).sum();
        assert_eq!(area, ring.outer().area() - ring.inner().area());
    }
}
