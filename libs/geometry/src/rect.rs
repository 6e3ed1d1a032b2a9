//! Axis-aligned rectangles.

use serde::{Deserialize, Serialize};

use crate::bbox::Bbox;
use crate::point::Point;
use crate::polygon::Polygon;
use crate::span::Span;
use crate::transform::{TransformMut, Transformation, TranslateMut};
use crate::union::BoundingUnion;

/// An axis-aligned rectangle, specified by lower-left and upper-right corners.
#[derive(
    Debug, Default, Copy, Clone, Hash, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord,
)]
pub struct Rect {
    /// The lower-left corner.
    p0: Point,
    /// The upper-right corner.
    p1: Point,
}

impl Rect {
    /// Returns the center point of the rectangle.
    ///
    /// Half-unit centers are rounded toward negative infinity.
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let rect = Rect::from_sides(0, 0, 200, 100);
    /// assert_eq!(rect.center(), Point::new(100, 50));
    /// let rect = Rect::from_sides(-3, -3, 0, 0);
    /// assert_eq!(rect.center(), Point::new(-2, -2));
    /// ```
    pub const fn center(&self) -> Point {
        Point::new(self.hspan().center(), self.vspan().center())
    }

    /// Creates a zero-area rectangle containing the given point.
    pub const fn from_point(p: Point) -> Self {
        Self { p0: p, p1: p }
    }

    /// Creates a rectangle with the given sides.
    ///
    /// # Panics
    ///
    /// Panics if `left > right` or `bot > top`.
    pub fn from_sides(left: i64, bot: i64, right: i64, top: i64) -> Self {
        assert!(
            left <= right,
            "Rect::from_sides: expected left ({left}) <= right ({right})"
        );
        assert!(
            bot <= top,
            "Rect::from_sides: expected bot ({bot}) <= top ({top})"
        );
        Self {
            p0: Point::new(left, bot),
            p1: Point::new(right, top),
        }
    }

    /// Creates a rectangle with the given sides, or `None` if they are out of order.
    pub fn from_sides_option(left: i64, bot: i64, right: i64, top: i64) -> Option<Self> {
        if left > right || bot > top {
            None
        } else {
            Some(Self::from_sides(left, bot, right, top))
        }
    }

    /// Creates a zero-area rectangle containing the point `(x, y)`.
    pub const fn from_xy(x: i64, y: i64) -> Self {
        Self::from_point(Point::new(x, y))
    }

    /// Creates a rectangle from any two opposite corners.
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let rect = Rect::new(Point::new(10, 0), Point::new(0, 20));
    /// assert_eq!(rect, Rect::from_sides(0, 0, 10, 20));
    /// ```
    pub fn new(a: Point, b: Point) -> Self {
        Self::from_spans(Span::new(a.x, b.x), Span::new(a.y, b.y))
    }

    /// Creates a rectangle of the given dimensions centered at `center`.
    pub fn from_center_dims(center: Point, width: i64, height: i64) -> Self {
        Self::from_spans(
            Span::from_center_span(center.x, width),
            Span::from_center_span(center.y, height),
        )
    }

    /// Creates a rectangle from a horizontal and a vertical span.
    pub const fn from_spans(h: Span, v: Span) -> Self {
        Self {
            p0: Point::new(h.start(), v.start()),
            p1: Point::new(h.stop(), v.stop()),
        }
    }

    /// The bottom y-coordinate.
    #[inline]
    pub const fn bot(&self) -> i64 {
        self.p0.y
    }

    /// The top y-coordinate.
    #[inline]
    pub const fn top(&self) -> i64 {
        self.p1.y
    }

    /// The left x-coordinate.
    #[inline]
    pub const fn left(&self) -> i64 {
        self.p0.x
    }

    /// The right x-coordinate.
    #[inline]
    pub const fn right(&self) -> i64 {
        self.p1.x
    }

    /// The horizontal span of the rectangle.
    pub const fn hspan(&self) -> Span {
        Span::with_start_and_length(self.p0.x, self.p1.x - self.p0.x)
    }

    /// The vertical span of the rectangle.
    pub const fn vspan(&self) -> Span {
        Span::with_start_and_length(self.p0.y, self.p1.y - self.p0.y)
    }

    /// The width of the rectangle.
    #[inline]
    pub const fn width(&self) -> i64 {
        self.right() - self.left()
    }

    /// The height of the rectangle.
    #[inline]
    pub const fn height(&self) -> i64 {
        self.top() - self.bot()
    }

    /// The area of the rectangle.
    #[inline]
    pub const fn area(&self) -> i64 {
        self.width() * self.height()
    }

    /// Returns `true` if the rectangle has zero area.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// The smallest rectangle containing both `self` and `other`.
    pub fn union(self, other: Self) -> Self {
        Self::from_spans(
            self.hspan().union(other.hspan()),
            self.vspan().union(other.vspan()),
        )
    }

    /// The overlap of `self` and `other`, if any.
    ///
    /// Rectangles that only touch produce a zero-area intersection.
    pub fn intersection(self, other: Self) -> Option<Self> {
        let h = self.hspan().intersection(other.hspan())?;
        let v = self.vspan().intersection(other.vspan())?;
        Some(Self::from_spans(h, v))
    }

    /// Expands the rectangle by `amount` on all sides.
    pub fn expand_all(&self, amount: i64) -> Self {
        Self::from_spans(self.hspan().expand_all(amount), self.vspan().expand_all(amount))
    }

    /// Shrinks the rectangle by `amount` on all sides, or returns `None` if it collapses.
    pub fn shrink_all(&self, amount: i64) -> Option<Self> {
        Self::from_sides_option(
            self.left() + amount,
            self.bot() + amount,
            self.right() - amount,
            self.top() - amount,
        )
    }

    /// The lower-left corner.
    #[inline]
    pub fn lower_left(&self) -> Point {
        self.p0
    }

    /// The lower-right corner.
    #[inline]
    pub fn lower_right(&self) -> Point {
        Point::new(self.right(), self.bot())
    }

    /// The upper-left corner.
    #[inline]
    pub fn upper_left(&self) -> Point {
        Point::new(self.left(), self.top())
    }

    /// The upper-right corner.
    #[inline]
    pub fn upper_right(&self) -> Point {
        self.p1
    }

    /// Returns `true` if `p` lies inside or on the boundary of the rectangle.
    pub fn contains_point(&self, p: Point) -> bool {
        self.hspan().contains(p.x) && self.vspan().contains(p.y)
    }

    /// The four corners in counter-clockwise order starting at the lower left.
    pub fn corners(&self) -> [Point; 4] {
        [
            self.lower_left(),
            self.lower_right(),
            self.upper_right(),
            self.upper_left(),
        ]
    }

    /// Converts the rectangle into a counter-clockwise [`Polygon`].
    pub fn to_polygon(&self) -> Polygon {
        Polygon::from_verts(self.corners().to_vec())
    }
}

impl Bbox for Rect {
    fn bbox(&self) -> Option<Rect> {
        Some(*self)
    }
}

impl TranslateMut for Rect {
    fn translate_mut(&mut self, p: Point) {
        self.p0.translate_mut(p);
        self.p1.translate_mut(p);
    }
}

/// Transforms the corners and takes their bounding box.
///
/// Exact for Manhattan transformations. Callers that may rotate by other
/// angles should convert to a [`Polygon`] first; [`Shape`](crate::shape::Shape) does so.
impl TransformMut for Rect {
    fn transform_mut(&mut self, trans: Transformation) {
        let (mut p0, mut p1) = (self.p0, self.p1);
        p0.transform_mut(trans);
        p1.transform_mut(trans);

        self.p0 = Point::new(std::cmp::min(p0.x, p1.x), std::cmp::min(p0.y, p1.y));
        self.p1 = Point::new(std::cmp::max(p0.x, p1.x), std::cmp::max(p0.y, p1.y));
    }
}

impl BoundingUnion<Rect> for Rect {
    type Output = Rect;
    fn bounding_union(&self, other: &Rect) -> Self::Output {
        self.union(*other)
    }
}
