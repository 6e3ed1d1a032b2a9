//! Bounding unions of geometric objects.

use crate::rect::Rect;

/// Trait for calculating the bounding union with another geometric object.
///
/// # Examples
///
/// ```
/// # use geometry::prelude::*;
/// let r1 = Some(Rect::from_sides(0, 0, 10, 10));
/// let r2 = Some(Rect::from_sides(20, -5, 30, 5));
/// assert_eq!(r1.bounding_union(&r2), Some(Rect::from_sides(0, -5, 30, 10)));
/// assert_eq!(r1.bounding_union(&None), r1);
/// ```
pub trait BoundingUnion<T: ?Sized> {
    /// The type of the output shape representing the union.
    type Output;
    /// Calculates the bounding union of this shape with `other`.
    fn bounding_union(&self, other: &T) -> Self::Output;
}

impl BoundingUnion<Option<Rect>> for Option<Rect> {
    type Output = Option<Rect>;
    fn bounding_union(&self, other: &Option<Rect>) -> Self::Output {
        match (self, other) {
            (Some(a), Some(b)) => Some(a.union(*b)),
            (Some(a), None) | (None, Some(a)) => Some(*a),
            (None, None) => None,
        }
    }
}

impl BoundingUnion<Rect> for Option<Rect> {
    type Output = Rect;
    fn bounding_union(&self, other: &Rect) -> Self::Output {
        match self {
            Some(a) => a.union(*other),
            None => *other,
        }
    }
}
