//! An enumeration of geometric shapes and their properties.

use serde::{Deserialize, Serialize};

use crate::{
    bbox::Bbox,
    point::Point,
    polygon::Polygon,
    rect::Rect,
    transform::{TransformMut, Transformation, TranslateMut},
    union::BoundingUnion,
};

/// An enumeration of geometric shapes.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Shape {
    /// A rectangle.
    Rect(Rect),
    /// A polygon.
    Polygon(Polygon),
}

impl Shape {
    /// If this shape is a rectangle, returns the contained rectangle.
    /// Otherwise, returns [`None`].
    pub fn rect(&self) -> Option<Rect> {
        match self {
            Self::Rect(r) => Some(*r),
            _ => None,
        }
    }

    /// If this shape is a polygon, returns the contained polygon.
    /// Otherwise, returns [`None`].
    pub fn polygon(&self) -> Option<&Polygon> {
        match self {
            Self::Polygon(p) => Some(p),
            _ => None,
        }
    }

    /// Converts the shape into a polygon.
    pub fn to_polygon(&self) -> Polygon {
        match self {
            Self::Rect(r) => r.to_polygon(),
            Self::Polygon(p) => p.clone(),
        }
    }
}

impl TranslateMut for Shape {
    fn translate_mut(&mut self, p: Point) {
        match self {
            Shape::Rect(rect) => rect.translate_mut(p),
            Shape::Polygon(polygon) => polygon.translate_mut(p),
        };
    }
}

/// Rectangles stay rectangles under Manhattan transformations and become
/// polygons otherwise.
impl TransformMut for Shape {
    fn transform_mut(&mut self, trans: Transformation) {
        match self {
            Shape::Rect(rect) if trans.is_manhattan() => rect.transform_mut(trans),
            Shape::Rect(rect) => {
                let mut poly = rect.to_polygon();
                poly.transform_mut(trans);
                *self = Shape::Polygon(poly);
            }
            Shape::Polygon(polygon) => polygon.transform_mut(trans),
        }
    }
}

impl Bbox for Shape {
    fn bbox(&self) -> Option<Rect> {
        match self {
            Shape::Rect(rect) => rect.bbox(),
            Shape::Polygon(polygon) => polygon.bbox(),
        }
    }
}

impl From<Rect> for Shape {
    #[inline]
    fn from(value: Rect) -> Self {
        Self::Rect(value)
    }
}

impl From<Polygon> for Shape {
    #[inline]
    fn from(value: Polygon) -> Self {
        Self::Polygon(value)
    }
}

impl<T: Bbox> BoundingUnion<T> for Shape {
    type Output = Option<Rect>;

    fn bounding_union(&self, other: &T) -> Self::Output {
        self.bbox().bounding_union(&other.bbox())
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    #[test]
    fn rect_becomes_polygon_under_arbitrary_rotation() {
        let shape = Shape::from(Rect::from_sides(0, 0, 100, 100));
        let turned = shape.clone().transform(Transformation::rotate(90.));
        assert_eq!(turned.rect(), Some(Rect::from_sides(-100, 0, 0, 100)));

        let turned = shape.transform(Transformation::rotate(45.));
        let poly = turned.polygon().unwrap();
        assert_eq!(poly.points().len(), 4);
        assert_eq!(poly.points()[2], Point::new(0, 141));
    }
}
