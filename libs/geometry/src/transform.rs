//! Transformation types and traits.

use impl_trait_for_tuples::impl_for_tuples;
use serde::{Deserialize, Serialize};

use crate::orientation::Orientation;
use crate::point::Point;
use crate::wrap_angle;

/// Tolerance used when deciding whether a matrix entry is an exact integer.
const MANHATTAN_TOL: f64 = 1e-9;

/// A transformation representing translation, rotation by an arbitrary angle,
/// and reflection of geometry.
///
/// This object does not support scaling of geometry, and as such all transformation matrices
/// should be orthogonal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transformation {
    /// The transformation matrix represented in row-major order.
    pub(crate) a: [[f64; 2]; 2],
    /// The x-y translation applied after the transformation.
    pub(crate) b: [f64; 2],
}

impl Default for Transformation {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transformation {
    /// Returns the identity transform, leaving any transformed object unmodified.
    pub fn identity() -> Self {
        Self {
            a: [[1., 0.], [0., 1.]],
            b: [0., 0.],
        }
    }

    /// Returns a translation by `(x,y)`.
    pub fn translate(x: i64, y: i64) -> Self {
        Self {
            a: [[1., 0.], [0., 1.]],
            b: [x as f64, y as f64],
        }
    }

    /// Returns a counter-clockwise rotation by `angle` degrees about the origin.
    pub fn rotate(angle: f64) -> Self {
        let (sin, cos) = sin_cos_deg(angle);
        Self {
            a: [[cos, -sin], [sin, cos]],
            b: [0., 0.],
        }
    }

    /// Returns a counter-clockwise rotation by `angle` degrees about `center`.
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let trans = Transformation::rotate_about(90., Point::new(10, 0));
    /// assert_eq!(Point::new(20, 0).transform(trans), Point::new(10, 10));
    /// ```
    pub fn rotate_about(angle: f64, center: Point) -> Self {
        Self::cascade(
            Self::from_offset(center),
            Self::cascade(Self::rotate(angle), Self::from_offset(-center)),
        )
    }

    /// Returns a reflection across the line passing through `p1` and `p2`,
    /// or `None` if the points coincide.
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// // Mirror across the y-axis.
    /// let trans = Transformation::mirror(Point::new(0, 0), Point::new(0, 1)).unwrap();
    /// assert_eq!(Point::new(5, 3).transform(trans), Point::new(-5, 3));
    /// assert!(Transformation::mirror(Point::new(1, 1), Point::new(1, 1)).is_none());
    /// ```
    pub fn mirror(p1: Point, p2: Point) -> Option<Self> {
        if p1 == p2 {
            return None;
        }
        let d = p2 - p1;
        let phi = (d.y as f64).atan2(d.x as f64).to_degrees();
        let (sin, cos) = sin_cos_deg(2. * phi);
        let a = [[cos, sin], [sin, -cos]];
        let [px, py] = p1.to_f64();
        let ap = matvec(&a, &[px, py]);
        Some(Self {
            a,
            b: [px - ap[0], py - ap[1]],
        })
    }

    /// Creates a transform from only an offset.
    ///
    /// The resulting transformation will apply only a translation
    /// (i.e. no rotations/reflections).
    pub fn from_offset(offset: Point) -> Self {
        Self::translate(offset.x, offset.y)
    }

    /// Create a new [`Transformation`] that is the cascade of `parent` and `child`.
    ///
    /// "Parents" and "children" refer to typical layout-instance hierarchies,
    /// in which each layer of instance has a nested set of transformations relative to its top-level parent.
    ///
    /// Note this operation *is not* commutative.
    /// For example the set of transformations:
    /// * (a) Reflect vertically, then
    /// * (b) Translate by (1,1)
    /// * (c) Place a point at (local coordinate) (1,1)
    ///
    /// Lands said point at (2,-2) in top-level space,
    /// whereas reversing the order of (a) and (b) lands it at (2,0).
    pub fn cascade(parent: Transformation, child: Transformation) -> Transformation {
        // The result-transform's origin is the parent's origin,
        // plus the parent-transformed child's origin
        let mut b = matvec(&parent.a, &child.b);
        b[0] += parent.b[0];
        b[1] += parent.b[1];
        // And the cascade-matrix is the product of the parent's and child's
        let a = matmul(&parent.a, &child.a);
        Self { a, b }
    }

    /// Returns the inverse [`Transformation`] of `self`.
    pub fn inv(&self) -> Transformation {
        // Orthogonal, so the inverse is the transpose.
        let a = [[self.a[0][0], self.a[1][0]], [self.a[0][1], self.a[1][1]]];
        let ab = matvec(&a, &self.b);
        Self {
            a,
            b: [-ab[0], -ab[1]],
        }
    }

    /// The point representing the translation of this transformation.
    pub fn offset_point(&self) -> Point {
        Point::from_f64(self.b[0], self.b[1])
    }

    /// Returns `true` if the transformation maps axis-aligned rectangles to
    /// axis-aligned rectangles.
    pub fn is_manhattan(&self) -> bool {
        self.a
            .iter()
            .flatten()
            .all(|v| (v - v.round()).abs() < MANHATTAN_TOL)
    }

    /// Returns an [`Orientation`] corresponding to this transformation.
    pub fn orientation(&self) -> Orientation {
        let det = self.a[0][0] * self.a[1][1] - self.a[0][1] * self.a[1][0];
        let reflect_vert = det < 0.;
        let angle = self.a[1][0].atan2(self.a[0][0]).to_degrees();
        let angle = wrap_angle(snap_angle(angle));
        Orientation::from_reflect_and_angle(reflect_vert, angle)
    }

    /// Applies the transformation to a floating point coordinate pair.
    pub fn apply_f64(&self, p: [f64; 2]) -> [f64; 2] {
        let v = matvec(&self.a, &p);
        [v[0] + self.b[0], v[1] + self.b[1]]
    }
}

/// Sine and cosine of an angle in degrees, exact at multiples of 90.
fn sin_cos_deg(angle: f64) -> (f64, f64) {
    let wrapped = wrap_angle(angle);
    if wrapped % 90. == 0. {
        match wrapped as i64 {
            0 => (0., 1.),
            90 => (1., 0.),
            180 => (0., -1.),
            _ => (-1., 0.),
        }
    } else {
        let rad = angle.to_radians();
        (rad.sin(), rad.cos())
    }
}

/// Rounds away floating point noise around whole-degree angles.
fn snap_angle(angle: f64) -> f64 {
    if (angle - angle.round()).abs() < MANHATTAN_TOL {
        angle.round()
    } else {
        angle
    }
}

/// Multiples two 2x2 matrices, returning a new 2x2 matrix
fn matmul(a: &[[f64; 2]; 2], b: &[[f64; 2]; 2]) -> [[f64; 2]; 2] {
    [
        [
            a[0][0] * b[0][0] + a[0][1] * b[1][0],
            a[0][0] * b[0][1] + a[0][1] * b[1][1],
        ],
        [
            a[1][0] * b[0][0] + a[1][1] * b[1][0],
            a[1][0] * b[0][1] + a[1][1] * b[1][1],
        ],
    ]
}

/// Multiplies a 2x2 matrix by a 2-entry vector, returning a new 2-entry vector.
fn matvec(a: &[[f64; 2]; 2], b: &[f64; 2]) -> [f64; 2] {
    [
        a[0][0] * b[0] + a[0][1] * b[1],
        a[1][0] * b[0] + a[1][1] * b[1],
    ]
}

/// A trait for specifying how an object is changed by a [`Transformation`].
#[impl_for_tuples(32)]
pub trait TransformMut {
    /// Applies matrix-vector [`Transformation`] `trans`.
    fn transform_mut(&mut self, trans: Transformation);
}

impl<T: TransformMut> TransformMut for Vec<T> {
    fn transform_mut(&mut self, trans: Transformation) {
        for i in self.iter_mut() {
            i.transform_mut(trans);
        }
    }
}

impl<T: TransformMut> TransformMut for Option<T> {
    fn transform_mut(&mut self, trans: Transformation) {
        if let Some(inner) = self.as_mut() {
            inner.transform_mut(trans);
        }
    }
}

/// A trait for specifying how an object is changed by a [`Transformation`].
///
/// Takes in an owned copy of the shape and returns the transformed version.
pub trait Transform: TransformMut + Sized {
    /// Applies matrix-vector [`Transformation`] `trans`.
    ///
    /// Creates a new shape at a location equal to the transformation of the original.
    #[inline]
    fn transform(mut self, trans: Transformation) -> Self {
        self.transform_mut(trans);
        self
    }
}

impl<T: TransformMut + Sized> Transform for T {}

/// A trait for specifying how a shape is translated by a [`Point`].
#[impl_for_tuples(32)]
pub trait TranslateMut {
    /// Translates the shape by a [`Point`] through mutation.
    fn translate_mut(&mut self, p: Point);
}

impl<T: TranslateMut> TranslateMut for Vec<T> {
    fn translate_mut(&mut self, p: Point) {
        for i in self.iter_mut() {
            i.translate_mut(p);
        }
    }
}

impl<T: TranslateMut> TranslateMut for Option<T> {
    fn translate_mut(&mut self, p: Point) {
        if let Some(inner) = self.as_mut() {
            inner.translate_mut(p);
        }
    }
}

/// A trait for specifying how a shape is translated by a [`Point`].
///
/// Takes in an owned copy of the shape and returns the translated version.
pub trait Translate: TranslateMut + Sized {
    /// Translates the shape by a [`Point`] through mutation.
    ///
    /// Creates a new shape at a location equal to the translation of the original.
    fn translate(mut self, p: Point) -> Self {
        self.translate_mut(p);
        self
    }
}

impl<T: TranslateMut + Sized> Translate for T {}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::rect::Rect;

    #[test]
    fn matvec_works() {
        let a = [[1., 2.], [3., 4.]];
        let b = [5., 6.];
        assert_eq!(matvec(&a, &b), [17., 39.]);
    }

    #[test]
    fn matmul_works() {
        let a = [[1., 2.], [3., 4.]];
        let b = [[5., 6.], [7., 8.]];
        assert_eq!(matmul(&a, &b), [[19., 22.], [43., 50.]]);
    }

    #[test]
    fn cascade_identity_preserves_transformation() {
        for angle in [0., 90., 180., 270., 45.] {
            let tf = Transformation::cascade(
                Transformation::translate(520, 130),
                Transformation::rotate(angle),
            );
            let casc = Transformation::cascade(tf, Transformation::identity());
            assert_eq!(tf, casc, "cascade with identity changed rotation by {angle}");
            assert_eq!(tf.offset_point(), Point::new(520, 130));
            assert_relative_eq!(tf.orientation().angle(), angle);
        }
    }

    #[test]
    fn point_transformations_work() {
        let pt = Point::new(2, 1);

        let mirror_x = Transformation::mirror(Point::zero(), Point::new(1, 0)).unwrap();
        assert_eq!(pt.transform(mirror_x), Point::new(2, -1));
        assert!(mirror_x.orientation().reflect_vert());
        assert_relative_eq!(mirror_x.orientation().angle(), 0.);

        let mirror_y = Transformation::mirror(Point::zero(), Point::new(0, 1)).unwrap();
        assert_eq!(pt.transform(mirror_y), Point::new(-2, 1));
        assert_relative_eq!(mirror_y.orientation().angle(), 180.);

        let r90 = Transformation::cascade(
            Transformation::translate(23, 11),
            Transformation::rotate(90.),
        );
        assert_eq!(pt.transform(r90), Point::new(22, 13));

        let r180 = Transformation::cascade(
            Transformation::translate(-50, 10),
            Transformation::rotate(180.),
        );
        assert_eq!(pt.transform(r180), Point::new(-52, 9));

        let r270 = Transformation::cascade(
            Transformation::translate(80, 90),
            Transformation::rotate(270.),
        );
        assert_eq!(pt.transform(r270), Point::new(81, 88));
    }

    #[test]
    fn arbitrary_rotation_and_inverse() {
        let trans = Transformation::cascade(
            Transformation::translate(100, -40),
            Transformation::rotate(30.),
        );
        assert!(!trans.is_manhattan());
        assert_relative_eq!(trans.orientation().angle(), 30., epsilon = 1e-9);

        let p = Point::new(1000, 0).transform(trans);
        assert_eq!(p, Point::new(100 + 866, -40 + 500));

        let back = p.transform(trans.inv());
        assert!((back.x - 1000).abs() <= 1 && back.y.abs() <= 1);
    }

    #[test]
    fn mirror_across_diagonal_reflects() {
        let trans = Transformation::mirror(Point::new(0, 0), Point::new(10, 10)).unwrap();
        assert_eq!(Point::new(3, 1).transform(trans), Point::new(1, 3));
        assert!(trans.orientation().reflect_vert());
        assert!(trans.is_manhattan());
    }

    #[test]
    fn translate_works_for_tuples() {
        let mut tuple = (
            Rect::from_sides(0, 0, 100, 200),
            Rect::from_sides(50, -50, 150, 0),
        );
        tuple.translate_mut(Point::new(5, 10));
        assert_eq!(
            tuple,
            (
                Rect::from_sides(5, 10, 105, 210),
                Rect::from_sides(55, -40, 155, 10)
            )
        );
    }

    #[test]
    fn transform_works_for_vecs() {
        let mut v = vec![
            Rect::from_sides(0, 0, 100, 200),
            Rect::from_sides(50, -50, 150, 0),
        ];
        v.transform_mut(Transformation::rotate(90.));
        assert_eq!(
            v,
            vec![
                Rect::from_sides(-200, 0, 0, 100),
                Rect::from_sides(0, 50, 50, 150)
            ]
        );
    }
}
