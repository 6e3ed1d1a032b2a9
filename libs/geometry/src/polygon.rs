//! Integer coordinate polygons.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::bbox::Bbox;
use crate::point::Point;
use crate::rect::Rect;
use crate::transform::{TransformMut, Transformation, TranslateMut};

/// A simple polygon, with vertex coordinates given in order.
///
/// The closing edge from the last vertex back to the first is implicit.
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Polygon {
    /// Vector of points that make up the polygon.
    points: Vec<Point>,
}

impl Polygon {
    /// Creates a polygon with given vertices.
    pub fn from_verts(vec: Vec<Point>) -> Self {
        Self { points: vec }
    }

    /// Creates a polygon by rounding floating point vertices, dropping
    /// consecutive duplicates introduced by rounding.
    pub fn from_f64_verts(verts: impl IntoIterator<Item = [f64; 2]>) -> Self {
        let mut points: Vec<Point> = Vec::new();
        for [x, y] in verts {
            let p = Point::from_f64(x, y);
            if points.last() != Some(&p) {
                points.push(p);
            }
        }
        if points.len() > 1 && points.first() == points.last() {
            points.pop();
        }
        Self { points }
    }

    /// Returns a reference to the vertices of the polygon.
    #[inline]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Twice the signed area of the polygon.
    ///
    /// Positive for counter-clockwise vertex order.
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let square = Rect::from_sides(0, 0, 10, 10).to_polygon();
    /// assert_eq!(square.signed_area2(), 200);
    /// ```
    pub fn signed_area2(&self) -> i128 {
        let n = self.points.len();
        (0..n)
            .map(|i| {
                let a = self.points[i];
                let b = self.points[(i + 1) % n];
                a.x as i128 * b.y as i128 - b.x as i128 * a.y as i128
            })
            .sum()
    }

    /// Returns the polygon with its vertex order reversed.
    pub fn reversed(mut self) -> Self {
        self.points.reverse();
        self
    }

    /// Returns the polygon with counter-clockwise vertex order.
    pub fn into_ccw(self) -> Self {
        if self.signed_area2() < 0 {
            self.reversed()
        } else {
            self
        }
    }

    /// Returns `true` if `p` lies strictly inside the polygon (even-odd rule).
    pub fn contains_point(&self, p: Point) -> bool {
        let n = self.points.len();
        let mut inside = false;
        let (px, py) = (p.x as f64, p.y as f64);
        for i in 0..n {
            let a = self.points[i];
            let b = self.points[(i + 1) % n];
            if (a.y > p.y) != (b.y > p.y) {
                let t = (py - a.y as f64) / (b.y - a.y) as f64;
                let x = a.x as f64 + t * (b.x - a.x) as f64;
                if px < x {
                    inside = !inside;
                }
            }
        }
        inside
    }

    /// Subtracts `hole` from `outer`, producing a single keyhole polygon.
    ///
    /// The hole is joined to the outer boundary by a zero-width cut running
    /// left from the hole's leftmost vertex to the nearest outer edge.
    /// The outer contour is emitted counter-clockwise and the hole clockwise,
    /// so the result fills the region between them.
    ///
    /// Returns `None` if the hole does not lie inside the outer polygon.
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let outer = Rect::from_sides(0, 0, 100, 100).to_polygon();
    /// let hole = Rect::from_sides(20, 20, 80, 80).to_polygon();
    /// let ring = Polygon::keyhole(&outer, &hole).unwrap();
    /// assert_eq!(ring.signed_area2(), 2 * (100 * 100 - 60 * 60));
    /// ```
    pub fn keyhole(outer: &Polygon, hole: &Polygon) -> Option<Polygon> {
        let outer = outer.clone().into_ccw();
        let hole = hole.clone().into_ccw().reversed();

        let (start, &anchor) = hole
            .points
            .iter()
            .enumerate()
            .min_by_key(|(_, p)| (p.x, p.y))?;
        if !outer.contains_point(anchor) {
            return None;
        }

        // Nearest outer edge crossed by a ray running left from the anchor.
        let n = outer.points.len();
        let mut best: Option<(usize, i64)> = None;
        for i in 0..n {
            let a = outer.points[i];
            let b = outer.points[(i + 1) % n];
            if a.y == b.y || anchor.y < a.y.min(b.y) || anchor.y > a.y.max(b.y) {
                continue;
            }
            let t = (anchor.y - a.y) as f64 / (b.y - a.y) as f64;
            let x = (a.x as f64 + t * (b.x - a.x) as f64).round() as i64;
            if x <= anchor.x && best.map_or(true, |(_, bx)| x > bx) {
                best = Some((i, x));
            }
        }
        let (edge, x) = best?;
        let bridge = Point::new(x, anchor.y);

        let mut points = Vec::with_capacity(outer.points.len() + hole.points.len() + 3);
        points.extend_from_slice(&outer.points[..=edge]);
        if points.last() != Some(&bridge) {
            points.push(bridge);
        }
        let m = hole.points.len();
        points.extend((0..=m).map(|k| hole.points[(start + k) % m]));
        points.push(bridge);
        for &p in &outer.points[edge + 1..] {
            if points.last() != Some(&p) {
                points.push(p);
            }
        }
        if points.len() > 1 && points.first() == points.last() {
            points.pop();
        }
        Some(Polygon { points })
    }

    /// Rounds every corner of the polygon with an arc of the given radius.
    ///
    /// `points_per_turn` is the number of vertices a full 360 degree turn
    /// would be sampled with. The radius at a corner is reduced when the
    /// adjacent edges are too short to hold it.
    pub fn fillet(&self, radius: f64, points_per_turn: usize) -> Polygon {
        let n = self.points.len();
        if n < 3 || radius <= 0. {
            return self.clone();
        }
        let pts: Vec<[f64; 2]> = self.points.iter().map(|p| p.to_f64()).collect();
        let mut out = Vec::new();
        for i in 0..n {
            let v = pts[i];
            let prev = pts[(i + n - 1) % n];
            let next = pts[(i + 1) % n];
            let (u1, l1) = unit(sub(prev, v));
            let (u2, l2) = unit(sub(next, v));
            let cos_theta = (u1[0] * u2[0] + u1[1] * u2[1]).clamp(-1., 1.);
            let theta = cos_theta.acos();
            if l1 == 0. || l2 == 0. || theta < 1e-9 || (PI - theta) < 1e-9 {
                out.push(v);
                continue;
            }
            let half = theta / 2.;
            let d = (radius / half.tan()).min(l1.min(l2) / 2.);
            let r = d * half.tan();
            let t1 = add(v, scale(u1, d));
            let t2 = add(v, scale(u2, d));
            let (bis, _) = unit(add(u1, u2));
            let c = add(v, scale(bis, r / half.sin()));

            let a1 = (t1[1] - c[1]).atan2(t1[0] - c[0]);
            let a2 = (t2[1] - c[1]).atan2(t2[0] - c[0]);
            let mut sweep = a2 - a1;
            if sweep > PI {
                sweep -= 2. * PI;
            } else if sweep < -PI {
                sweep += 2. * PI;
            }
            let steps = ((points_per_turn as f64 * sweep.abs() / (2. * PI)).ceil() as usize).max(1);
            for k in 0..=steps {
                let a = a1 + sweep * k as f64 / steps as f64;
                out.push([c[0] + r * a.cos(), c[1] + r * a.sin()]);
            }
        }
        Polygon::from_f64_verts(out)
    }
}

fn sub(a: [f64; 2], b: [f64; 2]) -> [f64; 2] {
    [a[0] - b[0], a[1] - b[1]]
}

fn add(a: [f64; 2], b: [f64; 2]) -> [f64; 2] {
    [a[0] + b[0], a[1] + b[1]]
}

fn scale(a: [f64; 2], s: f64) -> [f64; 2] {
    [a[0] * s, a[1] * s]
}

fn unit(a: [f64; 2]) -> ([f64; 2], f64) {
    let len = a[0].hypot(a[1]);
    if len == 0. {
        ([0., 0.], 0.)
    } else {
        ([a[0] / len, a[1] / len], len)
    }
}

impl Bbox for Polygon {
    fn bbox(&self) -> Option<Rect> {
        let mut iter = self.points.iter();
        let first = iter.next()?;
        Some(iter.fold(Rect::from_point(*first), |acc, p| {
            acc.union(Rect::from_point(*p))
        }))
    }
}

impl TranslateMut for Polygon {
    fn translate_mut(&mut self, p: Point) {
        for pt in self.points.iter_mut() {
            pt.translate_mut(p);
        }
    }
}

impl TransformMut for Polygon {
    fn transform_mut(&mut self, trans: Transformation) {
        for pt in self.points.iter_mut() {
            pt.transform_mut(trans);
        }
    }
}

impl From<Rect> for Polygon {
    fn from(value: Rect) -> Self {
        value.to_polygon()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyhole_joins_hole_at_left_edge() {
        let outer = Rect::from_sides(0, 0, 100, 100).to_polygon();
        let hole = Rect::from_sides(20, 30, 80, 70).to_polygon();
        let poly = Polygon::keyhole(&outer, &hole).unwrap();

        assert!(poly.points().contains(&Point::new(0, 30)));
        assert_eq!(poly.bbox(), Some(Rect::from_sides(0, 0, 100, 100)));
        assert_eq!(poly.signed_area2(), 2 * (100 * 100 - 60 * 40));
        assert!(!poly.contains_point(Point::new(50, 50)));
        assert!(poly.contains_point(Point::new(10, 50)));
    }

    #[test]
    fn keyhole_rejects_outside_hole() {
        let outer = Rect::from_sides(0, 0, 100, 100).to_polygon();
        let hole = Rect::from_sides(200, 0, 300, 100).to_polygon();
        assert_eq!(Polygon::keyhole(&outer, &hole), None);
    }

    #[test]
    fn fillet_rounds_square_corners() {
        let square = Rect::from_sides(0, 0, 1000, 1000).to_polygon();
        let rounded = square.fillet(100., 64);
        assert!(rounded.points().len() > 4);
        assert!(!rounded.points().contains(&Point::new(0, 0)));
        assert_eq!(rounded.bbox(), Some(Rect::from_sides(0, 0, 1000, 1000)));
        // A quarter circle of radius 100 removes (1 - pi/4) * 100^2 per corner.
        let expected = 1000. * 1000. - 4. * (1. - PI / 4.) * 100. * 100.;
        let area = rounded.signed_area2() as f64 / 2.;
        assert!((area - expected).abs() / expected < 1e-3);
    }
}
