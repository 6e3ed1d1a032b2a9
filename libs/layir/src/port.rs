//! Connection points on device boundaries.

use geometry::prelude::{Point, TransformMut, Transformation, TranslateMut};
use serde::{Deserialize, Serialize};

/// A named connection point with a width and an outward-facing orientation.
///
/// The orientation is given in degrees, counterclockwise from the positive
/// x axis, and is always kept in `[0, 360)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Port {
    /// The center of the port.
    pub midpoint: Point,
    /// The width of the port in database units.
    pub width: i64,
    /// The direction the port faces, in degrees.
    pub orientation: f64,
}

impl Port {
    pub fn new(midpoint: Point, width: i64, orientation: f64) -> Self {
        Self {
            midpoint,
            width,
            orientation: geometry::wrap_angle(orientation),
        }
    }

    /// A unit vector pointing in the direction the port faces.
    pub fn normal(&self) -> [f64; 2] {
        let (s, c) = self.orientation.to_radians().sin_cos();
        [c, s]
    }
}

impl TranslateMut for Port {
    fn translate_mut(&mut self, p: Point) {
        self.midpoint.translate_mut(p);
    }
}

impl TransformMut for Port {
    fn transform_mut(&mut self, trans: Transformation) {
        let [x, y] = self.midpoint.to_f64();
        let [nx, ny] = self.normal();
        let [x0, y0] = trans.apply_f64([x, y]);
        let [x1, y1] = trans.apply_f64([x + nx, y + ny]);
        let angle = (y1 - y0).atan2(x1 - x0).to_degrees();
        // Snap away accumulated floating point error near whole degrees.
        let snapped = angle.round();
        let angle = if (angle - snapped).abs() < 1e-6 {
            snapped
        } else {
            angle
        };
        self.midpoint.transform_mut(trans);
        self.orientation = geometry::wrap_angle(angle);
    }
}
