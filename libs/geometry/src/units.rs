//! Conversion between micrometres and database units.
//!
//! One database unit is one nanometre.

use crate::point::Point;

/// Database units per micrometre.
pub const DBU_PER_UM: i64 = 1000;

/// Converts a length in micrometres to the nearest database unit.
///
/// ```
/// # use geometry::units::um;
/// assert_eq!(um(1.5), 1500);
/// assert_eq!(um(-0.0004), 0);
/// ```
#[inline]
pub fn um(value: f64) -> i64 {
    (value * DBU_PER_UM as f64).round() as i64
}

/// Converts a length in database units to micrometres.
#[inline]
pub fn to_um(value: i64) -> f64 {
    value as f64 / DBU_PER_UM as f64
}

/// Creates a point from micrometre coordinates.
#[inline]
pub fn um_point(x: f64, y: f64) -> Point {
    Point::new(um(x), um(y))
}
