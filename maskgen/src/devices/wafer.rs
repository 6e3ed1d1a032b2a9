use std::sync::Arc;

use geometry::prelude::*;
use layir::Device;

use super::layers;
use super::primitives::{circle, invert};

const UM_PER_INCH: f64 = 25.4e3;
const WAFER_BORDER: f64 = 7000.;
const GRID_LINE_WIDTH: f64 = 100.;
const GRID_LINE_SPACING: f64 = 4800.;

fn wafer_radius(inch: f64) -> f64 {
    0.5 * inch * UM_PER_INCH
}

/// The region outside a wafer of the given diameter, for visual reference.
pub fn wafer(inch: f64) -> Device {
    let mut wafer = Device::new("wafer");
    wafer.add_shapes(
        layers::WAFER,
        invert(circle(wafer_radius(inch), 2.5), WAFER_BORDER),
    );
    wafer
}

/// Dicing lines across a wafer: `n` vertical lines and the same set rotated
/// by 90 degrees, each clipped to the wafer outline.
pub fn wafer_grid(inch: f64, n: usize) -> Device {
    let radius = um(wafer_radius(inch));
    let width = um(GRID_LINE_WIDTH);
    let pitch = width + um(GRID_LINE_SPACING);

    let span = (n as i64 - 1).max(0) * pitch + width;
    let r = radius as f64;

    // Keep the part of each line whose full width lies inside the circle.
    let clipped = (0..n as i64)
        .map(|i| -span / 2 + i * pitch)
        .filter_map(|left| {
            let x = left.abs().max((left + width).abs()) as f64;
            (x < r).then(|| {
                let h = (r * r - x * x).sqrt().floor() as i64;
                Rect::from_sides(left, -h, left + width, h)
            })
        })
        .collect::<Vec<_>>();
    let mut lines = Device::new("Grid_lines");
    lines.add_shapes(layers::GRID, clipped);
    let lines = Arc::new(lines);

    let mut grid = Device::new("Grid");
    grid.add_ref(lines.clone());
    grid.add_ref(lines).rotate(90.);
    grid
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wafer_outline_is_bordered() {
        let wafer = wafer(4.);
        let r = um(50_800. + 7000.);
        assert_eq!(wafer.bbox(), Some(Rect::from_sides(-r, -r, r, r)));
    }

    #[test]
    fn grid_lines_stay_inside_the_wafer() {
        let grid = wafer_grid(4., 20);
        let r = um(50_800.);
        let bbox = grid.bbox().unwrap();
        assert!(bbox.right() <= r && bbox.top() <= r);
        assert_eq!(grid.instances().len(), 2);
        assert_eq!(grid.instances()[0].child().shapes().len(), 20);
    }
}
