use std::sync::Arc;

use geometry::boolean::subtract_rects;
use geometry::prelude::*;
use geometry::units::um_point;
use layir::{Device, Layer, Place};

use super::layers;
use super::primitives::{bbox_rect, invert, rectangle};
use crate::params::ChipParams;

/// Default corner point centers, in um.
pub const CORNER_POINTS: [[f64; 2]; 4] = [
    [2150., 2150.],
    [-2150., 2150.],
    [-2150., -2150.],
    [2150., -2150.],
];

/// Default e-beam marker centers on a 4-inch wafer, in um.
pub const EB_MARKERS: [[f64; 2]; 7] = [
    [0., 0.],
    [0., 38400.],
    [-19200., -28800.],
    [38400., 0.],
    [0., -38400.],
    [-19200., -38400.],
    [-38400., 0.],
];

/// The etched border around a chip, centered at the origin.
pub fn frame(params: &ChipParams) -> Device {
    let mut frame = Device::new("frame");
    let inner = Rect::from_center_dims(Point::zero(), params.frame.width, params.frame.height);
    frame.add_shapes(params.layer, invert(inner, params.border));
    frame
}

/// Square alignment windows etched at each of `positions`.
pub fn corner_points(positions: &[[f64; 2]]) -> Device {
    let mut point = Device::new("CornerPoint");
    point.add_shapes(layers::ETCH, invert(rectangle(10., 10.), 20.));
    let point = Arc::new(point);

    let mut cp = Device::new("CornerPoints");
    for &[x, y] in positions {
        cp.add_ref(point.clone()).set_center(um_point(x, y));
    }
    cp
}

fn eb_marker(layer: Layer) -> Device {
    let mut marker = Device::new("EBmarker");
    // Center cross inside a square ring.
    marker.add_rect(layer, bbox_rect([-5., -20.], [5., 20.]));
    marker.add_rect(layer, bbox_rect([-20., -5.], [20., 5.]));
    marker.add_shapes(
        layer,
        subtract_rects(
            &[bbox_rect([-40., -40.], [40., 40.])],
            &[bbox_rect([-30., -30.], [30., 30.])],
        ),
    );
    // Fiducials and long guide bars on all four sides.
    let fiducial = bbox_rect([-5., -205.], [5., -195.]);
    let guide = rectangle(10., 1850.).translate(um_point(-5., 500.));
    for angle in [0., 90., 180., 270.] {
        let rot = Transformation::rotate(angle);
        marker.add_rect(layer, fiducial.transform(rot));
        marker.add_rect(layer, guide.transform(rot));
    }
    marker
}

/// E-beam lithography alignment markers centered at each of `positions`.
pub fn eb_markers(positions: &[[f64; 2]], layer: Layer) -> Device {
    let marker = Arc::new(eb_marker(layer));
    let mut markers = Device::new("EBmarkers");
    for &[x, y] in positions {
        markers.add_ref(marker.clone()).set_center(um_point(x, y));
    }
    markers
}
