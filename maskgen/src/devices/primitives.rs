//! Primitive shapes shared by the device recipes.
//!
//! Inputs are in um; the returned geometry is in database units.

use std::f64::consts::TAU;

use geometry::prelude::*;
use geometry::shape::Shape;
use geometry::units::{um_point, DBU_PER_UM};
use layir::{Device, Layer};

fn dbu([x, y]: [f64; 2]) -> [f64; 2] {
    let scale = DBU_PER_UM as f64;
    [x * scale, y * scale]
}

/// A polygon from vertices given in um.
pub fn polygon(verts: impl IntoIterator<Item = [f64; 2]>) -> Polygon {
    Polygon::from_f64_verts(verts.into_iter().map(dbu))
}

/// A `width` by `height` rectangle with its lower-left corner at the origin.
pub fn rectangle(width: f64, height: f64) -> Rect {
    Rect::new(Point::zero(), um_point(width, height))
}

/// A rectangle of the given size centered horizontally on the y-axis, with its
/// bottom edge on the x-axis.
pub fn centered_rectangle(width: f64, height: f64) -> Rect {
    bbox_rect([-0.5 * width, 0.], [0.5 * width, height])
}

/// The rectangle spanned by two opposite corners.
pub fn bbox_rect(p0: [f64; 2], p1: [f64; 2]) -> Rect {
    Rect::new(um_point(p0[0], p0[1]), um_point(p1[0], p1[1]))
}

/// A trapezoid along the x-axis from width `width1` at `x = 0` to `width2` at
/// `x = length`.
///
/// A zero `width2` gives a triangle.
pub fn taper(length: f64, width1: f64, width2: f64) -> Polygon {
    polygon([
        [0., 0.5 * width1],
        [length, 0.5 * width2],
        [length, -0.5 * width2],
        [0., -0.5 * width1],
    ])
}

/// A circle centered at the origin, sampled every `angle_resolution` degrees.
pub fn circle(radius: f64, angle_resolution: f64) -> Polygon {
    let n = (360. / angle_resolution).round().max(3.) as usize;
    polygon((0..n).map(|i| {
        let t = TAU * i as f64 / n as f64;
        [radius * t.cos(), radius * t.sin()]
    }))
}

/// The region between `shape` and its bounding box grown by `border` um.
///
/// A rectangle inverts to the four rectangles of a [`Ring`]; any other
/// polygon inverts to a single keyhole polygon.
pub fn invert(shape: impl Into<Shape>, border: f64) -> Vec<Shape> {
    let shape = shape.into();
    let Some(bbox) = shape.bbox() else {
        return Vec::new();
    };
    match shape {
        Shape::Rect(rect) => Ring::from_inner(rect, geometry::units::um(border))
            .rects()
            .into_iter()
            .map(Shape::from)
            .collect(),
        Shape::Polygon(poly) => {
            let outer = bbox.expand_all(geometry::units::um(border)).to_polygon();
            Polygon::keyhole(&outer, &poly)
                .map(|p| vec![Shape::from(p)])
                .unwrap_or_default()
        }
    }
}

/// The cross section of a coplanar waveguide: an optional center conductor
/// flanked by two gap strips.
pub fn cpw(
    width: f64,
    gap: f64,
    core_layer: Option<Layer>,
    gap_layer: Layer,
) -> CrossSection<Layer> {
    let offset = 0.5 * (width + gap);
    let xs = match core_layer {
        Some(layer) => CrossSection::new().add(width, 0., layer),
        None => CrossSection::new(),
    };
    xs.add(gap, offset, gap_layer).add(gap, -offset, gap_layer)
}

/// Extrudes `xs` along `path` into a new device.
///
/// The device gets an `in` port at the path start facing backwards and an
/// `out` port at the path end facing forwards, both `width` um wide.
pub fn waveguide(
    name: impl Into<arcstr::ArcStr>,
    path: &Path,
    xs: &CrossSection<Layer>,
    width: f64,
) -> Device {
    let mut dev = Device::new(name);
    for (layer, poly) in path.extrude(xs) {
        dev.add_polygon(layer, poly);
    }
    let [x0, y0] = path.start();
    let [x1, y1] = path.end();
    let width = geometry::units::um(width);
    dev.add_port(
        "in",
        layir::Port::new(um_point(x0, y0), width, path.start_heading() + 180.),
    );
    dev.add_port(
        "out",
        layir::Port::new(um_point(x1, y1), width, path.end_heading()),
    );
    dev
}

/// A new device holding every shape of `device` on layer `from`, moved to
/// layer `to`.
///
/// Shapes inside child instances are included, flattened into `device`'s
/// coordinates.
pub fn copy_layer(device: &Device, from: Layer, to: Layer) -> Device {
    let mut out = Device::new(device.name().clone());
    for shape in device.flatten_shapes() {
        if *shape.layer() == from {
            out.add_shape(to, shape.shape().clone());
        }
    }
    out
}
