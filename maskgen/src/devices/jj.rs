//! Josephson junctions and e-beam test lines.
//!
//! Junctions are assembled from small finger and box devices joined
//! port-to-port, so the dimensions below read the same as the drawn chain.

use std::sync::Arc;

use geometry::prelude::*;
use geometry::units::um_point;
use layir::{Device, Place, Port};

use super::layers::{BOX, FINGER};
use super::primitives::{bbox_rect, centered_rectangle, polygon, rectangle};
use crate::params::{JJParams, JunctionKind};
use crate::Result;

const SQUID_OFFSET: f64 = -10.;
const MIRROR_Y: f64 = -18.;
const PAD_ROUNDING: f64 = 2.;

fn port(x: f64, y: f64, width: f64, orientation: f64) -> Port {
    Port::new(um_point(x, y), um(width), orientation)
}

/// A vertical finger with `in` at the top facing up and `out` at the bottom
/// facing down.
fn finger(name: &str, width: f64, length: f64) -> Arc<Device> {
    let mut dev = Device::new(name);
    dev.add_rect(FINGER, centered_rectangle(width, length));
    dev.add_port("in", port(0., length, width, 90.));
    dev.add_port("out", port(0., 0., width, 270.));
    Arc::new(dev)
}

/// A square landing box whose `out` port overlaps its bottom edge by
/// `overlay`.
fn landing_box(name: &str, size: f64, overlay: f64, port_width: f64) -> Arc<Device> {
    let mut dev = Device::new(name);
    dev.add_rect(BOX, centered_rectangle(size, size));
    dev.add_port("out", port(0., overlay, port_width, 270.));
    Arc::new(dev)
}

/// An 18 um wide pad narrowing to a point 16 um below its base, with
/// rounded corners.
fn pointed_pad() -> Polygon {
    polygon([[-9., 10.], [-9., 0.], [0., -16.], [9., 0.], [9., 10.]])
        .fillet(um(PAD_ROUNDING) as f64, 72)
}

/// Places `half` and its reflection across `y = MIRROR_Y`.
fn mirrored_pair(half: Device) -> Result<Device> {
    let half = Arc::new(half);
    let mut pair = Device::new("JJ_pair");
    pair.add_ref(half.clone());
    pair.add_ref(half)
        .mirror(um_point(-5., MIRROR_Y), um_point(5., MIRROR_Y))?;
    Ok(pair)
}

fn manhattan_bandage(width: f64) -> Result<Device> {
    let box_outer = landing_box("JJ_box_outer", 1.8, 0.68, 0.405);
    let box_inner = landing_box("JJ_box_inner", 0.9, 0.18, 0.315);

    let mut half = Device::new("JJ_half");
    let p = half.add_ref(box_outer).port("out")?;
    let p = half
        .add_ref(finger("JJ_finger_outer1", 0.405, 13.7))
        .connect("in", &p)?
        .port("out")?;
    let p = half
        .add_ref(finger("JJ_finger_outer2", 0.315, 3.6))
        .connect("in", &p)?
        .port("out")?;
    half.add_ref(box_inner.clone()).connect("out", &p)?;

    let tilted = half.add_ref(box_inner.clone());
    tilted.rotate(45.).set_center(um_point(-1.5, -13.5));
    let p = tilted.port("out")?;
    let p = half
        .add_ref(finger("JJ_finger_inner1", 0.315, 4.5))
        .connect("in", &p)?
        .port("out")?;
    let p = half
        .add_ref(finger("JJ_finger_inner2", width, 4.2))
        .connect("in", &p)?
        .port("out")?;
    half.add_ref(box_inner).connect("out", &p)?;

    mirrored_pair(half)
}

fn manhattan_pad(width: f64, squid: bool) -> Result<Device> {
    const FINGER_LENGTH: f64 = 8.;
    const PAD_OVERLAP: f64 = 2.;
    const TRIANGLE_LENGTH: f64 = 16.;

    let mut finger = Device::new("JJ_finger");
    finger.add_rect(
        FINGER,
        bbox_rect(
            [0., -0.5 * width],
            [FINGER_LENGTH + PAD_OVERLAP, 0.5 * width],
        ),
    );
    finger.add_port("out1", port(PAD_OVERLAP, 0., width, 180.));
    finger.add_port("end", port(FINGER_LENGTH + PAD_OVERLAP, 0., width, 0.));
    let finger = Arc::new(finger);
    let landing = landing_box("JJ_box", 1.2, 0.24, width);

    let mut half = Device::new("JJ_half");
    half.add_polygon(FINGER, pointed_pad());
    let tip = -0.95 * (TRIANGLE_LENGTH - PAD_ROUNDING);
    let mut sites = vec![port(0., tip, 18., 315.)];
    if squid {
        sites.push(port(0., tip, 18., 225.));
    }
    for site in sites {
        let end = half
            .add_ref(finger.clone())
            .connect("out1", &site)?
            .port("end")?;
        half.add_ref(landing.clone()).connect("out", &end)?;
    }
    mirrored_pair(half)
}

struct DolanParts {
    finger: Arc<Device>,
    bridge: Arc<Device>,
}

impl DolanParts {
    fn new(width: f64) -> Self {
        let mut finger = Device::new("JJ_finger");
        finger.add_rect(FINGER, bbox_rect([-0.1, -1.5], [0.1, 0.]));
        finger.add_port("finger_bridge", port(0., 0., 0.2, 90.));
        finger.add_port("finger_pad", port(0., -1.5, 0.2, 270.));

        let mut bridge = Device::new("JJ_bridge");
        bridge.add_rect(BOX, rectangle(width, 2.));
        bridge.add_port("bridge_finger", port(0.5 * width, 0.8, 0.2, 270.));
        bridge.add_port("bridge_pad", port(0.5 * width, 2. - 0.42, 0.2, 90.));

        Self {
            finger: Arc::new(finger),
            bridge: Arc::new(bridge),
        }
    }

    /// Adds the finger and bridge to `half`, returning the ports where the
    /// upper and lower pads attach.
    fn place(&self, half: &mut Device) -> Result<(Port, Port)> {
        let f = half.add_ref(self.finger.clone());
        let (to_bridge, to_pad) = (f.port("finger_bridge")?, f.port("finger_pad")?);
        let up = half
            .add_ref(self.bridge.clone())
            .connect("bridge_finger", &to_bridge)?
            .port("bridge_pad")?;
        Ok((up, to_pad))
    }
}

fn inner_pad(bandages: usize) -> Arc<Device> {
    const WIDTH: f64 = 2.;
    const LENGTH: f64 = 16.;
    let mut pad = Device::new(if bandages > 0 { "JJ_pad" } else { "JJ_pad_inner" });
    pad.add_rect(FINGER, rectangle(WIDTH, LENGTH));
    pad.add_port("out", port(0.5 * WIDTH, 0., WIDTH, 270.));
    for i in 0..bandages {
        let y = LENGTH - (i + 1) as f64 * 0.65 - (i as f64 + 0.5) * 0.45;
        pad.add_port(format!("bandage{i}"), port(0.5 * WIDTH, y, 0.45, 0.));
    }
    Arc::new(pad)
}

fn dolan_bandage(width: f64) -> Result<Device> {
    const BANDAGES: usize = 4;
    let parts = DolanParts::new(width);
    let pad = inner_pad(BANDAGES);

    let mut bandage1 = Device::new("JJ_bandage1");
    bandage1.add_rect(FINGER, rectangle(0.2, 3.));
    bandage1.add_port("pad", port(0.1, 0., 0.2, 270.));
    let mut bandage2 = Device::new("JJ_bandage2");
    bandage2.add_rect(BOX, rectangle(0.45, 3.2));
    bandage2.add_port("pad", port(0.225, 0., 0.45, 270.));
    let bandages = [Arc::new(bandage1), Arc::new(bandage2)];

    let mut half = Device::new("JJ_half");
    let (up, down) = parts.place(&mut half)?;
    let mut sites = Vec::new();
    let upper = half.add_ref(pad.clone());
    upper.connect("out", &up)?;
    sites.extend((0..BANDAGES).map(|i| upper.port(&format!("bandage{i}"))));
    let lower = half.add_ref(pad);
    lower
        .mirror(Point::zero(), um_point(0., -5.))?
        .connect("out", &down)?;
    sites.extend((0..BANDAGES).map(|i| lower.port(&format!("bandage{i}"))));

    for site in sites {
        let site = site?;
        for bandage in &bandages {
            half.add_ref(bandage.clone()).connect("pad", &site)?;
        }
    }
    Ok(half)
}

fn dolan_pad(width: f64) -> Result<Device> {
    let parts = DolanParts::new(width);
    let inner = inner_pad(0);
    let mut outer = Device::new("JJ_pad_outer");
    outer.add_polygon(FINGER, pointed_pad());
    outer.add_port("out", port(0., -(16. + 4.5), 18., 270.));
    let outer = Arc::new(outer);

    let mut half = Device::new("JJ_half");
    let (up, down) = parts.place(&mut half)?;
    for dest in [up, down] {
        let p = half
            .add_ref(inner.clone())
            .connect("out", &dest)?
            .port("out")?;
        half.add_ref(outer.clone()).connect("out", &p)?;
    }
    Ok(half)
}

/// A Josephson junction centered at the origin.
///
/// With [`JJParams::squid`] set, two junctions are placed 10 um apart to form
/// a SQUID loop; for Manhattan junctions without bandages the two fingers
/// share one pad pair instead.
pub fn jj(params: &JJParams) -> Result<Device> {
    let (core, duplicate) = match (params.kind, params.bandage) {
        (JunctionKind::Manhattan, true) => (manhattan_bandage(params.width)?, params.squid),
        (JunctionKind::Manhattan, false) => (manhattan_pad(params.width, params.squid)?, false),
        (JunctionKind::Dolan, true) => (dolan_bandage(params.width)?, params.squid),
        (JunctionKind::Dolan, false) => (dolan_pad(params.width)?, params.squid),
    };
    let core = Arc::new(core);
    let mut jj = Device::new("JJ");
    jj.add_ref(core.clone());
    if duplicate {
        jj.add_ref(core).translate_mut(um_point(SQUID_OFFSET, 0.));
    }
    jj.set_center(Point::zero());
    Ok(jj)
}

/// A straight e-beam test line of the given width between two landing boxes,
/// centered at the origin.
pub fn eb_line(width: f64) -> Result<Device> {
    let landing = landing_box("EBLine_box", 2.7, 0.27, 0.608);
    let outer = finger("EBLine_finger_outer", 0.608, 10.8);

    let mut eb = Device::new("EBLine");
    let p = eb.add_ref(landing.clone()).port("out")?;
    let p = eb.add_ref(outer.clone()).connect("in", &p)?.port("out")?;
    let p = eb
        .add_ref(finger("EBLine_finger_inner", width, 16.2))
        .connect("in", &p)?
        .port("out")?;
    let p = eb.add_ref(outer).connect("in", &p)?.port("out")?;
    eb.add_ref(landing).connect("out", &p)?;
    eb.set_center(Point::zero());
    Ok(eb)
}
