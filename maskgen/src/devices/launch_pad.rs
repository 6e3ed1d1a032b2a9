use std::sync::Arc;

use geometry::boolean::subtract_rects;
use geometry::prelude::*;
use geometry::units::um_point;
use layir::{Device, Place, Port};

use super::layers;
use super::primitives::{bbox_rect, cpw, polygon, waveguide};
use crate::params::{FeedLineParams, FeedLineRoute};
use crate::{Error, Result};

const PAD_LENGTH: f64 = 300.;
const PAD_WIDTH: f64 = 200.;
const PADGAP_LENGTH: f64 = 400.;
const PADGAP_WIDTH: f64 = 500.;
const TRACE_LENGTH: f64 = 200.;
const TRACE_WIDTH: f64 = 20.;
const TRACEGAP_WIDTH: f64 = 42.;

/// A bond pad tapering down to a CPW trace, centered at the origin.
///
/// The `out` port sits at the trace tip and faces away from the pad.
pub fn launch_pad() -> Device {
    let mut pad = Device::new("pad");
    pad.add_shapes(
        layers::ETCH,
        subtract_rects(
            &[bbox_rect(
                [0., -0.5 * PADGAP_WIDTH],
                [PADGAP_LENGTH, 0.5 * PADGAP_WIDTH],
            )],
            &[bbox_rect([0., -0.5 * PAD_WIDTH], [PAD_LENGTH, 0.5 * PAD_WIDTH])],
        ),
    );
    let pad_port = Port::new(Point::zero(), um(PADGAP_WIDTH), 180.);
    pad.add_port("out", pad_port);

    // The gap between the outer and inner tapers, as two mirrored quads.
    let mut trace = Device::new("trace");
    for s in [1., -1.] {
        trace.add_polygon(
            layers::ETCH,
            polygon([
                [0., s * 0.5 * PAD_WIDTH],
                [0., s * 0.5 * PADGAP_WIDTH],
                [TRACE_LENGTH, s * 0.5 * TRACEGAP_WIDTH],
                [TRACE_LENGTH, s * 0.5 * TRACE_WIDTH],
            ]),
        );
    }
    trace.add_port("out", pad_port);

    let mut lp = Device::new("launchpad");
    lp.add_ref(Arc::new(pad));
    // Both `out` ports sit at the origin facing -x, so joining them is a half turn.
    lp.add_ref(Arc::new(trace)).rotate(180.);
    lp.add_port(
        "out",
        Port::new(um_point(-TRACE_LENGTH, 0.), um(TRACEGAP_WIDTH), 180.),
    );
    lp.set_center(Point::zero());
    lp
}

/// The feed line: a CPW gap pair routed between two launch pads.
///
/// Ports `in` and `out` are the ends of the CPW, facing away from it.
pub fn feed_line(params: &FeedLineParams) -> Result<Device> {
    let radius = FeedLineParams::BEND_RADIUS;
    let mut points = match &params.route {
        FeedLineRoute::Straight { input, output } => vec![*input, *output],
        FeedLineRoute::Manual {
            input,
            output,
            points,
        } => std::iter::once(*input)
            .chain(points.iter().copied())
            .chain(std::iter::once(*output))
            .collect(),
        FeedLineRoute::Extrude => {
            return Err(Error::Unsupported(
                "feed line path type `extrude`: resonator placement along an extruded route is not defined"
                    .to_string(),
            ))
        }
    };
    points.dedup();
    let path = Path::smooth(&points, radius).ok_or_else(|| {
        Error::Geometry(format!(
            "feed line points {points:?} cannot be joined with {radius} um bends"
        ))
    })?;

    let xs = cpw(params.trace_width, params.trace_gap, None, layers::ETCH);
    let line = Arc::new(waveguide("feedline_cpw", &path, &xs, params.trace_width));
    let pad = Arc::new(launch_pad());

    let mut fl = Device::new("feedline");
    for name in ["in", "out"] {
        let end = *line.port(name)?;
        fl.add_ref(pad.clone()).connect("out", &end)?;
        fl.add_port(name, end);
    }
    fl.add_ref(line);
    Ok(fl)
}

/// A DC bias line launched from a pad near the lower-right chip corner.
pub fn dc_line() -> Result<Device> {
    const RADIUS: f64 = 100.;
    const WIDTH: f64 = 20.;
    const GAP: f64 = 11.;

    let mut dc = Device::new("DCLine");
    let lp = dc.add_ref(Arc::new(launch_pad()));
    lp.translate_mut(um_point(1950., -1300.));
    let dest = lp.port("out")?;

    let mut path = Path::new([0., 0.], 0.);
    path.straight(235.)
        .arc(RADIUS, 90.)
        .straight(805.)
        .arc(RADIUS, -90.)
        .straight(2973.)
        .arc(RADIUS, -90.)
        .straight(2960.);
    let xs = cpw(WIDTH, GAP, Some(layers::FINGER), layers::ETCH);
    let line = waveguide("DCLine_path", &path, &xs, WIDTH);
    dc.add_ref(Arc::new(line)).connect("in", &dest)?;
    Ok(dc)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use geometry::units::to_um;

    use super::*;

    #[test]
    fn launch_pad_is_centered_with_port_at_trace_tip() {
        let lp = launch_pad();
        assert_eq!(lp.name(), "launchpad");
        assert_eq!(
            lp.bbox(),
            Some(Rect::from_sides(-300_000, -250_000, 300_000, 250_000))
        );
        let port = lp.port("out").unwrap();
        assert_eq!(port.midpoint, Point::new(-300_000, 0));
        assert_relative_eq!(port.orientation, 180.);
    }

    #[test]
    fn straight_feed_line_has_pads_at_both_ends() {
        let params = FeedLineParams {
            route: FeedLineRoute::Straight {
                input: [0., 1500.],
                output: [0., -1500.],
            },
            trace_width: 20.,
            trace_gap: 11.,
            resonator_gap: 5.,
        };
        let fl = feed_line(&params).unwrap();
        let bbox = fl.bbox().unwrap();
        // Each pad extends 600 um beyond the line end it attaches to.
        assert_relative_eq!(to_um(bbox.top()), 2100.);
        assert_relative_eq!(to_um(bbox.bot()), -2100.);
        assert_eq!(bbox.center().x, 0);
        assert_relative_eq!(fl.port("in").unwrap().orientation, 90.);
        assert_relative_eq!(fl.port("out").unwrap().orientation, 270.);
    }

    #[test]
    fn extruded_feed_line_is_unsupported() {
        let params = FeedLineParams {
            route: FeedLineRoute::Extrude,
            trace_width: 20.,
            trace_gap: 11.,
            resonator_gap: 5.,
        };
        assert!(matches!(feed_line(&params), Err(Error::Unsupported(_))));
    }

    #[test]
    fn dc_line_starts_at_its_pad() {
        let dc = dc_line().unwrap();
        let line = &dc.instances()[1];
        let start = line.port("in").unwrap();
        let pad = dc.instances()[0].port("out").unwrap();
        assert_eq!(start.midpoint, pad.midpoint);
        assert_relative_eq!(start.orientation, 0.);
    }
}
