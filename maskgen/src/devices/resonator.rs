use std::sync::Arc;

use geometry::boolean::subtract_rects;
use geometry::prelude::*;
use geometry::units::um_point;
use layir::{Device, Port};

use super::layers;
use super::primitives::{bbox_rect, cpw, waveguide};
use crate::{Error, Result};

/// Dimensions of a meandered quarter-wave resonator, in um.
#[derive(Debug, Clone, PartialEq)]
pub struct ResonatorParams {
    /// The final straight run after the last meander turn.
    pub straight1: f64,
    /// The length of each meander leg.
    pub straight2: f64,
    /// The run between the first quarter turn and the meander.
    pub straight3: f64,
    /// The initial run from the open end. Recomputed when
    /// [`norm_to_length`](Self::norm_to_length) is set.
    pub straight4: f64,
    /// Number of meander legs.
    pub n_step: usize,
    /// Bend radius of every turn.
    pub radius: f64,
    /// CPW center conductor width.
    pub width: f64,
    /// CPW gap width.
    pub gap: f64,
    /// Reflect the resonator across the y-axis.
    pub mirror: bool,
    /// Add a transmon coupling pad at the open end.
    pub transmon: bool,
    /// Total centerline length to stretch `straight4` to.
    pub norm_to_length: Option<f64>,
}

impl Default for ResonatorParams {
    fn default() -> Self {
        Self {
            straight1: 240.,
            straight2: 290.,
            straight3: 475.,
            straight4: 1400.,
            n_step: 3,
            radius: 75.,
            width: 10.,
            gap: 6.,
            mirror: false,
            transmon: false,
            norm_to_length: None,
        }
    }
}

impl ResonatorParams {
    fn meander(&self, straight4: f64) -> Path {
        let r = self.radius;
        let mut path = Path::new([0., 0.], 0.);
        path.straight(straight4)
            .arc(r, -90.)
            .straight(self.straight3)
            .arc(r, -180.);
        for i in 0..self.n_step {
            path.straight(self.straight2)
                .arc(r, if i % 2 == 0 { 180. } else { -180. });
        }
        path.straight(self.straight1);
        path
    }

    /// The centerline path, with `straight4` adjusted to meet
    /// [`norm_to_length`](Self::norm_to_length).
    pub fn path(&self) -> Result<Path> {
        let Some(target) = self.norm_to_length else {
            return Ok(self.meander(self.straight4));
        };
        let rest = self.meander(0.).length();
        let straight4 = target - rest;
        if straight4 <= 0. {
            return Err(Error::Geometry(format!(
                "resonator length {target:.1} um is shorter than its fixed sections ({rest:.1} um)"
            )));
        }
        Ok(self.meander(straight4))
    }
}

/// The capacitive coupling pad between a resonator and a transmon.
fn coupling_pad(width: f64) -> Device {
    const PAD: f64 = 700.;
    const CAP_GAP1: f64 = 15.;
    const CAP_WIDTH: f64 = 50.;
    const CAP_LENGTH: f64 = 10.;
    const CAP_GAP2: f64 = 16.;
    const QUBIT_CAP_WIDTH: f64 = 540.;
    const QUBIT_CAP_LENGTH: f64 = 50.;

    let cap = [
        bbox_rect([-0.5 * CAP_WIDTH, 0.], [0.5 * CAP_WIDTH, CAP_LENGTH]),
        bbox_rect([-0.5 * width, -2. * width], [0.5 * width, 0.]),
        bbox_rect([-0.5 * width, -PAD], [0.5 * width, 0.]),
    ];
    let down_bot = CAP_LENGTH + CAP_GAP1;
    let up_bot = down_bot + QUBIT_CAP_LENGTH + CAP_GAP2;
    let qubit_caps = [down_bot, up_bot].map(|bot| {
        bbox_rect(
            [-0.5 * QUBIT_CAP_WIDTH, bot],
            [0.5 * QUBIT_CAP_WIDTH, bot + QUBIT_CAP_LENGTH],
        )
    });
    let shift = CAP_LENGTH + CAP_GAP1 + QUBIT_CAP_LENGTH + 0.5 * CAP_GAP2;
    let pad = bbox_rect(
        [-0.5 * PAD, -0.5 * PAD + shift],
        [0.5 * PAD, 0.5 * PAD + shift],
    );

    let cuts = cap.into_iter().chain(qubit_caps).collect::<Vec<_>>();
    let mut dev = Device::new("coupling_pad");
    dev.add_shapes(layers::ETCH, subtract_rects(&[pad], &cuts));
    dev.add_port("out", Port::new(um_point(0., -width), um(width), 270.));
    dev
}

/// A meandered CPW resonator.
///
/// The `in` port is the open end (or the coupling pad side when
/// [`ResonatorParams::transmon`] is set); `out` is the shorted end.
pub fn resonator(params: &ResonatorParams) -> Result<Device> {
    let path = params.path()?;
    tracing::debug!(length = path.length(), "built resonator path");

    let xs = cpw(params.width, params.gap, Some(layers::FINGER), layers::ETCH);
    let mut line = waveguide("resonator_cpw", &path, &xs, params.width);
    line.rotate(90.);
    line.translate_mut(um_point(-(params.straight1 + params.radius), 0.));

    let mut res = Device::new("resonator");
    let wg = res.add_ref(Arc::new(line));
    let (start, end) = (wg.port("in")?, wg.port("out")?);
    if params.transmon {
        res.add_ref(Arc::new(coupling_pad(params.width)))
            .connect("out", &start)?;
    }
    res.add_port("in", start);
    res.add_port("out", end);
    if params.mirror {
        res.mirror(Point::zero(), Point::new(0, 1))?;
    }
    Ok(res)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    use super::*;

    #[test]
    fn meander_length_adds_up() {
        let params = ResonatorParams::default();
        let path = params.path().unwrap();
        let expected = 240. + 3. * 290. + 475. + 1400. + 75. * (PI / 2. + 4. * PI);
        assert_relative_eq!(path.length(), expected, epsilon = 1e-9);
    }

    #[test]
    fn norm_to_length_stretches_first_straight() {
        let params = ResonatorParams {
            norm_to_length: Some(4000.),
            ..Default::default()
        };
        assert_relative_eq!(params.path().unwrap().length(), 4000., epsilon = 1e-9);

        let short = ResonatorParams {
            norm_to_length: Some(100.),
            ..Default::default()
        };
        assert!(matches!(short.path(), Err(Error::Geometry(_))));
    }

    #[test]
    fn open_end_sits_left_of_origin() {
        let params = ResonatorParams::default();
        let res = resonator(&params).unwrap();
        let port = res.port("in").unwrap();
        assert_eq!(port.midpoint, um_point(-315., 0.));
        assert_relative_eq!(port.orientation, 270.);

        let mirrored = resonator(&ResonatorParams {
            mirror: true,
            ..params
        })
        .unwrap();
        assert_eq!(mirrored.port("in").unwrap().midpoint, um_point(315., 0.));
    }

    #[test]
    fn coupling_pad_attaches_to_open_end() {
        let res = resonator(&ResonatorParams {
            transmon: true,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(res.instances().len(), 2);
        let pad = res.instances()[1].port("out").unwrap();
        assert_eq!(pad.midpoint, res.port("in").unwrap().midpoint);
        assert_relative_eq!(pad.orientation, 90.);
    }
}
