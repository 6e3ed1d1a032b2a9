//! Chip designs and the registry that resolves them by name.

use std::sync::Arc;

use config::{ConfigError, FlatConfig};
use geometry::prelude::*;
use indexmap::IndexMap;
use layir::{Device, Place};

use crate::devices::{
    corner_points, eb_line, feed_line, frame, jj, resonator, test_areas, test_boxes,
    ResonatorParams, CORNER_POINTS,
};
use crate::params::{ChipParams, FeedLineParams, FeedLineRoute, JJParams};
use crate::physics::{resonator_length, CpwGeometry, Material};
use crate::sweep::SweepPoint;
use crate::{Error, Result};

/// Builds one chip from the current configuration.
///
/// `point` describes the sweep cell being built. When `only_frame` is set the
/// design returns just its outline, used to fill empty cells of an array
/// layout.
pub trait ChipDesign {
    /// The name the design is registered under.
    fn name(&self) -> &str;

    /// Builds one chip centered at the origin.
    fn build(&self, config: &FlatConfig, point: &SweepPoint<'_>, only_frame: bool)
        -> Result<Device>;
}

impl<F> ChipDesign for F
where
    F: Fn(&FlatConfig, &SweepPoint<'_>, bool) -> Result<Device>,
{
    fn name(&self) -> &str {
        "user_function"
    }

    fn build(
        &self,
        config: &FlatConfig,
        point: &SweepPoint<'_>,
        only_frame: bool,
    ) -> Result<Device> {
        self(config, point, only_frame)
    }
}

/// Design names mapped to designs.
#[derive(Clone, Default)]
pub struct DesignRegistry {
    designs: IndexMap<String, Arc<dyn ChipDesign>>,
}

impl std::fmt::Debug for DesignRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.designs.keys()).finish()
    }
}

impl DesignRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in design.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(TcSample).register(JJTest);
        registry
    }

    /// Registers `design` under its own name, replacing any previous design
    /// with that name.
    pub fn register<D: ChipDesign + 'static>(&mut self, design: D) -> &mut Self {
        self.designs
            .insert(design.name().to_string(), Arc::new(design));
        self
    }

    /// The design registered as `name`, if any.
    pub fn get(&self, name: &str) -> Option<Arc<dyn ChipDesign>> {
        self.designs.get(name).cloned()
    }

    /// Registered names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.designs.keys().map(String::as_str)
    }

    /// Looks up the design named by `design_name`.
    pub fn resolve(&self, config: &FlatConfig) -> Result<Arc<dyn ChipDesign>> {
        let name = config.get_str("design_name")?;
        self.get(name).ok_or_else(|| Error::UnknownDesign {
            name: name.to_string(),
            available: self.names().map(str::to_string).collect(),
        })
    }
}

/// Adds the frame and the corner alignment points shared by every design.
fn outline(config: &FlatConfig) -> Result<Device> {
    let chip = ChipParams::from_config(config)?;
    let mut design = Device::new("chipdesign");
    design.add_ref(Arc::new(frame(&chip)));
    design.add_ref(Arc::new(corner_points(&CORNER_POINTS)));
    Ok(design)
}

/// A critical-temperature sample: a feed line with two quarter-wave
/// resonators coupled to it, one on each side.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcSample;

impl TcSample {
    /// Resonant frequencies, converted from GHz to Hz.
    fn frequencies(config: &FlatConfig) -> Result<[f64; 2]> {
        const KEY: &str = "Resonator_frequencies";
        match config.get_f64_list(KEY)?.as_slice() {
            [f1, f2, ..] => Ok([f1 * 1e9, f2 * 1e9]),
            _ => Err(ConfigError::Type {
                key: KEY.to_string(),
                expected: "a list of two frequencies in GHz",
            }
            .into()),
        }
    }

    /// The left edge and vertical center of each resonator, in um.
    fn resonator_anchors(feed: &FeedLineParams, feed_center_x: f64) -> Result<[[f64; 2]; 2]> {
        let offset = feed.coupling_offset();
        match &feed.route {
            FeedLineRoute::Straight { .. } => Ok([
                [feed_center_x + offset, 500.],
                [feed_center_x + offset, -500.],
            ]),
            FeedLineRoute::Manual {
                input,
                output,
                points,
            } => Ok([
                [points[0][0] + offset, 0.5 * (input[1] + points[0][1])],
                [points[3][0] + offset, 0.5 * (output[1] + points[3][1])],
            ]),
            FeedLineRoute::Extrude => Err(Error::Unsupported(
                "resonator placement along an extruded feed line".to_string(),
            )),
        }
    }
}

impl ChipDesign for TcSample {
    fn name(&self) -> &str {
        "TcSample"
    }

    fn build(
        &self,
        config: &FlatConfig,
        _point: &SweepPoint<'_>,
        only_frame: bool,
    ) -> Result<Device> {
        let mut design = outline(config)?;
        if only_frame {
            return Ok(design);
        }

        let feed = FeedLineParams::from_config(config)?;
        let line = feed_line(&feed)?;
        let feed_center_x = line.center().map_or(0., |c| to_um(c.x));
        design.add_ref(Arc::new(line));

        let material = Material::from_config(config)?;
        let cpw = CpwGeometry::default();
        let lengths = Self::frequencies(config)?.map(|f| resonator_length(f, &cpw, material));
        let anchors = Self::resonator_anchors(&feed, feed_center_x)?;

        let variants = [(700., true, -90.), (1100., false, 90.)];
        for (((straight4, mirror, angle), length), [x, y]) in
            variants.into_iter().zip(lengths).zip(anchors)
        {
            tracing::debug!(%material, length, "placing resonator");
            let params = ResonatorParams {
                straight1: 220.,
                straight2: 260.,
                straight3: 475.,
                straight4,
                mirror,
                norm_to_length: Some(length),
                ..Default::default()
            };
            design
                .add_ref(Arc::new(resonator(&params)?))
                .rotate(angle)
                .set_xmin(um(x))
                .set_y(um(y));
        }
        Ok(design)
    }
}

/// A junction test chip: probe pads and test boxes plus a junction and an
/// e-beam line in the chip center.
#[derive(Debug, Clone, Copy, Default)]
pub struct JJTest;

impl JJTest {
    const EB_LINE_WIDTH: f64 = 0.473;
    const EB_LINE_OFFSET: f64 = 100.;
}

impl ChipDesign for JJTest {
    fn name(&self) -> &str {
        "JJTest"
    }

    fn build(
        &self,
        config: &FlatConfig,
        _point: &SweepPoint<'_>,
        only_frame: bool,
    ) -> Result<Device> {
        let mut design = outline(config)?;
        if only_frame {
            return Ok(design);
        }

        design.add_ref(Arc::new(test_areas(false)));
        design.add_ref(Arc::new(test_boxes(false)));

        let params = JJParams::from_config(config)?;
        tracing::debug!(?params, "placing junction");
        design
            .add_ref(Arc::new(jj(&params)?))
            .set_center(Point::zero());

        let width = match config.get_opt("EBLine_width") {
            Some(_) => config.get_f64("EBLine_width")?,
            None => Self::EB_LINE_WIDTH,
        };
        design
            .add_ref(Arc::new(eb_line(width)?))
            .set_center(Point::new(um(Self::EB_LINE_OFFSET), 0));
        Ok(design)
    }
}
