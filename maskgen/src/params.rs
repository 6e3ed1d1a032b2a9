//! Chip-level parameters read from configuration.
//!
//! Builders never read configuration keys directly; they take one of the
//! structs in this module, constructed once per chip from the current
//! [`FlatConfig`].

use config::{ConfigError, FlatConfig};
use geometry::units::um;
use layir::Layer;

use crate::Result;

/// The nominal footprint of one chip, in database units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    /// From `Frame_size_width`.
    pub width: i64,
    /// From `Frame_size_height`.
    pub height: i64,
}

impl Frame {
    /// Reads the frame size, given in um.
    pub fn from_config(config: &FlatConfig) -> Result<Self> {
        Ok(Self {
            width: um(config.get_f64("Frame_size_width")?),
            height: um(config.get_f64("Frame_size_height")?),
        })
    }
}

/// The dicing frame drawn around every chip.
#[derive(Debug, Clone, PartialEq)]
pub struct ChipParams {
    /// The region enclosed by the border.
    pub frame: Frame,
    /// Width of the etched border outside the frame, in um.
    pub border: f64,
    /// GDS layer of the border, from `Frame_layer`.
    pub layer: Layer,
}

impl ChipParams {
    /// Reads `Frame_size_*`, `Frame_width` and `Frame_layer`.
    pub fn from_config(config: &FlatConfig) -> Result<Self> {
        let layer = config.get_i64("Frame_layer")?;
        let layer = u16::try_from(layer).map_err(|_| ConfigError::Type {
            key: "Frame_layer".to_string(),
            expected: "a GDS layer number between 0 and 65535",
        })?;
        Ok(Self {
            frame: Frame::from_config(config)?,
            border: config.get_f64("Frame_width")?,
            layer: Layer::new(layer),
        })
    }
}

/// How the feed line is routed between its two launch pads.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedLineRoute {
    /// A single straight run from input to output.
    Straight {
        /// The input pad end, in um.
        input: [f64; 2],
        /// The output pad end, in um.
        output: [f64; 2],
    },
    /// A polyline through `points` with rounded corners.
    Manual {
        /// The input pad end, in um.
        input: [f64; 2],
        /// The output pad end, in um.
        output: [f64; 2],
        /// Intermediate corners, at least four.
        points: Vec<[f64; 2]>,
    },
    /// Extrusion along a free-form path; not supported.
    Extrude,
}

/// Feed line and launch pad trace dimensions, in um.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedLineParams {
    /// From `FeedLine_path_type` and the matching position keys.
    pub route: FeedLineRoute,
    /// CPW center conductor width.
    pub trace_width: f64,
    /// CPW gap on each side of the conductor.
    pub trace_gap: f64,
    /// Clearance between the feed line gap and a coupled resonator.
    pub resonator_gap: f64,
}

impl FeedLineParams {
    /// Bend radius of the manual route corners, in um.
    pub const BEND_RADIUS: f64 = 100.;

    /// Reads the route, the `LaunchPad_trace_*` dimensions and
    /// `Feedline_Resonator_gap`.
    pub fn from_config(config: &FlatConfig) -> Result<Self> {
        let route = match config.get_str("FeedLine_path_type")? {
            "straight" => FeedLineRoute::Straight {
                input: config.get_point("FeedLine_input_pos")?,
                output: config.get_point("FeedLine_output_pos")?,
            },
            "manual" => {
                let points = config.get_point_list("FeedLine_path_points")?;
                if points.len() < 4 {
                    return Err(ConfigError::Type {
                        key: "FeedLine_path_points".to_string(),
                        expected: "at least four [x, y] points for a manual route",
                    }
                    .into());
                }
                FeedLineRoute::Manual {
                    input: config.get_point("FeedLine_input_pos")?,
                    output: config.get_point("FeedLine_output_pos")?,
                    points,
                }
            }
            "extrude" => FeedLineRoute::Extrude,
            _ => {
                return Err(ConfigError::Type {
                    key: "FeedLine_path_type".to_string(),
                    expected: "one of `straight`, `manual`, or `extrude`",
                }
                .into())
            }
        };
        Ok(Self {
            route,
            trace_width: config.get_f64("LaunchPad_trace_width")?,
            trace_gap: config.get_f64("LaunchPad_trace_gap_width")?,
            resonator_gap: config.get_f64("Feedline_Resonator_gap")?,
        })
    }

    /// Distance from the feed line centerline to the near edge of a coupled
    /// resonator.
    pub fn coupling_offset(&self) -> f64 {
        0.5 * self.trace_width + self.trace_gap + self.resonator_gap
    }
}

/// The junction flavor drawn by [`jj`](crate::devices::jj).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JunctionKind {
    /// Two crossed fingers.
    #[default]
    Manhattan,
    /// A suspended bridge over a single finger.
    Dolan,
}

/// Josephson junction parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct JJParams {
    /// From `JJ_type`.
    pub kind: JunctionKind,
    /// Junction finger (or Dolan bridge) width in um.
    pub width: f64,
    /// Draws two junctions in a loop.
    pub squid: bool,
    /// Adds bandage patches over the junction leads.
    pub bandage: bool,
}

impl Default for JJParams {
    fn default() -> Self {
        Self {
            kind: JunctionKind::Manhattan,
            width: 0.135,
            squid: false,
            bandage: true,
        }
    }
}

impl JJParams {
    /// Reads `JJ_type`, `JJ_width`, `JJ_squid`, and `JJ_bandage`, falling back
    /// to [`JJParams::default`] for absent keys.
    pub fn from_config(config: &FlatConfig) -> Result<Self> {
        let default = Self::default();
        let kind = match config.get_opt("JJ_type") {
            None => default.kind,
            Some(_) => match config.get_str("JJ_type")? {
                "manhattan" => JunctionKind::Manhattan,
                "dolan" => JunctionKind::Dolan,
                _ => {
                    return Err(ConfigError::Type {
                        key: "JJ_type".to_string(),
                        expected: "`manhattan` or `dolan`",
                    }
                    .into())
                }
            },
        };
        let width = match config.get_opt("JJ_width") {
            Some(_) => config.get_f64("JJ_width")?,
            None => default.width,
        };
        let squid = match config.get_opt("JJ_squid") {
            Some(_) => config.get_bool("JJ_squid")?,
            None => default.squid,
        };
        let bandage = match config.get_opt("JJ_bandage") {
            Some(_) => config.get_bool("JJ_bandage")?,
            None => default.bandage,
        };
        Ok(Self {
            kind,
            width,
            squid,
            bandage,
        })
    }
}

#[cfg(test)]
mod tests {
    use config::parse_config;

    use super::*;
    use crate::Error;

    #[test]
    fn feed_line_route_requires_enough_manual_points() {
        let config = parse_config(
            r#"
LaunchPad:
  trace_width: 20
  trace_gap_width: 11
Feedline_Resonator_gap: 5
FeedLine:
  path_type: manual
  input_pos: [0, 0]
  output_pos: [0, -1000]
  path_points: [[0, 0], [100, 0]]
"#,
        )
        .unwrap();
        assert!(matches!(
            FeedLineParams::from_config(&config),
            Err(Error::Config(ConfigError::Type { .. }))
        ));
    }

    #[test]
    fn jj_params_fall_back_to_defaults() {
        let config = parse_config("JJ:\n  width: 0.2\n  type: dolan\n").unwrap();
        let params = JJParams::from_config(&config).unwrap();
        assert_eq!(params.kind, JunctionKind::Dolan);
        assert_eq!(params.width, 0.2);
        assert!(!params.squid);
        assert!(params.bandage);
    }

    #[test]
    fn frame_layer_must_fit_gds() {
        let config = parse_config(
            "Frame:\n  size_width: 100\n  size_height: 50\n  width: 10\n  layer: 70000\n",
        )
        .unwrap();
        assert!(ChipParams::from_config(&config).is_err());
    }
}
