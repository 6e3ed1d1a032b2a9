//! The grid-sweep driver.
//!
//! A [`SweepPlan`] is read from configuration and run against a
//! [`ChipDesign`]. In `gridsweep` mode every level varies up to two
//! configuration values, one per grid axis; level 0 builds chips and every
//! outer level tiles the grids produced by the level below it. In `array`
//! mode a table of variant indices picks, per cell, one of a fixed set of
//! prebuilt chips.
//!
//! ```yaml
//! sweep_mode: gridsweep
//! sweep_levels:
//!   - {param_x: JJ_width, x: [0.1, 0.12, 0.14], gap_x: 0.1}
//!   - {param_y: [JJ_squid, JJ_bandage], y: [[false, true], [true, true]], gap_y: 0.5}
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use config::{
    apply_sweep_params, validate_selector, ConfigError, ConfigValue, FlatConfig, Issues, Mapping,
    Selector,
};
use layir::Device;

use crate::chip::ChipDesign;
use crate::tiling::{GridSpacing, GridTiler};
use crate::{Error, Result};

pub use crate::params::Frame;

/// The values one grid axis takes and the configuration it changes.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepAxis {
    /// From `param_x` or `param_y`.
    pub selector: Selector,
    /// One value per column (or row), assigned through `selector`.
    pub values: Vec<ConfigValue>,
    /// Spacing between tiles along this axis, as a fraction of the frame size.
    pub gap: f64,
}

impl Default for SweepAxis {
    fn default() -> Self {
        Self {
            selector: Selector::None,
            values: vec![ConfigValue::from(0)],
            gap: 0.,
        }
    }
}

/// One nesting depth of a grid sweep.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SweepLevel {
    /// Columns, left to right.
    pub x: SweepAxis,
    /// Rows, top to bottom.
    pub y: SweepAxis,
}

impl SweepLevel {
    /// Parses a `{param_x, param_y, x, y, gap_x, gap_y}` mapping.
    pub fn from_value(value: &ConfigValue) -> Result<Self> {
        let map = value.as_mapping().ok_or_else(|| ConfigError::Type {
            key: "sweep_levels".to_string(),
            expected: "a list of {param_x, param_y, x, y, gap_x, gap_y} mappings",
        })?;
        Ok(Self {
            x: axis(map, "x")?,
            y: axis(map, "y")?,
        })
    }
}

fn axis(map: &Mapping, name: &str) -> Result<SweepAxis> {
    let default = SweepAxis::default();
    let selector = match map.get(format!("param_{name}").as_str()) {
        Some(value) => Selector::parse(value)?,
        None => default.selector,
    };
    let values = match map.get(name) {
        None => default.values,
        Some(ConfigValue::Sequence(values)) => values.clone(),
        Some(value) => vec![value.clone()],
    };
    let gap = gap(map.get(format!("gap_{name}").as_str()), "sweep_levels")?;
    Ok(SweepAxis {
        selector,
        values,
        gap,
    })
}

fn gap(value: Option<&ConfigValue>, key: &str) -> Result<f64> {
    match value {
        None | Some(ConfigValue::Null) => Ok(0.),
        Some(value) => value.as_f64().ok_or_else(|| {
            ConfigError::Type {
                key: key.to_string(),
                expected: "a number for each gap",
            }
            .into()
        }),
    }
}

/// How a sweep arranges its chips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SweepMode {
    /// Nested grids of swept parameters.
    #[default]
    GridSweep,
    /// A hand-written layout of variants.
    Array,
}

impl FromStr for SweepMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "gridsweep" => Ok(Self::GridSweep),
            "array" => Ok(Self::Array),
            _ => Err(Error::UnknownSweepMode(s.to_string())),
        }
    }
}

impl fmt::Display for SweepMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GridSweep => write!(f, "gridsweep"),
            Self::Array => write!(f, "array"),
        }
    }
}

/// An explicit table of chip variants.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArrayPlan {
    /// Variant indices by row and column; `None` places an empty frame.
    pub layout: Vec<Vec<Option<usize>>>,
    /// Overrides applied to a copy of the base configuration, one mapping of
    /// selector to value per variant.
    pub variants: Vec<Mapping>,
    /// Column spacing as a fraction of the frame width.
    pub gap_x: f64,
    /// Row spacing as a fraction of the frame height.
    pub gap_y: f64,
}

impl ArrayPlan {
    /// Reads `array_layout` (required), `array_variants`, `array_gap_x` and
    /// `array_gap_y`.
    pub fn from_config(config: &FlatConfig) -> Result<Self> {
        let layout_err = || ConfigError::Type {
            key: "array_layout".to_string(),
            expected: "a list of rows of variant indices or nulls",
        };
        let layout = config
            .get("array_layout")?
            .as_sequence()
            .ok_or_else(layout_err)?
            .iter()
            .map(|row| {
                row.as_sequence()
                    .ok_or_else(layout_err)?
                    .iter()
                    .map(|cell| match cell {
                        ConfigValue::Null => Ok(None),
                        cell => cell
                            .as_u64()
                            .and_then(|i| usize::try_from(i).ok())
                            .map(Some)
                            .ok_or_else(layout_err),
                    })
                    .collect::<std::result::Result<Vec<_>, _>>()
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let variants = match config.get_opt("array_variants") {
            None => Vec::new(),
            Some(value) => value
                .as_sequence()
                .and_then(|seq| {
                    seq.iter()
                        .map(|v| v.as_mapping().cloned())
                        .collect::<Option<Vec<_>>>()
                })
                .ok_or_else(|| ConfigError::Type {
                    key: "array_variants".to_string(),
                    expected: "a list of selector-to-value mappings",
                })?,
        };

        Ok(Self {
            layout,
            variants,
            gap_x: gap(config.get_opt("array_gap_x"), "array_gap_x")?,
            gap_y: gap(config.get_opt("array_gap_y"), "array_gap_y")?,
        })
    }

    /// Parses the selectors of one variant.
    fn overrides(variant: &Mapping) -> Result<Vec<(Selector, &ConfigValue)>> {
        variant
            .iter()
            .map(|(key, value)| -> Result<_> {
                let key = key.as_str().ok_or_else(|| ConfigError::Type {
                    key: "array_variants".to_string(),
                    expected: "string selectors as variant keys",
                })?;
                Ok((Selector::parse_str(key)?, value))
            })
            .collect()
    }
}

/// A parsed sweep configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum SweepPlan {
    /// Nested levels, `levels[0]` innermost.
    GridSweep {
        /// At least one level.
        levels: Vec<SweepLevel>,
    },
    /// A single array of variants.
    Array(ArrayPlan),
}

impl SweepPlan {
    /// Reads `sweep_mode` and the keys of that mode.
    ///
    /// Without `sweep_mode` the plan is a grid sweep. Without
    /// `sweep_levels` a grid sweep builds a single chip.
    pub fn from_config(config: &FlatConfig) -> Result<Self> {
        let mode = match config.get_opt("sweep_mode") {
            None => SweepMode::default(),
            Some(_) => config.get_str("sweep_mode")?.parse()?,
        };
        match mode {
            SweepMode::GridSweep => {
                let levels = match config.get_opt("sweep_levels") {
                    None => vec![SweepLevel::default()],
                    Some(value) => value
                        .as_sequence()
                        .ok_or_else(|| ConfigError::Type {
                            key: "sweep_levels".to_string(),
                            expected: "a list of sweep levels",
                        })?
                        .iter()
                        .map(SweepLevel::from_value)
                        .collect::<Result<Vec<_>>>()?,
                };
                Ok(Self::GridSweep { levels })
            }
            SweepMode::Array => Ok(Self::Array(ArrayPlan::from_config(config)?)),
        }
    }

    /// The mode this plan was read as.
    pub fn mode(&self) -> SweepMode {
        match self {
            Self::GridSweep { .. } => SweepMode::GridSweep,
            Self::Array(_) => SweepMode::Array,
        }
    }

    /// Checks every selector of the plan against `config`.
    pub fn validate(&self, config: &FlatConfig) -> Issues {
        let mut issues = Issues::new();
        match self {
            Self::GridSweep { levels } => {
                if levels.is_empty() {
                    issues.error("`sweep_levels` is empty");
                }
                for (i, level) in levels.iter().enumerate() {
                    for (name, axis) in [("x", &level.x), ("y", &level.y)] {
                        validate_axis(config, i, name, axis, &mut issues);
                    }
                }
            }
            Self::Array(plan) => {
                if plan.layout.iter().all(Vec::is_empty) {
                    issues.error("`array_layout` has no cells");
                }
                for (i, variant) in plan.variants.iter().enumerate() {
                    match ArrayPlan::overrides(variant) {
                        Ok(overrides) => {
                            for (selector, _) in overrides {
                                if let Err(err) = validate_selector(config, &selector) {
                                    issues.error(format!("array variant {i}: {err}"));
                                }
                            }
                        }
                        Err(err) => issues.error(format!("array variant {i}: {err}")),
                    }
                }
            }
        }
        issues
    }
}

fn validate_axis(config: &FlatConfig, level: usize, name: &str, axis: &SweepAxis, issues: &mut Issues) {
    if axis.values.is_empty() {
        issues.error(format!("sweep level {level}: `{name}` has no values"));
    }
    if let Err(err) = validate_selector(config, &axis.selector) {
        issues.error(format!("sweep level {level}: `param_{name}`: {err}"));
    }
    if let Selector::List(items) = &axis.selector {
        for (j, value) in axis.values.iter().enumerate() {
            let found = value.as_sequence().map_or(1, Vec::len);
            if found != items.len() {
                issues.error(format!(
                    "sweep level {level}: `{name}[{j}]` has {found} values for {} selectors",
                    items.len()
                ));
            }
        }
    }
}

/// What a chip design is told about the sweep cell it is building.
#[derive(Debug, Clone, Copy)]
pub struct SweepPoint<'a> {
    /// The innermost level's column selector.
    pub param_x: &'a Selector,
    /// The innermost level's row selector.
    pub param_y: &'a Selector,
    /// The column value just applied.
    pub x: &'a ConfigValue,
    /// The row value just applied.
    pub y: &'a ConfigValue,
}

impl<'a> SweepPoint<'a> {
    /// Bundles the selectors and values of one cell.
    pub fn new(
        param_x: &'a Selector,
        param_y: &'a Selector,
        x: &'a ConfigValue,
        y: &'a ConfigValue,
    ) -> Self {
        Self {
            param_x,
            param_y,
            x,
            y,
        }
    }
}

fn spacing(gap_x: f64, gap_y: f64, frame: Frame) -> GridSpacing {
    GridSpacing::new(
        (gap_x * frame.width as f64).round() as i64,
        (gap_y * frame.height as f64).round() as i64,
    )
}

struct Sweeper<'a> {
    design: &'a dyn ChipDesign,
    frame: Frame,
    built: usize,
}

impl Sweeper<'_> {
    fn level(
        &mut self,
        config: &mut FlatConfig,
        levels: &[SweepLevel],
        index: usize,
    ) -> Result<Arc<Device>> {
        let level = &levels[index];
        let mut tiler = GridTiler::new(
            format!("sweep_level{index}"),
            spacing(level.x.gap, level.y.gap, self.frame),
        );
        for (row, y) in level.y.values.iter().enumerate() {
            if row > 0 {
                tiler.end_row();
            }
            for (col, x) in level.x.values.iter().enumerate() {
                apply_sweep_params(config, &level.x.selector, &level.y.selector, x, y)?;
                let cell = if index == 0 {
                    tracing::debug!(row, col, ?x, ?y, "building chip");
                    let point = SweepPoint::new(&level.x.selector, &level.y.selector, x, y);
                    let chip = self.design.build(config, &point, false)?;
                    self.built += 1;
                    Arc::new(chip)
                } else {
                    self.level(config, levels, index - 1)?
                };
                tiler.push(cell);
            }
        }
        Ok(Arc::new(tiler.tile()))
    }

    fn array(&mut self, config: &FlatConfig, plan: &ArrayPlan) -> Result<Arc<Device>> {
        let count = plan.variants.len();
        for (row, cells) in plan.layout.iter().enumerate() {
            for (col, cell) in cells.iter().enumerate() {
                if let Some(index) = *cell {
                    if index >= count {
                        return Err(Error::VariantIndex {
                            row,
                            col,
                            index,
                            count,
                        });
                    }
                }
            }
        }

        let (none, null) = (Selector::None, ConfigValue::Null);
        let point = SweepPoint::new(&none, &none, &null, &null);
        let mut variants = Vec::with_capacity(count + 1);
        for (i, variant) in plan.variants.iter().enumerate() {
            let mut config = config.clone();
            for (selector, value) in ArrayPlan::overrides(variant)? {
                apply_sweep_params(&mut config, &selector, &none, value, &null)?;
            }
            tracing::debug!(variant = i, "building chip variant");
            variants.push(Arc::new(self.design.build(&config, &point, false)?));
            self.built += 1;
        }
        variants.push(Arc::new(self.design.build(config, &point, true)?));

        let mut tiler = GridTiler::new("array", spacing(plan.gap_x, plan.gap_y, self.frame));
        for (row, cells) in plan.layout.iter().enumerate() {
            if row > 0 {
                tiler.end_row();
            }
            for cell in cells {
                tiler.push(variants[cell.unwrap_or(count)].clone());
            }
        }
        Ok(Arc::new(tiler.tile()))
    }
}

/// Runs `plan`, building every chip with `design`.
///
/// The plan is validated against `config` before anything is built. In grid
/// mode `config` is patched in place as the sweep proceeds and holds the
/// values of the last cell afterwards. Any error aborts the whole sweep.
pub fn run_sweep(
    config: &mut FlatConfig,
    plan: &SweepPlan,
    design: &dyn ChipDesign,
) -> Result<Arc<Device>> {
    let issues = plan.validate(config);
    if issues.has_error() {
        return Err(Error::InvalidPlan(issues));
    }

    let frame = Frame::from_config(config)?;
    tracing::info!(mode = %plan.mode(), design = design.name(), "starting sweep");
    let mut sweeper = Sweeper {
        design,
        frame,
        built: 0,
    };
    let top = match plan {
        SweepPlan::GridSweep { levels } => sweeper.level(config, levels, levels.len() - 1)?,
        SweepPlan::Array(array) => sweeper.array(config, array)?,
    };
    tracing::info!(chips = sweeper.built, "finished sweep");
    Ok(top)
}

#[cfg(test)]
mod tests {
    use config::{parse_config, parse_yaml};

    use super::*;

    #[test]
    fn level_fields_default() {
        let value = ConfigValue::Mapping(
            parse_yaml("{param_x: Resonator_radius, x: [70, 80], gap_x: 0.25}").unwrap(),
        );
        let level = SweepLevel::from_value(&value).unwrap();
        assert_eq!(level.x.selector, Selector::Flat("Resonator_radius".to_string()));
        assert_eq!(level.x.values.len(), 2);
        assert_eq!(level.x.gap, 0.25);
        assert_eq!(level.y, SweepAxis::default());
    }

    #[test]
    fn missing_levels_build_one_chip() {
        let config = parse_config("design_name: TcSample\n").unwrap();
        assert_eq!(
            SweepPlan::from_config(&config).unwrap(),
            SweepPlan::GridSweep {
                levels: vec![SweepLevel::default()]
            }
        );
    }

    #[test]
    fn array_layout_accepts_nulls() {
        let config = parse_config(
            r#"
sweep_mode: array
array:
  layout: [[0, null], [1, 0]]
  variants: [{JJ_width: 0.1}, {JJ_width: 0.2}]
  gap_x: 0.5
"#,
        )
        .unwrap();
        let SweepPlan::Array(plan) = SweepPlan::from_config(&config).unwrap() else {
            panic!("expected an array plan");
        };
        assert_eq!(plan.layout, vec![vec![Some(0), None], vec![Some(1), Some(0)]]);
        assert_eq!(plan.variants.len(), 2);
        assert_eq!((plan.gap_x, plan.gap_y), (0.5, 0.));
    }

    #[test]
    fn validation_reports_every_problem() {
        let config = parse_config(
            r#"
JJ:
  width: 0.1
  squid: false
sweep_levels:
  - {param_x: JJ_widht, x: [1]}
  - {param_y: [JJ_width, JJ_squid], y: [[0.2, true], [0.3]]}
"#,
        )
        .unwrap();
        let plan = SweepPlan::from_config(&config).unwrap();
        let issues = plan.validate(&config);
        assert_eq!(issues.num_errors(), 2);
    }
}
