use std::cell::{Cell, RefCell};
use std::sync::Arc;

use config::{parse_config, ConfigError};
use gdsconv::{metadata::write_metadata, write_gds, GdsExportOpts};
use geometry::prelude::*;
use layir::{Device, Layer, Place};
use test_log::test;

use crate::sweep::SweepMode;
use crate::*;

const FRAME: &str = r#"
Frame:
  size_width: 10
  size_height: 10
W: 0
H: 0
"#;

fn config_with(extra: &str) -> FlatConfig {
    parse_config(&format!("{FRAME}{extra}")).unwrap()
}

/// A chip whose lower-left corner sits at the origin.
fn chip(width: f64, height: f64) -> Device {
    let mut dev = Device::new("chip");
    dev.add_rect(Layer::new(0), Rect::from_sides(0, 0, um(width), um(height)));
    dev
}

#[test]
fn grid_sweep_tiles_one_row_at_uniform_pitch() {
    let mut config = config_with(
        "sweep_levels:\n  - {param_x: W, param_y: null, x: [1, 2, 3], y: [0], gap_x: 0.1, gap_y: 0.1}\n",
    );
    let plan = SweepPlan::from_config(&config).unwrap();
    assert_eq!(plan.mode(), SweepMode::GridSweep);

    let seen = RefCell::new(Vec::new());
    let design = |config: &FlatConfig, _: &SweepPoint<'_>, _: bool| -> Result<Device> {
        seen.borrow_mut().push(config.get_i64("W")?);
        Ok(chip(10., 10.))
    };
    let top = run_sweep(&mut config, &plan, &design).unwrap();

    assert_eq!(*seen.borrow(), vec![1, 2, 3]);
    assert_eq!(config.get_i64("W").unwrap(), 3);
    let centers = top
        .instances()
        .iter()
        .map(|inst| inst.center().unwrap())
        .collect::<Vec<_>>();
    assert_eq!(
        centers,
        vec![
            Point::new(-11_000, 0),
            Point::zero(),
            Point::new(11_000, 0)
        ]
    );
    assert_eq!(top.center(), Some(Point::zero()));
}

#[test]
fn nested_levels_are_centered_at_every_depth() {
    let mut config = config_with(
        r#"
sweep_levels:
  - {param_x: W, x: [1, 2], param_y: H, y: [0, 3], gap_x: 0.1}
  - {param_x: dummy, x: [0, 1, 2], gap_y: 0.3}
  - {param_y: H, y: [1, 2], gap_y: 1}
"#,
    );
    let plan = SweepPlan::from_config(&config).unwrap();
    let calls = Cell::new(0);
    let design = |config: &FlatConfig, point: &SweepPoint<'_>, _: bool| -> Result<Device> {
        calls.set(calls.get() + 1);
        assert!(matches!(point.param_x, config::Selector::Flat(key) if key == "W"));
        let (w, h) = (config.get_f64("W")?, config.get_f64("H")?);
        Ok(chip(5. + 3. * w, 5. + 2. * h))
    };
    let top = run_sweep(&mut config, &plan, &design).unwrap();

    assert_eq!(calls.get(), 24);
    assert_eq!(top.center(), Some(Point::zero()));
    assert_eq!(top.instances().len(), 2);
    for outer in top.instances() {
        assert_eq!(outer.child().center(), Some(Point::zero()));
        assert_eq!(outer.child().instances().len(), 3);
        for inner in outer.child().instances() {
            assert_eq!(inner.child().center(), Some(Point::zero()));
            assert_eq!(inner.child().instances().len(), 4);
        }
    }
    // Row 0 of the outermost level is on top.
    let rows = top.instances();
    assert!(rows[0].center().unwrap().y > rows[1].center().unwrap().y);
}

#[test]
fn path_selector_patches_inside_a_value() {
    let mut config = config_with(
        r#"
Resonator:
  frequencies: [7.0, 7.5]
sweep_levels:
  - {param_x: "Resonator_frequencies:1", x: [7.2, 7.4]}
"#,
    );
    let plan = SweepPlan::from_config(&config).unwrap();
    let seen = RefCell::new(Vec::new());
    let design = |config: &FlatConfig, _: &SweepPoint<'_>, _: bool| -> Result<Device> {
        seen.borrow_mut()
            .push(config.get_f64_list("Resonator_frequencies")?);
        Ok(chip(1., 1.))
    };
    run_sweep(&mut config, &plan, &design).unwrap();
    assert_eq!(*seen.borrow(), vec![vec![7.0, 7.2], vec![7.0, 7.4]]);
}

#[test]
fn unknown_sweep_mode_is_rejected() {
    let config = config_with("sweep_mode: spiral\n");
    let err = SweepPlan::from_config(&config).unwrap_err();
    assert!(matches!(&err, Error::UnknownSweepMode(mode) if mode == "spiral"));
    assert!(err.to_string().contains("`spiral`"));
}

#[test]
fn broken_selectors_abort_before_building() {
    let mut config = config_with(
        "sweep_levels:\n  - {param_x: Wdith, x: [1, 2]}\n  - {param_y: [W, H], y: [[1, 2], [3, 4]]}\n",
    );
    let before = config.clone();
    let plan = SweepPlan::from_config(&config).unwrap();
    let calls = Cell::new(0);
    let design = |_: &FlatConfig, _: &SweepPoint<'_>, _: bool| -> Result<Device> {
        calls.set(calls.get() + 1);
        Ok(chip(1., 1.))
    };
    match run_sweep(&mut config, &plan, &design) {
        Err(Error::InvalidPlan(issues)) => assert_eq!(issues.num_errors(), 1),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("sweep should fail"),
    }
    assert_eq!(calls.get(), 0);
    assert_eq!(config, before);
}

#[test]
fn failing_cell_aborts_the_sweep() {
    let mut config = config_with("sweep_levels:\n  - {param_x: W, x: [1, 2, 3]}\n");
    let plan = SweepPlan::from_config(&config).unwrap();
    let seen = RefCell::new(Vec::new());
    let design = |config: &FlatConfig, _: &SweepPoint<'_>, _: bool| -> Result<Device> {
        let w = config.get_i64("W")?;
        seen.borrow_mut().push(w);
        if w == 2 {
            return Err(Error::Geometry("cell 2 is broken".to_string()));
        }
        Ok(chip(1., 1.))
    };
    assert!(matches!(
        run_sweep(&mut config, &plan, &design),
        Err(Error::Geometry(_))
    ));
    assert_eq!(*seen.borrow(), vec![1, 2]);
}

#[test]
fn missing_key_propagates() {
    let mut config = config_with("sweep_levels:\n  - {param_x: W, x: [1]}\n");
    let plan = SweepPlan::from_config(&config).unwrap();
    let design = |config: &FlatConfig, _: &SweepPoint<'_>, _: bool| -> Result<Device> {
        config.get_f64("Resonator_radius")?;
        Ok(chip(1., 1.))
    };
    assert!(matches!(
        run_sweep(&mut config, &plan, &design),
        Err(Error::Config(ConfigError::MissingKey(key))) if key == "Resonator_radius"
    ));
}

const ARRAY: &str = r#"
sweep_mode: array
array:
  layout: [[0, null, 1], [1, 0]]
  variants: [{W: 2}, {W: 4}]
  gap_x: 0.5
"#;

fn array_design(
    calls: &Cell<usize>,
) -> impl Fn(&FlatConfig, &SweepPoint<'_>, bool) -> Result<Device> + '_ {
    move |config: &FlatConfig, _: &SweepPoint<'_>, only_frame: bool| {
        calls.set(calls.get() + 1);
        if only_frame {
            let mut frame = chip(10., 10.);
            frame.set_name("frame_only");
            return Ok(frame);
        }
        Ok(chip(config.get_f64("W")?, 10.))
    }
}

#[test]
fn array_mode_places_variants_and_frames() {
    let mut config = config_with(ARRAY);
    let plan = SweepPlan::from_config(&config).unwrap();
    assert_eq!(plan.mode(), SweepMode::Array);

    let calls = Cell::new(0);
    let design = array_design(&calls);
    let top = run_sweep(&mut config, &plan, &design).unwrap();

    assert_eq!(calls.get(), 3);
    assert_eq!(config.get_i64("W").unwrap(), 0);
    let insts = top.instances();
    assert_eq!(insts.len(), 5);
    assert_eq!(insts[1].child().name(), "frame_only");
    assert!(Arc::ptr_eq(insts[0].child(), insts[4].child()));
    assert!(Arc::ptr_eq(insts[2].child(), insts[3].child()));
    assert_eq!(insts[2].child().bbox().unwrap().width(), 4_000);
    assert_eq!(top.center(), Some(Point::zero()));
}

#[test]
fn array_index_out_of_range() {
    let mut config = config_with(&ARRAY.replace("[1, 0]]", "[2, 0]]"));
    let plan = SweepPlan::from_config(&config).unwrap();
    let calls = Cell::new(0);
    let design = array_design(&calls);
    assert!(matches!(
        run_sweep(&mut config, &plan, &design),
        Err(Error::VariantIndex {
            row: 1,
            col: 0,
            index: 2,
            count: 2
        })
    ));
    assert_eq!(calls.get(), 0);
}

const TC_SAMPLE_SWEEP: &str = r#"
design_name: TcSample
Frame:
  size_width: 4500
  size_height: 4500
  width: 300
  layer: 4
LaunchPad:
  trace_width: 20
  trace_gap_width: 11
Feedline_Resonator_gap: 5
FeedLine:
  path_type: straight
  input_pos: [0, 1800]
  output_pos: [0, -1800]
Resonator:
  frequencies: [7.0, 7.5]
sweep_levels:
  - {param_x: Resonator_frequencies, x: [[7.0, 7.5], [7.2, 7.7]], gap_x: 0.1}
"#;

#[test]
fn tc_sample_sweep_writes_gds_and_metadata() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = parse_config(TC_SAMPLE_SWEEP).unwrap();
    let registry = DesignRegistry::with_defaults();
    let design = registry.resolve(&config).unwrap();
    let plan = SweepPlan::from_config(&config).unwrap();
    let top = run_sweep(&mut config, &plan, design.as_ref()).unwrap();

    let bbox = top.bbox().unwrap();
    assert_eq!(bbox.center(), Point::zero());
    // Two frames of 4500 + 2 * 300 um and a 450 um gap.
    assert_eq!(bbox.width(), 2 * 5_100_000 + 450_000);

    let gds = dir.path().join("mask/tc_sample.gds");
    write_gds(
        &top,
        &gds,
        GdsExportOpts {
            name: arcstr::literal!("TcSample"),
            units: None,
        },
    )
    .unwrap();
    assert!(std::fs::metadata(&gds).unwrap().len() > 0);

    let metadata = write_metadata(&top, dir.path().join("mask/tc_sample.yaml")).unwrap();
    assert!(!metadata.devices.is_empty());
}
