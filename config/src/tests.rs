use serde_yaml::Value;
use test_log::test;

use crate::*;

const NESTED: &str = r#"
design_name: TcSample
Frame:
  size:
    width: 5000
    height: 5000
  layer: 0
Resonator:
  radius: 75
  frequencies: [6.0, 6.2]
FeedLine:
  path_points: [[0, 0], [100, 0], [100, 200]]
sweep_levels:
  - {param_x: Frame_layer, x: [0, 1]}
"#;

fn nested() -> Mapping {
    parse_yaml(NESTED).unwrap()
}

#[test]
fn flatten_joins_keys_and_keeps_sequences_whole() {
    let flat = flatten(&nested(), "_");
    let keys = flat.iter().map(|(k, _)| k.as_str()).collect::<Vec<_>>();
    assert_eq!(
        keys,
        vec![
            "design_name",
            "Frame_size_width",
            "Frame_size_height",
            "Frame_layer",
            "Resonator_radius",
            "Resonator_frequencies",
            "FeedLine_path_points",
            "sweep_levels",
        ]
    );
    assert_eq!(flat.get_f64("Frame_size_width").unwrap(), 5000.);
    assert_eq!(flat.get_f64_list("Resonator_frequencies").unwrap(), vec![6.0, 6.2]);
    assert_eq!(
        flat.get_point_list("FeedLine_path_points").unwrap(),
        vec![[0., 0.], [100., 0.], [100., 200.]]
    );
    assert!(flat.get("sweep_levels").unwrap().is_sequence());
}

#[test]
fn flatten_collision_keeps_later_value() {
    let nested = parse_yaml("a_b: 1\na: {b: 2}\nc: {d: 3}\nc_d: 4").unwrap();
    let flat = flatten(&nested, "_");
    assert_eq!(flat.len(), 2);
    assert_eq!(flat.get_i64("a_b").unwrap(), 2);
    assert_eq!(flat.get_i64("c_d").unwrap(), 4);
}

#[test]
fn flatten_renders_non_string_keys() {
    let nested = parse_yaml("levels: {0: a, true: b}").unwrap();
    let flat = flatten(&nested, "_");
    assert_eq!(flat.get_str("levels_0").unwrap(), "a");
    assert_eq!(flat.get_str("levels_true").unwrap(), "b");
}

#[test]
fn flatten_then_patch_with_identity_values_is_a_no_op() {
    let original = Value::Mapping(nested());
    let flat = flatten(&nested(), ":");
    let mut patched = original.clone();
    for (key, value) in flat.iter() {
        set_by_path(&mut patched, &ConfigPath::parse(key).unwrap(), value.clone()).unwrap();
    }
    assert_eq!(patched, original);
}

#[test]
fn typed_getters_report_key() {
    let flat = flatten(&nested(), "_");
    match flat.get_f64("design_name").unwrap_err() {
        ConfigError::Type { key, .. } => assert_eq!(key, "design_name"),
        other => panic!("unexpected error {other}"),
    }
    assert!(matches!(
        flat.get_f64("nope").unwrap_err(),
        ConfigError::MissingKey(k) if k == "nope"
    ));
}

#[test]
fn flat_selector_assigns_only_its_key() {
    let mut config = flatten(&nested(), "_");
    let before = config.clone();
    let sel = Selector::parse_str("Resonator_radius").unwrap();
    apply_sweep_params(&mut config, &sel, &Selector::None, &Value::from(80), &Value::Null).unwrap();

    assert_eq!(config.get_i64("Resonator_radius").unwrap(), 80);
    for (key, value) in before.iter().filter(|(k, _)| *k != "Resonator_radius") {
        assert_eq!(config.get(key).unwrap(), value);
    }
}

#[test]
fn dummy_selector_creates_its_key() {
    let mut config = flatten(&nested(), "_");
    apply_sweep_params(
        &mut config,
        &Selector::None,
        &Selector::parse_str("dummy").unwrap(),
        &Value::Null,
        &Value::from(3),
    )
    .unwrap();
    assert_eq!(config.get_i64(DUMMY).unwrap(), 3);
}

#[test]
fn path_and_list_selectors() {
    let mut config = flatten(&nested(), "_");
    let sel = Selector::parse(&serde_yaml::from_str("[FeedLine_path_points:1:0, Frame_layer]").unwrap())
        .unwrap();
    assert!(matches!(sel, Selector::List(ref items) if items.len() == 2));
    let x: Value = serde_yaml::from_str("[150, 4]").unwrap();
    apply_sweep_params(&mut config, &sel, &Selector::None, &x, &Value::Null).unwrap();

    assert_eq!(
        config.get_point_list("FeedLine_path_points").unwrap()[1],
        [150., 0.]
    );
    assert_eq!(config.get_i64("Frame_layer").unwrap(), 4);
}

#[test]
fn unknown_selector_leaves_config_unchanged() {
    let mut config = flatten(&nested(), "_");
    let before = config.clone();
    let good = Selector::parse_str("Frame_layer").unwrap();
    let bad = Selector::parse_str("Nonexistent").unwrap();
    let err = apply_sweep_params(&mut config, &good, &bad, &Value::from(9), &Value::from(1))
        .unwrap_err();
    assert!(matches!(err, ConfigError::UnknownSelector(ref s) if s == "Nonexistent"));
    assert_eq!(config, before);

    let bad_path = Selector::parse_str("FeedLine_path_points:7:0").unwrap();
    let err = apply_sweep_params(&mut config, &good, &bad_path, &Value::from(9), &Value::from(1))
        .unwrap_err();
    assert!(matches!(err, ConfigError::PathNotFound { ref segment, .. } if segment == "7"));
    assert_eq!(config, before);
}

#[test]
fn path_broken_by_earlier_assignment_leaves_config_unchanged() {
    let mut config = flatten(&nested(), "_");
    let before = config.clone();
    let key = Selector::parse_str("Resonator_frequencies").unwrap();
    let path = Selector::parse_str("Resonator_frequencies:0").unwrap();
    let err = apply_sweep_params(&mut config, &key, &path, &Value::from(5), &Value::from(9))
        .unwrap_err();
    assert!(matches!(err, ConfigError::PathNotFound { ref segment, .. } if segment == "0"));
    assert_eq!(config, before);
}

#[test]
fn list_selector_requires_matching_values() {
    let mut config = flatten(&nested(), "_");
    let sel = Selector::List(vec![
        Selector::parse_str("Frame_layer").unwrap(),
        Selector::parse_str("Resonator_radius").unwrap(),
    ]);
    let err = apply_sweep_params(
        &mut config,
        &sel,
        &Selector::None,
        &serde_yaml::from_str("[1, 2, 3]").unwrap(),
        &Value::Null,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        ConfigError::SelectorArity {
            expected: 2,
            found: 3,
            ..
        }
    ));
}

#[test]
fn selectors_parse_from_values() {
    assert_eq!(Selector::parse(&Value::Null).unwrap(), Selector::None);
    assert!(matches!(Selector::parse(&Value::from("a:b")).unwrap(), Selector::Path(_)));
    assert!(Selector::parse(&Value::from(3)).is_err());
    assert!(Selector::parse(&serde_yaml::from_str("[[a]]").unwrap()).is_err());
    assert!(Selector::parse_str("a::b").is_err());
}

#[test]
fn validation_collects_every_broken_selector() {
    let config = flatten(&nested(), "_");
    let selectors = ["Frame_layer", "missing_one", "dummy", "Resonator_frequencies:4", "missing_two"];
    let mut issues = Issues::new();
    for s in selectors {
        if let Err(err) = validate_selector(&config, &Selector::parse_str(s).unwrap()) {
            issues.error(err.to_string());
        }
    }
    assert!(issues.has_error());
    assert_eq!(issues.num_errors(), 3);
}

#[test]
fn load_config_reads_and_flattens() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chip.yaml");
    std::fs::write(&path, NESTED).unwrap();
    let config = load_config(&path).unwrap();
    assert_eq!(config.get_str("design_name").unwrap(), "TcSample");

    assert!(matches!(
        load_config(dir.path().join("missing.yaml")).unwrap_err(),
        ConfigError::Io { .. }
    ));
    assert!(parse_yaml("- 1\n- 2").is_err());
}
