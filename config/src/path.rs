//! Paths into structured configuration values.

use std::{fmt, str::FromStr};

use serde_yaml::Value;

use crate::{ConfigError, ConfigValue, Result};

/// The separator between [`ConfigPath`] segments.
pub const PATH_SEPARATOR: char = ':';

/// One step of a [`ConfigPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// A mapping key.
    Key(String),
    /// A sequence index, or an integer mapping key.
    Index(usize),
}

/// A parsed path such as `FeedLine_path_points:2:0`.
///
/// Segments made only of decimal digits are indices; all other segments are
/// mapping keys. Empty segments are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConfigPath {
    raw: String,
    segments: Vec<PathSegment>,
}

impl ConfigPath {
    /// Parses a path.
    pub fn parse(raw: &str) -> Result<Self> {
        let segments = raw
            .split(PATH_SEPARATOR)
            .map(|seg| {
                if seg.is_empty() {
                    Err(ConfigError::InvalidPath(raw.to_string()))
                } else if seg.bytes().all(|b| b.is_ascii_digit()) {
                    seg.parse()
                        .map(PathSegment::Index)
                        .map_err(|_| ConfigError::InvalidPath(raw.to_string()))
                } else {
                    Ok(PathSegment::Key(seg.to_string()))
                }
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    /// The path as written.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The parsed segments. Never empty.
    #[inline]
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// The path with its first segment removed, or `None` if only one
    /// segment remains.
    pub fn tail(&self) -> Option<ConfigPath> {
        if self.segments.len() < 2 {
            return None;
        }
        let raw = self
            .raw
            .split_once(PATH_SEPARATOR)
            .map(|(_, rest)| rest.to_string())
            .unwrap_or_default();
        Some(Self {
            raw,
            segments: self.segments[1..].to_vec(),
        })
    }
}

impl FromStr for ConfigPath {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for ConfigPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => write!(f, "{key}"),
            Self::Index(i) => write!(f, "{i}"),
        }
    }
}

fn not_found(path: &ConfigPath, segment: &PathSegment) -> ConfigError {
    ConfigError::PathNotFound {
        path: path.to_string(),
        segment: segment.to_string(),
    }
}

fn child<'a>(value: &'a Value, segment: &PathSegment) -> Option<&'a Value> {
    match (value, segment) {
        (Value::Sequence(seq), PathSegment::Index(i)) => seq.get(*i),
        (Value::Mapping(map), PathSegment::Index(i)) => map.get(Value::from(*i as u64)),
        (Value::Mapping(map), PathSegment::Key(key)) => map.get(key.as_str()),
        _ => None,
    }
}

fn child_mut<'a>(value: &'a mut Value, segment: &PathSegment) -> Option<&'a mut Value> {
    match (value, segment) {
        (Value::Sequence(seq), PathSegment::Index(i)) => seq.get_mut(*i),
        (Value::Mapping(map), PathSegment::Index(i)) => map.get_mut(Value::from(*i as u64)),
        (Value::Mapping(map), PathSegment::Key(key)) => map.get_mut(key.as_str()),
        _ => None,
    }
}

/// Reads the value at `path` inside `root`.
pub fn get_by_path<'a>(root: &'a ConfigValue, path: &ConfigPath) -> Result<&'a ConfigValue> {
    path.segments().iter().try_fold(root, |value, segment| {
        child(value, segment).ok_or_else(|| not_found(path, segment))
    })
}

/// Replaces the value at `path` inside `root`.
///
/// Every segment, including the last, must already exist. On failure `root`
/// is left unmodified.
pub fn set_by_path(root: &mut ConfigValue, path: &ConfigPath, value: ConfigValue) -> Result<()> {
    let slot = path.segments().iter().try_fold(root, |value, segment| {
        child_mut(value, segment).ok_or_else(|| not_found(path, segment))
    })?;
    *slot = value;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(s: &str) -> ConfigValue {
        serde_yaml::from_str(s).unwrap()
    }

    #[test]
    fn parse_distinguishes_keys_and_indices() {
        let path = ConfigPath::parse("points:2:x").unwrap();
        assert_eq!(
            path.segments(),
            &[
                PathSegment::Key("points".into()),
                PathSegment::Index(2),
                PathSegment::Key("x".into()),
            ]
        );
        assert_eq!(path.tail().unwrap().as_str(), "2:x");
        assert!(ConfigPath::parse("a::b").is_err());
        assert!(ConfigPath::parse("").is_err());
        assert!(ConfigPath::parse("a:").is_err());
    }

    #[test]
    fn set_replaces_only_the_target() {
        let mut cfg = yaml("Resonator: {radius: 75, width: 10}");
        let path = ConfigPath::parse("Resonator:radius").unwrap();
        set_by_path(&mut cfg, &path, Value::from(80)).unwrap();
        assert_eq!(cfg["Resonator"]["radius"], Value::from(80));
        assert_eq!(cfg["Resonator"]["width"], Value::from(10));
        assert_eq!(get_by_path(&cfg, &path).unwrap(), &Value::from(80));
    }

    #[test]
    fn set_indexes_sequences_and_integer_keys() {
        let mut cfg = yaml("pts: [[0, 0], [10, 20]]\nlevels: {1: a}");
        set_by_path(&mut cfg, &"pts:1:0".parse().unwrap(), Value::from(5)).unwrap();
        assert_eq!(cfg["pts"][1][0], Value::from(5));
        set_by_path(&mut cfg, &"levels:1".parse().unwrap(), Value::from("b")).unwrap();
        assert_eq!(cfg["levels"][1], Value::from("b"));
    }

    #[test]
    fn missing_segments_fail_without_mutation() {
        let mut cfg = yaml("a: {b: [1, 2]}");
        let before = cfg.clone();
        for (path, segment) in [("a:c", "c"), ("a:b:5", "5"), ("a:b:0:x", "x"), ("z", "z")] {
            let err = set_by_path(&mut cfg, &path.parse().unwrap(), Value::Null).unwrap_err();
            match err {
                ConfigError::PathNotFound { segment: s, .. } => assert_eq!(s, segment),
                other => panic!("unexpected error {other}"),
            }
        }
        assert_eq!(cfg, before);
    }
}
