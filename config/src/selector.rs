//! Sweep parameter selectors.

use std::fmt;

use serde_yaml::Value;

use crate::{
    path::{ConfigPath, PATH_SEPARATOR},
    ConfigError, ConfigValue, FlatConfig, Result,
};

/// The selector that always accepts an assignment, creating its key if needed.
pub const DUMMY: &str = "dummy";

/// Names the configuration value(s) a sweep axis varies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selector {
    /// The axis does not change the configuration.
    #[default]
    None,
    /// A flat configuration key.
    Flat(String),
    /// A path whose first segment is a flat key.
    Path(ConfigPath),
    /// The `dummy` placeholder key.
    Dummy,
    /// Several selectors set together from a sequence of values.
    List(Vec<Selector>),
}

impl Selector {
    /// Parses a selector from a null, a string, or a sequence of strings.
    pub fn parse(value: &ConfigValue) -> Result<Self> {
        match value {
            Value::Null => Ok(Self::None),
            Value::String(s) => Self::parse_str(s),
            Value::Sequence(items) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => Self::parse_str(s),
                    _ => Err(ConfigError::type_error(
                        "selector",
                        "a selector list containing only strings",
                    )),
                })
                .collect::<Result<Vec<_>>>()
                .map(Self::List),
            _ => Err(ConfigError::type_error(
                "selector",
                "a selector: null, a string, or a list of strings",
            )),
        }
    }

    /// Parses a single selector string.
    pub fn parse_str(s: &str) -> Result<Self> {
        if s.contains(PATH_SEPARATOR) {
            Ok(Self::Path(ConfigPath::parse(s)?))
        } else if s == DUMMY {
            Ok(Self::Dummy)
        } else {
            Ok(Self::Flat(s.to_string()))
        }
    }

    /// Returns `true` for [`Selector::None`].
    #[inline]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "null"),
            Self::Flat(key) => write!(f, "{key}"),
            Self::Path(path) => write!(f, "{path}"),
            Self::Dummy => write!(f, "{DUMMY}"),
            Self::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

enum Target<'a> {
    Key(&'a str),
    Path(&'a ConfigPath),
}

/// Resolves `selector` against `config` without assigning anything.
fn resolve<'a>(
    config: &FlatConfig,
    selector: &'a Selector,
    value: &ConfigValue,
    out: &mut Vec<(Target<'a>, ConfigValue)>,
) -> Result<()> {
    match selector {
        Selector::None => {}
        Selector::List(items) => {
            let values = value.as_sequence().ok_or(ConfigError::SelectorArity {
                selector: selector.to_string(),
                expected: items.len(),
                found: 1,
            })?;
            if values.len() != items.len() {
                return Err(ConfigError::SelectorArity {
                    selector: selector.to_string(),
                    expected: items.len(),
                    found: values.len(),
                });
            }
            for (item, value) in items.iter().zip(values) {
                resolve(config, item, value, out)?;
            }
        }
        Selector::Path(path) => {
            config.get_path(path)?;
            out.push((Target::Path(path), value.clone()));
        }
        Selector::Flat(key) if config.contains_key(key) => {
            out.push((Target::Key(key), value.clone()));
        }
        Selector::Flat(key) => return Err(ConfigError::UnknownSelector(key.clone())),
        Selector::Dummy => out.push((Target::Key(DUMMY), value.clone())),
    }
    Ok(())
}

/// Applies the values of one sweep cell to `config`.
///
/// Both selectors are resolved before anything is assigned, and the
/// assignments are made on a copy that replaces `config` only once every one
/// succeeds, so on error `config` is unchanged. An earlier assignment can
/// still invalidate a later path, e.g. `pts` set to a scalar before `pts:0`.
/// When both axes name the same value, `y` wins.
pub fn apply_sweep_params(
    config: &mut FlatConfig,
    param_x: &Selector,
    param_y: &Selector,
    x: &ConfigValue,
    y: &ConfigValue,
) -> Result<()> {
    let mut assignments = Vec::new();
    resolve(config, param_x, x, &mut assignments)?;
    resolve(config, param_y, y, &mut assignments)?;
    let mut patched = config.clone();
    for (target, value) in assignments {
        match target {
            Target::Key(key) => {
                patched.set(key, value);
            }
            Target::Path(path) => patched.set_path(path, value)?,
        }
    }
    *config = patched;
    Ok(())
}

/// Checks that every key and path named by `selector` exists in `config`.
pub fn validate_selector(config: &FlatConfig, selector: &Selector) -> Result<()> {
    match selector {
        Selector::None | Selector::Dummy => Ok(()),
        Selector::List(items) => items
            .iter()
            .try_for_each(|item| validate_selector(config, item)),
        Selector::Path(path) => config.get_path(path).map(|_| ()),
        Selector::Flat(key) if config.contains_key(key) => Ok(()),
        Selector::Flat(key) => Err(ConfigError::UnknownSelector(key.clone())),
    }
}
