use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use crate::{
    path::{set_by_path, ConfigPath},
    ConfigError, ConfigValue, Mapping, Result,
};

/// A configuration whose nested mapping keys have been joined into flat keys.
///
/// Keys keep their document order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlatConfig {
    values: IndexMap<String, ConfigValue>,
}

/// Flattens `nested` by joining nested mapping keys with `separator`.
///
/// Only mappings are descended into. Sequences, including sequences of
/// mappings, are kept whole. If two nested paths produce the same flat key,
/// the one visited later wins.
pub fn flatten(nested: &Mapping, separator: &str) -> FlatConfig {
    let mut flat = FlatConfig::default();
    flatten_into(&mut flat, nested, None, separator);
    flat
}

fn flatten_into(flat: &mut FlatConfig, nested: &Mapping, prefix: Option<&str>, separator: &str) {
    for (key, value) in nested {
        let key = key_text(key);
        let key = match prefix {
            Some(prefix) => format!("{prefix}{separator}{key}"),
            None => key,
        };
        match value {
            Value::Mapping(inner) => flatten_into(flat, inner, Some(&key), separator),
            _ => {
                if flat.values.contains_key(&key) {
                    tracing::warn!(key = %key, "flattened key collides with an earlier key; keeping the later value");
                }
                flat.values.insert(key, value.clone());
            }
        }
    }
}

fn key_text(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

impl FlatConfig {
    /// Creates an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of flat keys.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if there are no keys.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns `true` if `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Iterates over keys and values in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &ConfigValue)> {
        self.values.iter()
    }

    /// Sets `key` to `value`, returning the previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<ConfigValue>) -> Option<ConfigValue> {
        self.values.insert(key.into(), value.into())
    }

    /// Gets a value, which may be null.
    pub fn get(&self, key: &str) -> Result<&ConfigValue> {
        self.values
            .get(key)
            .ok_or_else(|| ConfigError::MissingKey(key.to_string()))
    }

    /// Gets a value if it is present and not null.
    pub fn get_opt(&self, key: &str) -> Option<&ConfigValue> {
        self.values.get(key).filter(|v| !v.is_null())
    }

    /// Gets a number. Integers are accepted.
    pub fn get_f64(&self, key: &str) -> Result<f64> {
        self.get(key)?
            .as_f64()
            .ok_or_else(|| ConfigError::type_error(key, "a number"))
    }

    /// Gets an integer.
    pub fn get_i64(&self, key: &str) -> Result<i64> {
        self.get(key)?
            .as_i64()
            .ok_or_else(|| ConfigError::type_error(key, "an integer"))
    }

    /// Gets a boolean.
    pub fn get_bool(&self, key: &str) -> Result<bool> {
        self.get(key)?
            .as_bool()
            .ok_or_else(|| ConfigError::type_error(key, "a boolean"))
    }

    /// Gets a string.
    pub fn get_str(&self, key: &str) -> Result<&str> {
        self.get(key)?
            .as_str()
            .ok_or_else(|| ConfigError::type_error(key, "a string"))
    }

    /// Gets a sequence of numbers.
    pub fn get_f64_list(&self, key: &str) -> Result<Vec<f64>> {
        number_list(self.get(key)?).ok_or_else(|| ConfigError::type_error(key, "a list of numbers"))
    }

    /// Gets an `[x, y]` pair.
    pub fn get_point(&self, key: &str) -> Result<[f64; 2]> {
        point(self.get(key)?).ok_or_else(|| ConfigError::type_error(key, "an [x, y] pair"))
    }

    /// Gets a sequence of `[x, y]` pairs.
    pub fn get_point_list(&self, key: &str) -> Result<Vec<[f64; 2]>> {
        self.get(key)?
            .as_sequence()
            .and_then(|seq| seq.iter().map(point).collect::<Option<Vec<_>>>())
            .ok_or_else(|| ConfigError::type_error(key, "a list of [x, y] pairs"))
    }

    /// Replaces the value at `path`.
    ///
    /// The first segment names a flat key, which must exist. Remaining
    /// segments are walked inside that key's value.
    pub fn set_path(&mut self, path: &ConfigPath, value: ConfigValue) -> Result<()> {
        let slot = self.path_root_mut(path)?;
        match path.tail() {
            Some(rest) => set_by_path(slot, &rest, value).map_err(|err| match err {
                ConfigError::PathNotFound { segment, .. } => ConfigError::PathNotFound {
                    path: path.to_string(),
                    segment,
                },
                other => other,
            }),
            None => {
                *slot = value;
                Ok(())
            }
        }
    }

    /// Reads the value at `path`, using the same rules as [`FlatConfig::set_path`].
    pub fn get_path(&self, path: &ConfigPath) -> Result<&ConfigValue> {
        let first = path.segments()[0].to_string();
        let root = self
            .values
            .get(&first)
            .ok_or_else(|| ConfigError::PathNotFound {
                path: path.to_string(),
                segment: first.clone(),
            })?;
        match path.tail() {
            Some(rest) => crate::path::get_by_path(root, &rest).map_err(|err| match err {
                ConfigError::PathNotFound { segment, .. } => ConfigError::PathNotFound {
                    path: path.to_string(),
                    segment,
                },
                other => other,
            }),
            None => Ok(root),
        }
    }

    fn path_root_mut(&mut self, path: &ConfigPath) -> Result<&mut ConfigValue> {
        let first = path.segments()[0].to_string();
        self.values
            .get_mut(&first)
            .ok_or_else(|| ConfigError::PathNotFound {
                path: path.to_string(),
                segment: first,
            })
    }
}

fn number_list(value: &Value) -> Option<Vec<f64>> {
    value.as_sequence()?.iter().map(Value::as_f64).collect()
}

fn point(value: &Value) -> Option<[f64; 2]> {
    match number_list(value)?.as_slice() {
        [x, y] => Some([*x, *y]),
        _ => None,
    }
}

impl FromIterator<(String, ConfigValue)> for FlatConfig {
    fn from_iter<T: IntoIterator<Item = (String, ConfigValue)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
