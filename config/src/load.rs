use std::{fs, path::Path};

use serde_yaml::Value;

use crate::{flatten, ConfigError, FlatConfig, Mapping, Result};

/// Parses YAML text whose top level is a mapping.
pub fn parse_yaml(text: &str) -> Result<Mapping> {
    match serde_yaml::from_str::<Value>(text)? {
        Value::Mapping(map) => Ok(map),
        Value::Null => Ok(Mapping::new()),
        _ => Err(ConfigError::type_error("<root>", "a mapping")),
    }
}

/// Reads a YAML file whose top level is a mapping.
pub fn load_yaml(path: impl AsRef<Path>) -> Result<Mapping> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_yaml(&text)
}

/// Parses YAML text and flattens it with `_`.
pub fn parse_config(text: &str) -> Result<FlatConfig> {
    Ok(flatten(&parse_yaml(text)?, "_"))
}

/// Loads a YAML file and flattens it with `_`.
pub fn load_config(path: impl AsRef<Path>) -> Result<FlatConfig> {
    let path = path.as_ref();
    let config = flatten(&load_yaml(path)?, "_");
    tracing::info!(path = %path.display(), keys = config.len(), "loaded configuration");
    Ok(config)
}
