//! Nested YAML configuration for mask generation.
//!
//! Configuration files are nested mappings. They are flattened once into a
//! [`FlatConfig`] whose keys join nested keys with `_`, and individual values
//! can later be overridden by [`Selector`]s naming either a flat key or a
//! `:`-separated [`ConfigPath`] into a structured value.
#![warn(missing_docs)]

mod error;
mod flat;
mod issues;
mod load;
mod path;
mod selector;

#[cfg(test)]
mod tests;

pub use error::{ConfigError, Result};
pub use flat::{flatten, FlatConfig};
pub use issues::{ConfigIssue, Issues, Severity};
pub use load::{load_config, load_yaml, parse_config, parse_yaml};
pub use path::{get_by_path, set_by_path, ConfigPath, PathSegment};
pub use selector::{apply_sweep_params, validate_selector, Selector, DUMMY};

/// A configuration value: a scalar, a sequence, or a nested mapping.
pub type ConfigValue = serde_yaml::Value;

/// A nested configuration mapping.
pub type Mapping = serde_yaml::Mapping;
