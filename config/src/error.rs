use std::path::PathBuf;

/// Result type for configuration operations.
pub type Result<T, E = ConfigError> = std::result::Result<T, E>;

/// An error in loading, reading, or patching configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required key is absent.
    #[error("missing configuration key `{0}`")]
    MissingKey(String),
    /// A value exists but has the wrong shape.
    #[error("configuration key `{key}` should be {expected}")]
    Type {
        /// The offending key.
        key: String,
        /// A description of the expected type.
        expected: &'static str,
    },
    /// A path string does not follow the path grammar.
    #[error("invalid configuration path `{0}`")]
    InvalidPath(String),
    /// A path segment does not exist in the structure being walked.
    #[error("path `{path}` not found: no segment `{segment}`")]
    PathNotFound {
        /// The full path.
        path: String,
        /// The first segment that could not be resolved.
        segment: String,
    },
    /// A selector names neither an existing key nor a path.
    #[error("unrecognized sweep parameter `{0}`")]
    UnknownSelector(String),
    /// A list selector was paired with a value of a different length.
    #[error("selector `{selector}` expects {expected} values but got {found}")]
    SelectorArity {
        /// The list selector.
        selector: String,
        /// The number of selectors in the list.
        expected: usize,
        /// The number of values supplied.
        found: usize,
    },
    /// The YAML text could not be parsed.
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// The configuration file could not be read.
    #[error("failed to read `{path}`: {source}")]
    Io {
        /// The file being read.
        path: PathBuf,
        /// The underlying error.
        source: std::io::Error,
    },
}

impl ConfigError {
    pub(crate) fn type_error(key: impl Into<String>, expected: &'static str) -> Self {
        Self::Type {
            key: key.into(),
            expected,
        }
    }
}
