use std::path::PathBuf;
use thiserror::Error;

/// Boxed error returned by validation hooks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("key not found: {0}")]
    KeyNotFound(String),

    #[error("type mismatch: {key}: {found} found")]
    TypeMismatch { key: String, found: &'static str },

    #[error("value out of range for {key}: {value} does not fit in {target}")]
    OutOfRange {
        key: String,
        value: String,
        target: &'static str,
    },

    #[error("invalid value for {key} ('{value}'): {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("no secret source defined")]
    NoSecretSourceDefined,

    #[error("no plain source defined")]
    NoPlainSourceDefined,

    #[error("source not loaded")]
    SourceNotLoaded,

    /// Error returned verbatim by a [`Validate`](crate::Validate) hook.
    #[error(transparent)]
    Validation(BoxError),

    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse yaml config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("failed to parse toml config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid duration: {0}")]
    InvalidDuration(String),
}

impl ConfigError {
    /// Returns `true` for the one error kind an optional field may swallow.
    pub fn is_key_not_found(&self) -> bool {
        matches!(self, ConfigError::KeyNotFound(_))
    }

    pub(crate) fn invalid_value(
        key: &str,
        value: impl Into<String>,
        reason: impl std::fmt::Display,
    ) -> Self {
        ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.into(),
            reason: reason.to_string(),
        }
    }

    /// Returns the validation error if it has the given concrete type.
    pub fn downcast_validation<E: std::error::Error + 'static>(&self) -> Option<&E> {
        match self {
            ConfigError::Validation(err) => err.downcast_ref::<E>(),
            _ => None,
        }
    }
}
