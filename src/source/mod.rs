//! Configuration sources.
//!
//! A [`Source`] is a typed key-value provider addressed by full key paths
//! (`"database.dsn"`). Every read returns the value, [`ConfigError::KeyNotFound`],
//! or a typing error such as [`ConfigError::TypeMismatch`].

mod env;
mod file;
mod map;

use std::time::Duration;

use crate::ConfigError;

pub use env::EnvSource;
pub use file::{FileSource, Format, Toml, TomlSource, Yaml, YamlSource};
pub use map::MapSource;

/// Capability contract implemented by every configuration source.
///
/// Sources are shared behind `Arc` and may sit in both the plain and the secret
/// chain of a [`Manager`](crate::Manager), so all operations take `&self`.
pub trait Source: Send + Sync + std::fmt::Debug {
    /// Prepares the source for reads. Safe to call when already loaded.
    fn load(&self) -> Result<(), ConfigError>;

    /// Releases held resources. Safe to call when already unloaded.
    fn unload(&self) -> Result<(), ConfigError>;

    fn get_string(&self, key: &str) -> Result<String, ConfigError>;
    fn get_string_slice(&self, key: &str) -> Result<Vec<String>, ConfigError>;

    fn get_int(&self, key: &str) -> Result<isize, ConfigError>;
    fn get_int_slice(&self, key: &str) -> Result<Vec<isize>, ConfigError>;

    fn get_uint(&self, key: &str) -> Result<usize, ConfigError>;
    fn get_uint_slice(&self, key: &str) -> Result<Vec<usize>, ConfigError>;

    fn get_int64(&self, key: &str) -> Result<i64, ConfigError>;
    fn get_int64_slice(&self, key: &str) -> Result<Vec<i64>, ConfigError>;

    fn get_uint64(&self, key: &str) -> Result<u64, ConfigError>;
    fn get_uint64_slice(&self, key: &str) -> Result<Vec<u64>, ConfigError>;

    fn get_bool(&self, key: &str) -> Result<bool, ConfigError>;
    fn get_bool_slice(&self, key: &str) -> Result<Vec<bool>, ConfigError>;

    fn get_float(&self, key: &str) -> Result<f64, ConfigError>;
    fn get_float_slice(&self, key: &str) -> Result<Vec<f64>, ConfigError>;

    fn get_duration(&self, key: &str) -> Result<Duration, ConfigError>;
}
