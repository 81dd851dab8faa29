//! In-memory, map-backed source.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use toml::{Table, Value};

use super::Source;
use crate::duration::parse_duration;
use crate::ConfigError;

const DEFAULT_SEPARATOR: &str = ".";

/// A source serving values from an in-memory table.
///
/// Nested tables are flattened into separator-joined keys when the source is
/// built, so `{ database = { dsn = "..." } }` is read as `"database.dsn"`.
/// Reads are strictly typed: a string is never coerced into a number.
#[derive(Debug)]
pub struct MapSource {
    data: RwLock<Option<HashMap<String, Value>>>,
}

impl MapSource {
    /// Creates a loaded source from a nested table, joining keys with `.`.
    pub fn new(table: Table) -> Self {
        Self::with_separator(table, DEFAULT_SEPARATOR)
    }

    /// Creates a loaded source joining nested keys with `separator`.
    ///
    /// The separator should match the one of the [`Manager`](crate::Manager)
    /// the source is registered with.
    pub fn with_separator(table: Table, separator: &str) -> Self {
        Self {
            data: RwLock::new(Some(flatten(table, separator))),
        }
    }

    /// Creates a source holding no data; every read fails until [`replace`](Self::replace).
    pub(crate) fn unloaded() -> Self {
        Self {
            data: RwLock::new(None),
        }
    }

    pub(crate) fn replace(&self, table: Table, separator: &str) {
        let mut data = self.data.write().unwrap_or_else(PoisonError::into_inner);
        *data = Some(flatten(table, separator));
    }

    pub fn is_loaded(&self) -> bool {
        self.data
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn with_value<T>(
        &self,
        key: &str,
        read: impl FnOnce(&Value) -> Result<T, ConfigError>,
    ) -> Result<T, ConfigError> {
        let data = self.data.read().unwrap_or_else(PoisonError::into_inner);
        let data = data.as_ref().ok_or(ConfigError::SourceNotLoaded)?;
        let value = data
            .get(key)
            .ok_or_else(|| ConfigError::KeyNotFound(key.to_string()))?;
        read(value)
    }

    fn scalar<T>(
        &self,
        key: &str,
        extract: impl Fn(&str, &Value) -> Result<T, ConfigError>,
    ) -> Result<T, ConfigError> {
        self.with_value(key, |value| extract(key, value))
    }

    fn slice<T>(
        &self,
        key: &str,
        extract: impl Fn(&str, &Value) -> Result<T, ConfigError>,
    ) -> Result<Vec<T>, ConfigError> {
        self.with_value(key, |value| match value {
            Value::Array(items) => items.iter().map(|item| extract(key, item)).collect(),
            other => Err(mismatch(key, other)),
        })
    }
}

impl From<Table> for MapSource {
    fn from(table: Table) -> Self {
        Self::new(table)
    }
}

impl Source for MapSource {
    fn load(&self) -> Result<(), ConfigError> {
        Ok(())
    }

    fn unload(&self) -> Result<(), ConfigError> {
        let mut data = self.data.write().unwrap_or_else(PoisonError::into_inner);
        data.take();
        Ok(())
    }

    fn get_string(&self, key: &str) -> Result<String, ConfigError> {
        self.scalar(key, as_string)
    }

    fn get_string_slice(&self, key: &str) -> Result<Vec<String>, ConfigError> {
        self.slice(key, as_string)
    }

    fn get_int(&self, key: &str) -> Result<isize, ConfigError> {
        self.scalar(key, as_integer)
    }

    fn get_int_slice(&self, key: &str) -> Result<Vec<isize>, ConfigError> {
        self.slice(key, as_integer)
    }

    fn get_uint(&self, key: &str) -> Result<usize, ConfigError> {
        self.scalar(key, as_integer)
    }

    fn get_uint_slice(&self, key: &str) -> Result<Vec<usize>, ConfigError> {
        self.slice(key, as_integer)
    }

    fn get_int64(&self, key: &str) -> Result<i64, ConfigError> {
        self.scalar(key, as_integer)
    }

    fn get_int64_slice(&self, key: &str) -> Result<Vec<i64>, ConfigError> {
        self.slice(key, as_integer)
    }

    fn get_uint64(&self, key: &str) -> Result<u64, ConfigError> {
        self.scalar(key, as_integer)
    }

    fn get_uint64_slice(&self, key: &str) -> Result<Vec<u64>, ConfigError> {
        self.slice(key, as_integer)
    }

    fn get_bool(&self, key: &str) -> Result<bool, ConfigError> {
        self.scalar(key, as_bool)
    }

    fn get_bool_slice(&self, key: &str) -> Result<Vec<bool>, ConfigError> {
        self.slice(key, as_bool)
    }

    fn get_float(&self, key: &str) -> Result<f64, ConfigError> {
        self.scalar(key, as_float)
    }

    fn get_float_slice(&self, key: &str) -> Result<Vec<f64>, ConfigError> {
        self.slice(key, as_float)
    }

    fn get_duration(&self, key: &str) -> Result<Duration, ConfigError> {
        self.scalar(key, |key, value| match value {
            Value::String(s) => parse_duration(s),
            other => Err(mismatch(key, other)),
        })
    }
}

/// Flattens nested tables into a single level of joined keys.
fn flatten(table: Table, separator: &str) -> HashMap<String, Value> {
    let mut out = HashMap::new();
    flatten_into(&mut out, "", table, separator);
    out
}

fn flatten_into(out: &mut HashMap<String, Value>, prefix: &str, table: Table, separator: &str) {
    for (key, value) in table {
        let path = if prefix.is_empty() {
            key
        } else {
            format!("{prefix}{separator}{key}")
        };
        match value {
            Value::Table(nested) => flatten_into(out, &path, nested, separator),
            value => {
                out.insert(path, value);
            }
        }
    }
}

fn mismatch(key: &str, value: &Value) -> ConfigError {
    ConfigError::TypeMismatch {
        key: key.to_string(),
        found: value.type_str(),
    }
}

fn as_string(key: &str, value: &Value) -> Result<String, ConfigError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        other => Err(mismatch(key, other)),
    }
}

fn as_integer<T: TryFrom<i64>>(key: &str, value: &Value) -> Result<T, ConfigError> {
    match value {
        Value::Integer(i) => T::try_from(*i).map_err(|_| ConfigError::OutOfRange {
            key: key.to_string(),
            value: i.to_string(),
            target: std::any::type_name::<T>(),
        }),
        other => Err(mismatch(key, other)),
    }
}

fn as_bool(key: &str, value: &Value) -> Result<bool, ConfigError> {
    match value {
        Value::Boolean(b) => Ok(*b),
        other => Err(mismatch(key, other)),
    }
}

fn as_float(key: &str, value: &Value) -> Result<f64, ConfigError> {
    match value {
        Value::Float(f) => Ok(*f),
        other => Err(mismatch(key, other)),
    }
}
