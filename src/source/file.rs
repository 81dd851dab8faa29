//! Sources parsed from a byte stream.

use std::io::Read;
use std::marker::PhantomData;
use std::time::Duration;

use serde::de::Error as _;
use serde::Deserialize;
use toml::{Table, Value};

use super::map::MapSource;
use super::Source;
use crate::loader::Loader;
use crate::ConfigError;

/// Decodes a byte stream into a nested table.
pub trait Format: Send + Sync + std::fmt::Debug {
    fn decode(reader: Box<dyn Read + Send>) -> Result<Table, ConfigError>;
}

#[derive(Debug)]
pub struct Yaml;

impl Format for Yaml {
    /// Null entries are dropped, so `key: ~` reads as a missing key.
    fn decode(reader: Box<dyn Read + Send>) -> Result<Table, ConfigError> {
        let deserializer = serde_yaml::Deserializer::from_reader(reader);
        let document = serde_yaml::Value::deserialize(deserializer)?;
        match yaml_to_toml(document)? {
            None => Ok(Table::new()),
            Some(Value::Table(table)) => Ok(table),
            Some(other) => Err(serde_yaml::Error::custom(format!(
                "expected a mapping at the document root, found {}",
                other.type_str()
            ))
            .into()),
        }
    }
}

fn yaml_to_toml(value: serde_yaml::Value) -> Result<Option<Value>, serde_yaml::Error> {
    use serde_yaml::Value as YamlValue;

    let converted = match value {
        YamlValue::Null => return Ok(None),
        YamlValue::Bool(b) => Value::Boolean(b),
        YamlValue::Number(n) => match n.as_i64() {
            Some(i) => Value::Integer(i),
            None => match n.as_f64() {
                Some(f) => Value::Float(f),
                None => {
                    let message = format!("unsupported number {n}");
                    return Err(serde_yaml::Error::custom(message));
                }
            },
        },
        YamlValue::String(s) => Value::String(s),
        YamlValue::Sequence(items) => {
            let mut array = Vec::with_capacity(items.len());
            for item in items {
                array.extend(yaml_to_toml(item)?);
            }
            Value::Array(array)
        }
        YamlValue::Mapping(mapping) => {
            let mut table = Table::new();
            for (key, value) in mapping {
                let key = match key {
                    YamlValue::String(s) => s,
                    YamlValue::Number(n) => n.to_string(),
                    YamlValue::Bool(b) => b.to_string(),
                    other => {
                        return Err(serde_yaml::Error::custom(format!(
                            "unsupported mapping key {other:?}"
                        )))
                    }
                };
                if let Some(value) = yaml_to_toml(value)? {
                    table.insert(key, value);
                }
            }
            Value::Table(table)
        }
        YamlValue::Tagged(tagged) => {
            let tagged = *tagged;
            return yaml_to_toml(tagged.value);
        }
    };

    Ok(Some(converted))
}

#[derive(Debug)]
pub struct Toml;

impl Format for Toml {
    fn decode(mut reader: Box<dyn Read + Send>) -> Result<Table, ConfigError> {
        let mut contents = String::new();
        reader.read_to_string(&mut contents)?;
        Ok(toml::from_str(&contents)?)
    }
}

/// A source that parses the bytes of a [`Loader`] into a [`MapSource`] on `load`.
///
/// Reads fail with [`ConfigError::SourceNotLoaded`] until `load` succeeds.
#[derive(Debug)]
pub struct FileSource<F: Format> {
    loader: Box<dyn Loader>,
    separator: String,
    data: MapSource,
    format: PhantomData<F>,
}

/// Source backed by a YAML document.
pub type YamlSource = FileSource<Yaml>;

/// Source backed by a TOML document.
pub type TomlSource = FileSource<Toml>;

impl<F: Format> FileSource<F> {
    pub fn new(loader: impl Loader + 'static) -> Self {
        Self {
            loader: Box::new(loader),
            separator: ".".to_string(),
            data: MapSource::unloaded(),
            format: PhantomData,
        }
    }

    /// Sets the separator used to flatten nested keys.
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }
}

impl<F: Format> Source for FileSource<F> {
    /// Reads and decodes the loader's stream. The loader is released afterwards
    /// whether or not decoding succeeded. A loaded source is left untouched.
    fn load(&self) -> Result<(), ConfigError> {
        if self.data.is_loaded() {
            return Ok(());
        }

        let reader = self.loader.load()?;
        let decoded = F::decode(reader);
        let released = self.loader.unload();

        self.data.replace(decoded?, &self.separator);
        released
    }

    fn unload(&self) -> Result<(), ConfigError> {
        self.data.unload()
    }

    fn get_string(&self, key: &str) -> Result<String, ConfigError> {
        self.data.get_string(key)
    }

    fn get_string_slice(&self, key: &str) -> Result<Vec<String>, ConfigError> {
        self.data.get_string_slice(key)
    }

    fn get_int(&self, key: &str) -> Result<isize, ConfigError> {
        self.data.get_int(key)
    }

    fn get_int_slice(&self, key: &str) -> Result<Vec<isize>, ConfigError> {
        self.data.get_int_slice(key)
    }

    fn get_uint(&self, key: &str) -> Result<usize, ConfigError> {
        self.data.get_uint(key)
    }

    fn get_uint_slice(&self, key: &str) -> Result<Vec<usize>, ConfigError> {
        self.data.get_uint_slice(key)
    }

    fn get_int64(&self, key: &str) -> Result<i64, ConfigError> {
        self.data.get_int64(key)
    }

    fn get_int64_slice(&self, key: &str) -> Result<Vec<i64>, ConfigError> {
        self.data.get_int64_slice(key)
    }

    fn get_uint64(&self, key: &str) -> Result<u64, ConfigError> {
        self.data.get_uint64(key)
    }

    fn get_uint64_slice(&self, key: &str) -> Result<Vec<u64>, ConfigError> {
        self.data.get_uint64_slice(key)
    }

    fn get_bool(&self, key: &str) -> Result<bool, ConfigError> {
        self.data.get_bool(key)
    }

    fn get_bool_slice(&self, key: &str) -> Result<Vec<bool>, ConfigError> {
        self.data.get_bool_slice(key)
    }

    fn get_float(&self, key: &str) -> Result<f64, ConfigError> {
        self.data.get_float(key)
    }

    fn get_float_slice(&self, key: &str) -> Result<Vec<f64>, ConfigError> {
        self.data.get_float_slice(key)
    }

    fn get_duration(&self, key: &str) -> Result<Duration, ConfigError> {
        self.data.get_duration(key)
    }
}
