//! File-backed loader.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use super::Loader;
use crate::ConfigError;

/// Opens a configuration file on `load` and keeps its handle until `unload`.
///
/// The format is up to the source consuming the bytes (YAML, TOML, ...).
#[derive(Debug)]
pub struct FileLoader {
    path: PathBuf,
    handle: Mutex<Option<File>>,
}

impl FileLoader {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            handle: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_error(&self, source: std::io::Error) -> ConfigError {
        ConfigError::ReadError {
            path: self.path.clone(),
            source,
        }
    }
}

impl Loader for FileLoader {
    fn load(&self) -> Result<Box<dyn Read + Send>, ConfigError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ConfigError::FileNotFound(self.path.clone()));
            }
            Err(e) => return Err(self.read_error(e)),
        };
        let reader = file.try_clone().map_err(|e| self.read_error(e))?;

        let mut handle = self.handle.lock().unwrap_or_else(PoisonError::into_inner);
        *handle = Some(file);
        Ok(Box::new(reader))
    }

    fn unload(&self) -> Result<(), ConfigError> {
        let mut handle = self.handle.lock().unwrap_or_else(PoisonError::into_inner);
        handle.take();
        Ok(())
    }
}
