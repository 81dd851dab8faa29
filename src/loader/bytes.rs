use std::io::{Cursor, Read};
use std::sync::{Mutex, PoisonError};

use super::Loader;
use crate::ConfigError;

/// Serves configuration from an in-memory buffer.
#[derive(Debug)]
pub struct BytesLoader {
    bytes: Mutex<Vec<u8>>,
}

impl BytesLoader {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: Mutex::new(bytes.into()),
        }
    }
}

impl Loader for BytesLoader {
    fn load(&self) -> Result<Box<dyn Read + Send>, ConfigError> {
        let bytes = self.bytes.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(Box::new(Cursor::new(bytes.clone())))
    }

    /// Drops the buffer; later loads yield an empty stream.
    fn unload(&self) -> Result<(), ConfigError> {
        let mut bytes = self.bytes.lock().unwrap_or_else(PoisonError::into_inner);
        *bytes = Vec::new();
        Ok(())
    }
}
