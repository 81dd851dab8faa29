//! Byte acquisition for byte-oriented sources.
//!
//! A [`Loader`] decides where configuration bytes come from; the source that
//! owns it decides how they are parsed.

mod bytes;
mod file;

use std::io::Read;

use crate::ConfigError;

pub use bytes::BytesLoader;
pub use file::FileLoader;

/// Scoped acquisition of a readable byte stream.
pub trait Loader: Send + Sync + std::fmt::Debug {
    /// Returns a reader over the configuration bytes.
    fn load(&self) -> Result<Box<dyn Read + Send>, ConfigError>;

    /// Releases whatever `load` acquired. Safe to call when nothing is held.
    fn unload(&self) -> Result<(), ConfigError>;
}
