//! Ordered fallback across the sources of one chain.

use std::sync::Arc;

use tracing::trace;

use crate::source::Source;
use crate::ConfigError;

/// Reads `key` from the first source in `chain` that has it.
///
/// Sources are consulted in registration order. A miss moves on to the next
/// source; any other error stops the walk and is returned as is, even if a
/// later source would have succeeded.
pub(crate) fn resolve<T>(
    chain: &[Arc<dyn Source>],
    key: &str,
    read: impl Fn(&dyn Source) -> Result<T, ConfigError>,
) -> Result<T, ConfigError> {
    let mut last_miss = None;

    for (index, source) in chain.iter().enumerate() {
        match read(source.as_ref()) {
            Ok(value) => {
                trace!(key, index, "key resolved");
                return Ok(value);
            }
            Err(err) if err.is_key_not_found() => {
                trace!(key, index, "key not in source");
                last_miss = Some(err);
            }
            Err(err) => return Err(err),
        }
    }

    Err(last_miss.unwrap_or_else(|| ConfigError::KeyNotFound(key.to_string())))
}
