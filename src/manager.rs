//! Source registration and the populate entry point.

use std::sync::Arc;

use tracing::debug;

use crate::bind::engine::Binder;
use crate::source::Source;
use crate::{ConfigError, Configurable};

const DEFAULT_KEY_SEPARATOR: &str = ".";

/// Binds configuration structures against ordered chains of sources.
///
/// Fields annotated `secret` are resolved against the secret chain, every other
/// field against the plain chain. Within a chain, sources are tried in the order
/// they were registered and the first one holding the key wins.
///
/// Registration needs `&mut self`; once done, a `Manager` can be shared and
/// [`populate`](Self::populate) called concurrently.
///
/// ## Example
///
/// ```
/// use std::sync::Arc;
/// use dragon_config::{Configurable, Fields, Manager};
/// use dragon_config::source::MapSource;
///
/// #[derive(Default)]
/// struct AppConfig {
///     name: String,
///     port: u16,
/// }
///
/// impl Configurable for AppConfig {
///     fn fields<'a>(&'a mut self, fields: &mut Fields<'a>) {
///         fields
///             .field("name,required", &mut self.name)
///             .field("port", &mut self.port);
///     }
/// }
///
/// let mut manager = Manager::new();
/// manager.add_plain_source(Arc::new(MapSource::new(toml::from_str(
///     "name = \"svc\"\nport = 8080",
/// )?)));
///
/// let mut config = AppConfig::default();
/// manager.populate(&mut config)?;
/// assert_eq!(config.port, 8080);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct Manager {
    separator: String,
    plain: Vec<Arc<dyn Source>>,
    secret: Vec<Arc<dyn Source>>,
}

impl Default for Manager {
    fn default() -> Self {
        Self::new()
    }
}

impl Manager {
    /// Creates a manager with the default `.` key separator.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> ManagerBuilder {
        ManagerBuilder::default()
    }

    pub fn key_separator(&self) -> &str {
        &self.separator
    }

    /// Appends a source to the plain chain.
    pub fn add_plain_source(&mut self, source: Arc<dyn Source>) {
        debug!(index = self.plain.len(), "registered plain source");
        self.plain.push(source);
    }

    /// Appends a source to the secret chain.
    ///
    /// The same source may also be registered as a plain source.
    pub fn add_secret_source(&mut self, source: Arc<dyn Source>) {
        debug!(index = self.secret.len(), "registered secret source");
        self.secret.push(source);
    }

    pub fn plain_sources(&self) -> &[Arc<dyn Source>] {
        &self.plain
    }

    pub fn secret_sources(&self) -> &[Arc<dyn Source>] {
        &self.secret
    }

    /// Populates `target` from the registered sources.
    ///
    /// Fields are visited depth-first in registration order and nested
    /// structures are validated before their parent. The first error aborts the
    /// call; `target` may then be partially populated.
    pub fn populate<T: Configurable>(&self, target: &mut T) -> Result<(), ConfigError> {
        let binder = Binder {
            plain: &self.plain,
            secret: &self.secret,
            separator: &self.separator,
        };
        binder.bind("", target)
    }
}

/// Construction-time options of a [`Manager`].
#[derive(Debug, Default)]
#[must_use = "builders do nothing until .build() is called"]
pub struct ManagerBuilder {
    separator: Option<String>,
}

impl ManagerBuilder {
    /// Sets the string joining key segments of nested fields. Defaults to `.`.
    pub fn key_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = Some(separator.into());
        self
    }

    pub fn build(self) -> Manager {
        Manager {
            separator: self
                .separator
                .unwrap_or_else(|| DEFAULT_KEY_SEPARATOR.to_string()),
            plain: Vec::new(),
            secret: Vec::new(),
        }
    }
}
