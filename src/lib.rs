mod bind;
mod duration;
mod error;
pub mod loader;
mod manager;
pub mod source;

pub use bind::{
    Bindable, Configurable, FieldDescriptor, FieldKind, Fields, Slot, SourceClass, Validate,
};
pub use duration::parse_duration;
pub use error::{BoxError, ConfigError};
pub use manager::{Manager, ManagerBuilder};
pub use source::Source;
