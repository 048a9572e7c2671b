//! Core configuration functionality

pub mod coerce;
pub mod error;
pub mod path;
pub mod registry;
pub mod result;
pub mod traits;
pub mod tree;
pub mod value;

// Re-export core types
pub use error::{BoxError, ConfigError, ErrorKind};
pub use path::{PATH_SEPARATOR, PathCache};
pub use registry::{Registry, RegistryBuilder, get_config_registry, global_registry, reset_global};
pub use result::{ConfigResult, ConfigResultExt};
pub use value::{ConfigTree, Value, ValueKind};

// Re-export core traits
pub use traits::{FieldValue, Unmarshal};
