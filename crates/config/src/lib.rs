//! # Keystone Config - In-process configuration registry
//!
//! A process-wide, thread-safe registry of configuration sections. Each
//! section is produced by a named loader and addressed with dot-separated
//! paths; values are read back raw, through typed getters with a fixed set
//! of coercions, or projected into records with `#[derive(Unmarshal)]`.
//!
//! ## Quick Start
//!
//! ```rust
//! use keystone_config::prelude::*;
//!
//! #[derive(Debug, Default, Unmarshal)]
//! struct Database {
//!     host: String,
//!     port: i64,
//!     #[config(key = "max_connections")]
//!     pool_size: u32,
//! }
//!
//! fn main() -> ConfigResult<()> {
//!     let registry = Registry::builder()
//!         .with_env_source(MapEnv::new().with_var("DB_HOST", "db.internal"))
//!         .skip_dotenv()
//!         .build("testing")?;
//!
//!     registry.register("database", |ctx| {
//!         let mut tree = ConfigTree::new();
//!         tree.insert("host".into(), ctx.env_string("DB_HOST", "localhost").into());
//!         tree.insert("port".into(), Value::from(5432));
//!         tree.insert("max_connections".into(), Value::from(10_u32));
//!         tree
//!     });
//!
//!     assert_eq!(registry.get_int("database.port")?, 5432);
//!     let db: Database = registry.unmarshal_as("database")?;
//!     assert_eq!(db.host, "db.internal");
//!     assert_eq!(db.pool_size, 10);
//!     Ok(())
//! }
//! ```
//!
//! ## The global registry
//!
//! [`get_config_registry`] lazily builds one registry per process. The
//! environment label (`development`, `staging`, `production` or `testing`)
//! selects the env file loaded on first use; later calls ignore it.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

// Lets `#[derive(Unmarshal)]` output refer to `::keystone_config` from
// inside this crate too.
extern crate self as keystone_config;

pub mod core;
pub mod loaders;
mod unmarshal;
pub mod validators;

pub use crate::core::{
    BoxError, ConfigError, ConfigResult, ConfigResultExt, ConfigTree, ErrorKind, FieldValue,
    PathCache, Registry, RegistryBuilder, Unmarshal, Value, ValueKind, get_config_registry,
    global_registry, reset_global,
};
pub use loaders::{EnvReader, EnvSource, Environment, LoaderContext, MapEnv, ProcessEnv};
pub use validators::{ConfigSchema, SchemaField};

/// Derive [`Unmarshal`] and [`FieldValue`] for a struct with named fields
///
/// Field attributes:
/// - `#[config(key = "name")]` reads `name` instead of the lowercased field
///   name; `key = "-"` skips the field
/// - `#[config(required)]` fails when the key is absent
/// - `#[config(skip)]` never touches the field
pub use keystone_config_macros::Unmarshal;

/// Prelude for common imports
pub mod prelude {
    pub use crate::{
        ConfigError, ConfigResult, ConfigResultExt, ConfigSchema, ConfigTree, Environment,
        LoaderContext, MapEnv, Registry, SchemaField, Unmarshal, Value, ValueKind,
        get_config_registry,
    };
}
