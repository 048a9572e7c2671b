//! Section loaders and the panic boundary around them

use super::env::EnvReader;
use crate::core::ConfigTree;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// What a loader hands back to the registry
///
/// `None` stores a nil section: it is registered, but path lookups into it
/// fail with a "section is nil" error.
pub type SectionData = Option<ConfigTree>;

/// A named section's loader callback
pub type Loader = Arc<dyn Fn(&LoaderContext<'_>) -> SectionData + Send + Sync>;

/// View of the registry given to loaders
///
/// Loaders run while the registry holds its write lock, so they only get
/// environment access, never the registry itself.
#[derive(Debug, Clone, Copy)]
pub struct LoaderContext<'a> {
    section: &'a str,
    env: &'a EnvReader,
}

impl<'a> LoaderContext<'a> {
    pub(crate) fn new(section: &'a str, env: &'a EnvReader) -> Self {
        Self { section, env }
    }

    /// Name of the section being loaded
    pub fn section(&self) -> &str {
        self.section
    }

    /// Environment accessors
    pub fn env(&self) -> &EnvReader {
        self.env
    }

    /// Shorthand for [`EnvReader::string`]
    pub fn env_string(&self, key: &str, default: &str) -> String {
        self.env.string(key, default)
    }

    /// Shorthand for [`EnvReader::int`]
    pub fn env_int(&self, key: &str, default: i64) -> i64 {
        self.env.int(key, default)
    }

    /// Shorthand for [`EnvReader::bool`]
    pub fn env_bool(&self, key: &str, default: bool) -> bool {
        self.env.bool(key, default)
    }

    /// Shorthand for [`EnvReader::string_array`]
    pub fn env_string_array(&self, key: &str, default: &[&str]) -> Vec<String> {
        self.env.string_array(key, default)
    }
}

/// Box a loader closure
///
/// The closure may return either a [`ConfigTree`] or an `Option<ConfigTree>`.
pub fn loader<F, T>(f: F) -> Loader
where
    F: Fn(&LoaderContext<'_>) -> T + Send + Sync + 'static,
    T: Into<SectionData>,
{
    Arc::new(move |ctx: &LoaderContext<'_>| f(ctx).into())
}

/// Run a loader, converting a panic into `Err` with its message
pub(crate) fn invoke(loader: &Loader, ctx: &LoaderContext<'_>) -> Result<SectionData, String> {
    panic::catch_unwind(AssertUnwindSafe(|| loader(ctx))).map_err(|payload| panic_message(&*payload))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Value;

    #[test]
    fn loaders_may_return_trees_or_options() {
        let env = EnvReader::default();
        let ctx = LoaderContext::new("app", &env);

        let plain = loader(|_| ConfigTree::from([("k".to_string(), Value::from(1))]));
        assert_eq!(invoke(&plain, &ctx).unwrap().unwrap().len(), 1);

        let nil = loader(|_| None::<ConfigTree>);
        assert_eq!(invoke(&nil, &ctx).unwrap(), None);
    }

    #[test]
    fn panics_are_captured_with_their_message() {
        let env = EnvReader::default();
        let ctx = LoaderContext::new("app", &env);

        let static_msg = loader(|_| -> ConfigTree { panic!("test panic") });
        assert_eq!(invoke(&static_msg, &ctx).unwrap_err(), "test panic");

        let formatted = loader(|ctx: &LoaderContext<'_>| -> ConfigTree {
            panic!("loader {} failed", ctx.section())
        });
        assert_eq!(invoke(&formatted, &ctx).unwrap_err(), "loader app failed");
    }
}
