//! Environment variable access
//!
//! The registry never reads `std::env` directly; it goes through an
//! [`EnvSource`] so embedders and tests can supply their own variables.

use crate::core::coerce::split_list;
use std::collections::HashMap;
use std::sync::Arc;

/// Byte-oriented environment lookup capability
pub trait EnvSource: Send + Sync {
    /// Look up `key`, returning `None` when it is not set
    fn lookup(&self, key: &str) -> Option<String>;
}

/// Reads the process environment
///
/// Presence is decided by the OS. Values that are not valid Unicode are
/// converted lossily rather than reported as unset.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn lookup(&self, key: &str) -> Option<String> {
        std::env::var_os(key).map(|value| value.to_string_lossy().into_owned())
    }
}

/// In-memory environment, mostly for tests
#[derive(Debug, Clone, Default)]
pub struct MapEnv {
    vars: HashMap<String, String>,
}

impl MapEnv {
    /// Create an empty environment
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable
    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapEnv {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl EnvSource for MapEnv {
    fn lookup(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

/// Typed accessors over an [`EnvSource`]
///
/// Every accessor falls back to the supplied default; none of them fail.
#[derive(Clone)]
pub struct EnvReader {
    source: Arc<dyn EnvSource>,
}

impl std::fmt::Debug for EnvReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvReader")
            .field("source", &"<env source>")
            .finish()
    }
}

impl Default for EnvReader {
    fn default() -> Self {
        Self::new(Arc::new(ProcessEnv))
    }
}

impl EnvReader {
    /// Wrap an env source
    pub fn new(source: Arc<dyn EnvSource>) -> Self {
        Self { source }
    }

    /// Raw lookup
    pub fn lookup(&self, key: &str) -> Option<String> {
        self.source.lookup(key)
    }

    /// Variable value, or `default` when unset
    pub fn string(&self, key: &str, default: &str) -> String {
        self.lookup(key).unwrap_or_else(|| default.to_string())
    }

    /// Base-10 integer, or `default` when unset or unparsable
    pub fn int(&self, key: &str, default: i64) -> i64 {
        self.lookup(key)
            .and_then(|value| value.parse().ok())
            .unwrap_or(default)
    }

    /// `true` iff the variable equals "true" ignoring ASCII case
    ///
    /// Any other present value is `false`; `default` applies only when unset.
    /// Narrower than the boolean parser behind the typed getters.
    pub fn bool(&self, key: &str, default: bool) -> bool {
        self.lookup(key)
            .map_or(default, |value| value.eq_ignore_ascii_case("true"))
    }

    /// Comma-separated list with trimmed items, or `default` when unset
    pub fn string_array(&self, key: &str, default: &[&str]) -> Vec<String> {
        match self.lookup(key) {
            Some(value) => value.split(',').map(|s| s.trim().to_string()).collect(),
            None => default.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    /// Like [`string_array`](Self::string_array) but an empty value yields an
    /// empty list instead of one empty item
    pub fn list(&self, key: &str) -> Option<Vec<String>> {
        self.lookup(key).map(|value| split_list(&value))
    }
}
