//! Dot-notation path splitting with a shared cache

use dashmap::DashMap;
use std::sync::Arc;

/// Separator between path segments
pub const PATH_SEPARATOR: char = '.';

/// Split a dotted path into its segments
///
/// No trimming is applied and empty segments are kept, so `"a..b"` yields
/// `["a", "", "b"]`.
pub fn split(path: &str) -> Arc<[String]> {
    path.split(PATH_SEPARATOR).map(str::to_owned).collect()
}

/// Concurrent memo of `path -> segments`
///
/// Entries never expire. Repeated lookups of the same path return the same
/// allocation, so callers may compare results with [`Arc::ptr_eq`].
#[derive(Debug, Default)]
pub struct PathCache {
    cache: DashMap<String, Arc<[String]>>,
}

impl PathCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the segments of `path`, splitting and storing them on first use
    pub fn get(&self, path: &str) -> Arc<[String]> {
        if let Some(cached) = self.cache.get(path) {
            return Arc::clone(cached.value());
        }

        // Two threads may race past the read above; `or_insert_with` keeps
        // whichever entry landed first.
        let entry = self
            .cache
            .entry(path.to_owned())
            .or_insert_with(|| split(path));
        Arc::clone(entry.value())
    }

    /// Number of cached paths
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Check if nothing is cached
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Drop every cached entry
    pub fn clear(&self) {
        self.cache.clear();
    }
}
